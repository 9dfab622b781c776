use crate::{CardKind, GameState, HandSide, Move, RandomSupplier};

/// Every move the current state accepts: casts from both sides on breakable
/// tiles, Purify casts on distorted tiles, and swaps while changes remain.
pub fn legal_moves<R: RandomSupplier>(state: &GameState<R>) -> Vec<Move> {
    let mut moves = Vec::new();
    if state.is_finished() {
        return moves;
    }
    let board = state.board();
    for side in [HandSide::Left, HandSide::Right] {
        let Some(card) = state.hand().slot(side) else {
            continue;
        };
        for &(x, y) in board.breakable() {
            moves.push(Move::Cast { side, x, y });
        }
        if card.kind == CardKind::Purify {
            for &(x, y) in board.distorted() {
                moves.push(Move::Cast { side, x, y });
            }
        }
        if state.changes_left() > 0 {
            moves.push(Move::Swap { side });
        }
    }
    moves
}

/// Picks one of [`legal_moves`] uniformly, drawing from the state's own randomness.
pub fn random_move<R: RandomSupplier>(state: &mut GameState<R>) -> Option<Move> {
    let moves = legal_moves(state);
    if moves.is_empty() {
        return None;
    }
    let last = moves.len() as i64 - 1;
    let index = state.rng_mut().int_in_range(0, last) as usize;
    moves.get(index).copied()
}
