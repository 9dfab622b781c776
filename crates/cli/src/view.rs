use serde::{Deserialize, Serialize};
use transcendence_core::{
    Card, EngineConfig, EngineError, GameState, Hand, HandSide, Move, RandomSupplier, TileGrid,
};

pub fn board_lines(board: &TileGrid) -> Vec<String> {
    (0..)
        .map_while(|y| board.row(y))
        .map(|row| {
            row.iter()
                .map(|tile| tile.code().to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

pub fn move_lines(mv: Move, card: Option<Card>) -> Vec<String> {
    let name = card
        .map(|card| card.to_string())
        .unwrap_or_else(|| "-".to_string());
    let head = match mv.target() {
        Some((x, y)) => format!("{name}: at ({x}, {y})"),
        None => format!("Changing {name}"),
    };
    let side = match mv.side() {
        HandSide::Left => "Left",
        HandSide::Right => "Right",
    };
    vec![head, side.to_string()]
}

pub fn hand_line<R: RandomSupplier>(state: &GameState<R>) -> String {
    let slot = |card: Option<Card>| card.map(|c| c.to_string()).unwrap_or_else(|| "-".into());
    let queue: Vec<String> = state.hand().queue().iter().map(Card::to_string).collect();
    format!(
        "hand: [{}] [{}]  queue: {}  turns: {}  changes: {}",
        slot(state.hand().left()),
        slot(state.hand().right()),
        queue.join(", "),
        state.turns_left(),
        state.changes_left()
    )
}

/// Lays text blocks out left to right, padding each to its widest line.
pub fn side_by_side(blocks: &[Vec<String>]) -> String {
    let rows = blocks.iter().map(Vec::len).max().unwrap_or(0);
    let mut output: Vec<String> = vec![String::new(); rows];
    for block in blocks {
        let width = block.iter().map(|line| line.len() + 1).max().unwrap_or(1);
        for (row, line) in output.iter_mut().enumerate() {
            let cell = block.get(row).map(String::as_str).unwrap_or("");
            line.push_str(&format!("{cell:<width$}"));
        }
    }
    output
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Saved game: the board as code rows plus the hand and counters. The rng is
/// not part of it; a restored game continues with whatever supplier it is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub rows: Vec<String>,
    pub hand_left: Option<Card>,
    pub hand_right: Option<Card>,
    pub queue: Vec<Card>,
    #[serde(default)]
    pub queue_size: Option<usize>,
    pub turns_left: i32,
    pub changes_left: u32,
}

impl Snapshot {
    pub fn capture<R: RandomSupplier>(state: &GameState<R>) -> Self {
        let board = state.board();
        Self {
            width: board.width(),
            height: board.height(),
            rows: (0..)
                .map_while(|y| board.row(y))
                .map(|row| row.iter().map(|tile| tile.code()).collect())
                .collect(),
            hand_left: state.hand().left(),
            hand_right: state.hand().right(),
            queue: state.hand().queue().iter().copied().collect(),
            queue_size: Some(state.hand().queue_size()),
            turns_left: state.turns_left(),
            changes_left: state.changes_left(),
        }
    }

    /// Rebuilds the game. Weight tables come from `config`, and so does the
    /// queue size when the snapshot does not carry one.
    pub fn restore<R: RandomSupplier>(
        &self,
        config: &EngineConfig,
        rng: R,
    ) -> Result<GameState<R>, EngineError> {
        let board = TileGrid::from_layout(&self.rows)?;
        if board.width() != self.width || board.height() != self.height {
            return Err(EngineError::InvalidLayout(format!(
                "snapshot says {}x{} but rows are {}x{}",
                self.width,
                self.height,
                board.width(),
                board.height()
            )));
        }
        let hand = Hand::new(
            self.hand_left,
            self.hand_right,
            self.queue.iter().copied(),
            self.queue_size.unwrap_or(config.queue_size),
        );
        Ok(GameState::from_parts(board, hand, config, rng)?
            .with_counters(self.turns_left, self.changes_left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transcendence_core::{CardKind, CardLevel, EventBus, RngState};

    #[test]
    fn board_rows_use_tile_codes() {
        let board = TileGrid::from_layout(&["013", "729"]).expect("layout");
        assert_eq!(board_lines(&board), vec!["0 1 3", "7 2 9"]);
    }

    #[test]
    fn moves_read_like_the_log() {
        let card = Card::with_level(CardKind::TidalWave, CardLevel::Enhanced);
        let cast = Move::Cast {
            side: HandSide::Right,
            x: 1,
            y: 4,
        };
        assert_eq!(
            move_lines(cast, Some(card)),
            vec!["Tidal Wave+: at (1, 4)", "Right"]
        );
        let swap = Move::Swap {
            side: HandSide::Left,
        };
        assert_eq!(
            move_lines(swap, Some(Card::new(CardKind::Thunder))),
            vec!["Changing Thunder", "Left"]
        );
    }

    #[test]
    fn snapshot_survives_json_and_restores_the_game() {
        let config = EngineConfig {
            starting_turns: 4,
            starting_changes: 2,
            ..EngineConfig::default()
        };
        let mut game = GameState::new(&config, RngState::from_seed(11)).expect("game");
        let mut events = EventBus::default();
        let mv = Move::Swap {
            side: HandSide::Right,
        };
        game.apply_move(mv, &mut events).expect("swap");

        let snapshot = Snapshot::capture(&game);
        let body = serde_json::to_string(&snapshot).expect("serialize");
        let loaded: Snapshot = serde_json::from_str(&body).expect("parse");
        assert_eq!(loaded, snapshot);

        let restored = loaded
            .restore(&EngineConfig::default(), RngState::from_seed(99))
            .expect("restore");
        assert_eq!(restored.board(), game.board());
        assert_eq!(restored.hand(), game.hand());
        assert_eq!(restored.hand().queue(), game.hand().queue());
        assert_eq!(restored.turns_left(), 4);
        assert_eq!(restored.changes_left(), 1);
    }

    #[test]
    fn restore_rejects_mismatched_dimensions() {
        let snapshot = Snapshot {
            width: 4,
            height: 1,
            rows: vec!["111".to_string()],
            hand_left: None,
            hand_right: None,
            queue: Vec::new(),
            queue_size: None,
            turns_left: 0,
            changes_left: 0,
        };
        assert!(matches!(
            snapshot.restore(&EngineConfig::default(), RngState::from_seed(1)),
            Err(EngineError::InvalidLayout(_))
        ));
    }

    #[test]
    fn blocks_are_padded_into_columns() {
        let left = vec!["1 1".to_string(), "1 1".to_string()];
        let middle = vec!["Thunder: at (0, 0)".to_string()];
        let right = vec!["2 1".to_string(), "1 1".to_string()];
        let expected = format!("1 1 Thunder: at (0, 0) 2 1\n1 1 {}1 1", " ".repeat(19));
        assert_eq!(side_by_side(&[left, middle, right]), expected);
    }
}
