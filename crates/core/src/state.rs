use crate::{
    target_tiles, Card, CardGenerator, CardKind, Coord, EngineConfig, EngineError, Event,
    EventBus, Hand, HandSide, RandomSupplier, RngState, SpecialEffect, Tile, TileCounts,
    TileGenerator, TileGrid,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Move {
    /// Cast the card in `side` on `(x, y)`.
    Cast { side: HandSide, x: i32, y: i32 },
    /// Discard the card in `side` for the next one in the queue.
    Swap { side: HandSide },
}

impl Move {
    pub fn side(&self) -> HandSide {
        match self {
            Self::Cast { side, .. } | Self::Swap { side } => *side,
        }
    }

    pub fn is_swap(&self) -> bool {
        matches!(self, Self::Swap { .. })
    }

    pub fn target(&self) -> Option<Coord> {
        match self {
            Self::Cast { x, y, .. } => Some((*x, *y)),
            Self::Swap { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveOutcome {
    pub card: Option<Card>,
    pub hits: BTreeSet<Coord>,
    pub counts: TileCounts,
    pub effects: Vec<SpecialEffect>,
    pub spawned: Option<(Coord, Tile)>,
}

#[derive(Debug, Clone)]
struct Checkpoint {
    board: TileGrid,
    hand: Hand,
    turns_left: i32,
    changes_left: u32,
}

#[derive(Debug, Clone)]
pub struct GameState<R = RngState> {
    board: TileGrid,
    hand: Hand,
    turns_left: i32,
    changes_left: u32,
    cards: CardGenerator,
    tiles: TileGenerator,
    rng: R,
}

impl<R: RandomSupplier> GameState<R> {
    /// Builds the configured board, seeds a special tile and deals a fresh hand.
    pub fn new(config: &EngineConfig, rng: R) -> Result<Self, EngineError> {
        let board = match &config.layout {
            Some(rows) => TileGrid::from_layout(rows.as_slice())?,
            None => TileGrid::new(config.width, config.height),
        };
        let hand = Hand::new(None, None, [], config.queue_size);
        let mut state = Self::from_parts(board, hand, config, rng)?;
        let mut events = EventBus::default();
        state
            .board
            .spawn_special_tile(&mut state.rng, &state.tiles)?;
        state
            .hand
            .fix_up(&state.cards, &mut state.rng, &mut events)?;
        Ok(state)
    }

    /// Takes the board and hand as given; only the counters and weight tables
    /// come from `config`.
    pub fn from_parts(
        board: TileGrid,
        hand: Hand,
        config: &EngineConfig,
        rng: R,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            board,
            hand,
            turns_left: config.starting_turns,
            changes_left: config.starting_changes,
            cards: CardGenerator::new(config.card_weights.clone())?,
            tiles: TileGenerator::new(config.tile_weights.clone())?,
            rng,
        })
    }

    /// Overrides the turn and change counters, e.g. when resuming a saved game.
    pub fn with_counters(mut self, turns_left: i32, changes_left: u32) -> Self {
        self.turns_left = turns_left;
        self.changes_left = changes_left;
        self
    }

    pub fn board(&self) -> &TileGrid {
        &self.board
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn turns_left(&self) -> i32 {
        self.turns_left
    }

    pub fn changes_left(&self) -> u32 {
        self.changes_left
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn is_finished(&self) -> bool {
        self.board.is_finished()
    }

    /// Whether `card` may be cast on `(x, y)`.
    pub fn is_valid_target(&self, card: Card, x: i32, y: i32) -> bool {
        self.board.breakable().contains(&(x, y))
            || (card.kind == CardKind::Purify && self.board.distorted().contains(&(x, y)))
    }

    /// Applies a move as a whole: on error the board, hand and counters are
    /// left as they were and no events are published.
    pub fn apply_move(
        &mut self,
        mv: Move,
        events: &mut EventBus,
    ) -> Result<MoveOutcome, EngineError> {
        let checkpoint = self.checkpoint();
        let mut pending = EventBus::default();
        match self.resolve(mv, &mut pending) {
            Ok(outcome) => {
                events.append(&mut pending);
                Ok(outcome)
            }
            Err(err) => {
                warn!("rolling back {mv:?}: {err}");
                self.restore(checkpoint);
                Err(err)
            }
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            board: self.board.clone(),
            hand: self.hand.clone(),
            turns_left: self.turns_left,
            changes_left: self.changes_left,
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.board = checkpoint.board;
        self.hand = checkpoint.hand;
        self.turns_left = checkpoint.turns_left;
        self.changes_left = checkpoint.changes_left;
    }

    fn resolve(&mut self, mv: Move, events: &mut EventBus) -> Result<MoveOutcome, EngineError> {
        match mv {
            Move::Swap { side } => self.swap(side, events),
            Move::Cast { side, x, y } => self.cast(side, x, y, events),
        }
    }

    fn swap(&mut self, side: HandSide, events: &mut EventBus) -> Result<MoveOutcome, EngineError> {
        if self.changes_left == 0 {
            return Err(EngineError::NoChangesLeft);
        }
        let card = self.hand.take(side).ok_or(EngineError::EmptyHandSlot(side))?;
        self.changes_left -= 1;
        events.push(Event::CardSwapped {
            side,
            card,
            changes_left: self.changes_left,
        });
        self.hand.fix_up(&self.cards, &mut self.rng, events)?;
        debug!("swapped out {card} from {side:?}");
        Ok(MoveOutcome {
            card: Some(card),
            ..MoveOutcome::default()
        })
    }

    fn cast(
        &mut self,
        side: HandSide,
        x: i32,
        y: i32,
        events: &mut EventBus,
    ) -> Result<MoveOutcome, EngineError> {
        if self.board.is_finished() {
            return Err(EngineError::GameFinished);
        }
        let card = self.hand.slot(side).ok_or(EngineError::EmptyHandSlot(side))?;
        if !self.is_valid_target(card, x, y) {
            return Err(EngineError::InvalidTarget { x, y });
        }

        let hits = target_tiles(card, &self.board, x, y, &mut self.rng)?;
        let changes = self.board.plan_hits(&hits, card.kind)?;
        if let Some(change) = changes.iter().find(|c| c.from == Tile::Relocation) {
            return Err(EngineError::UnsupportedEffect(format!(
                "relocation tile at {:?}",
                change.at
            )));
        }
        let counts = self.board.commit(&changes);
        events.push(Event::CardCast {
            side,
            card,
            target: (x, y),
            hits: hits.len(),
        });
        events.push(Event::TilesResolved {
            counts: counts.clone(),
        });

        let effects = self.trigger_effects(side, card, &counts, events);
        self.hand.set(side, None);
        self.hand.fix_up(&self.cards, &mut self.rng, events)?;

        let spawned = self.board.spawn_special_tile(&mut self.rng, &self.tiles)?;
        if let Some((at, tile)) = spawned {
            events.push(Event::SpecialTileSpawned { at, tile });
        }
        self.turns_left -= 1;
        if self.board.is_finished() {
            events.push(Event::BoardCleared {
                turns_left: self.turns_left,
            });
        }
        debug!(
            "{card} at ({x}, {y}) hit {} tiles, {} turns left",
            hits.len(),
            self.turns_left
        );
        Ok(MoveOutcome {
            card: Some(card),
            hits,
            counts,
            effects,
            spawned,
        })
    }

    /// Fires the special tiles that were hit, in a fixed order. Effects that
    /// touch the hand act on the slot opposite the card being cast.
    fn trigger_effects(
        &mut self,
        side: HandSide,
        card: Card,
        counts: &TileCounts,
        events: &mut EventBus,
    ) -> Vec<SpecialEffect> {
        let other = side.opposite();
        let mut fired = Vec::new();
        if counts.contains(Tile::Blessing) {
            self.turns_left += 1;
            fired.push(SpecialEffect::Blessing);
        }
        if counts.contains(Tile::Addition) {
            self.changes_left += 1;
            fired.push(SpecialEffect::Addition);
        }
        if counts.contains(Tile::Clone) {
            self.hand.set(other, Some(card));
            fired.push(SpecialEffect::Clone);
        }
        if counts.contains(Tile::Enhancement) {
            if let Some(target) = self.hand.slot_mut(other) {
                target.enhance();
            }
            fired.push(SpecialEffect::Enhancement);
        }
        if counts.contains(Tile::Mystery) {
            let kind = if self.rng.int_in_range(0, 1) == 0 {
                CardKind::Tree
            } else {
                CardKind::Outburst
            };
            self.hand.set(other, Some(Card::new(kind)));
            fired.push(SpecialEffect::Mystery);
        }
        for effect in &fired {
            events.push(Event::EffectTriggered {
                effect: *effect,
                side,
            });
        }
        fired
    }
}
