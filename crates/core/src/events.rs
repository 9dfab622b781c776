use crate::{Card, Coord, HandSide, Tile, TileCounts};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpecialEffect {
    Blessing,
    Addition,
    Clone,
    Enhancement,
    Mystery,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    CardCast {
        side: HandSide,
        card: Card,
        target: Coord,
        hits: usize,
    },
    CardSwapped {
        side: HandSide,
        card: Card,
        changes_left: u32,
    },
    TilesResolved { counts: TileCounts },
    EffectTriggered {
        effect: SpecialEffect,
        side: HandSide,
    },
    CardsFolded { card: Card },
    CardDrawn { side: HandSide, card: Card },
    SpecialTileSpawned { at: Coord, tile: Tile },
    BoardCleared { turns_left: i32 },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn append(&mut self, other: &mut EventBus) {
        self.queue.append(&mut other.queue);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
