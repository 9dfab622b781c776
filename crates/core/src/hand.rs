use crate::{Card, CardGenerator, EngineError, Event, EventBus, RandomSupplier};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Two playable slots plus the queue that refills them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    left: Option<Card>,
    right: Option<Card>,
    queue: VecDeque<Card>,
    queue_size: usize,
}

impl Hand {
    pub fn new(
        left: Option<Card>,
        right: Option<Card>,
        queue: impl IntoIterator<Item = Card>,
        queue_size: usize,
    ) -> Self {
        Self {
            left,
            right,
            queue: queue.into_iter().collect(),
            queue_size: queue_size.max(1),
        }
    }

    pub fn slot(&self, side: HandSide) -> Option<Card> {
        match side {
            HandSide::Left => self.left,
            HandSide::Right => self.right,
        }
    }

    pub fn slot_mut(&mut self, side: HandSide) -> &mut Option<Card> {
        match side {
            HandSide::Left => &mut self.left,
            HandSide::Right => &mut self.right,
        }
    }

    pub fn set(&mut self, side: HandSide, card: Option<Card>) {
        *self.slot_mut(side) = card;
    }

    pub fn take(&mut self, side: HandSide) -> Option<Card> {
        self.slot_mut(side).take()
    }

    pub fn left(&self) -> Option<Card> {
        self.left
    }

    pub fn right(&self) -> Option<Card> {
        self.right
    }

    pub fn queue(&self) -> &VecDeque<Card> {
        &self.queue
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size
    }

    pub fn is_full(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Folds the right slot into the left one when both hold the same kind and
    /// neither is at max level yet.
    fn fold(&mut self, events: &mut EventBus) -> bool {
        let (Some(left), Some(right)) = (self.left.as_mut(), self.right) else {
            return false;
        };
        if left.kind != right.kind || left.is_max() || right.is_max() {
            return false;
        }
        left.enhance();
        let folded = *left;
        self.right = None;
        debug!("folded into {folded}");
        events.push(Event::CardsFolded { card: folded });
        true
    }

    fn refill_queue<R: RandomSupplier + ?Sized>(
        &mut self,
        cards: &CardGenerator,
        rng: &mut R,
    ) -> Result<(), EngineError> {
        while self.queue.len() < self.queue_size {
            self.queue.push_back(cards.next(rng)?);
        }
        Ok(())
    }

    fn draw<R: RandomSupplier + ?Sized>(
        &mut self,
        cards: &CardGenerator,
        rng: &mut R,
    ) -> Result<Card, EngineError> {
        if let Some(card) = self.queue.pop_front() {
            return Ok(card);
        }
        self.refill_queue(cards, rng)?;
        self.queue
            .pop_front()
            .ok_or_else(|| EngineError::InvalidWeights("card queue stayed empty".to_string()))
    }

    /// Restores both slots and folds duplicates until neither changes.
    pub fn fix_up<R: RandomSupplier + ?Sized>(
        &mut self,
        cards: &CardGenerator,
        rng: &mut R,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.fold(events);
        self.refill_queue(cards, rng)?;
        while !self.is_full() {
            for side in [HandSide::Left, HandSide::Right] {
                if self.slot(side).is_none() {
                    let card = self.draw(cards, rng)?;
                    self.set(side, Some(card));
                    events.push(Event::CardDrawn { side, card });
                }
            }
            self.fold(events);
            self.refill_queue(cards, rng)?;
        }
        Ok(())
    }
}
