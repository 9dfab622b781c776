use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CardLevel {
    Normal,
    Enhanced,
    Max,
}

impl CardLevel {
    pub fn index(self) -> usize {
        match self {
            Self::Normal => 0,
            Self::Enhanced => 1,
            Self::Max => 2,
        }
    }

    /// Next level up, saturating at `Max`.
    pub fn raised(self) -> Self {
        match self {
            Self::Normal => Self::Enhanced,
            Self::Enhanced | Self::Max => Self::Max,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardKind {
    Thunder,
    Tornado,
    Purify,
    Tempest,
    Hellfire,
    Shockwave,
    Earthquake,
    TidalWave,
    Explosion,
    Lightning,
    Tree,
    Outburst,
}

impl CardKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Thunder => "Thunder",
            Self::Tornado => "Tornado",
            Self::Purify => "Purify",
            Self::Tempest => "Tempest",
            Self::Hellfire => "Hellfire",
            Self::Shockwave => "Shockwave",
            Self::Earthquake => "Earthquake",
            Self::TidalWave => "Tidal Wave",
            Self::Explosion => "Explosion",
            Self::Lightning => "Lightning",
            Self::Tree => "World Tree",
            Self::Outburst => "Outburst",
        }
    }

    /// Cards that only come out of mystery tiles.
    pub fn is_mystery_only(self) -> bool {
        matches!(self, Self::Tree | Self::Outburst)
    }
}

/// A card is a plain value: kind plus level. Copies never alias.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub kind: CardKind,
    pub level: CardLevel,
}

impl Card {
    pub fn new(kind: CardKind) -> Self {
        let level = if kind.is_mystery_only() {
            CardLevel::Max
        } else {
            CardLevel::Normal
        };
        Self { kind, level }
    }

    pub fn with_level(kind: CardKind, level: CardLevel) -> Self {
        Self { kind, level }
    }

    pub fn enhance(&mut self) {
        self.level = self.level.raised();
    }

    pub fn is_max(&self) -> bool {
        self.level == CardLevel::Max
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            CardLevel::Normal => write!(f, "{}", self.kind.display_name()),
            CardLevel::Enhanced => write!(f, "{}+", self.kind.display_name()),
            CardLevel::Max => write!(f, "{}++", self.kind.display_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enhance_saturates_at_max() {
        let mut card = Card::new(CardKind::Thunder);
        card.enhance();
        assert_eq!(card.level, CardLevel::Enhanced);
        card.enhance();
        card.enhance();
        assert_eq!(card.level, CardLevel::Max);
    }

    #[test]
    fn mystery_cards_start_at_max() {
        assert!(Card::new(CardKind::Tree).is_max());
        assert!(Card::new(CardKind::Outburst).is_max());
        assert_eq!(Card::new(CardKind::Lightning).level, CardLevel::Normal);
    }

    #[test]
    fn equality_needs_kind_and_level() {
        let a = Card::new(CardKind::Purify);
        let b = Card::with_level(CardKind::Purify, CardLevel::Enhanced);
        assert_ne!(a, b);
        assert_eq!(a, Card::with_level(CardKind::Purify, CardLevel::Normal));
    }
}
