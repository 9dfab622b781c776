use crate::{
    standard_card_weights, standard_tile_weights, Card, CardWeight, EngineError, RandomSupplier,
    Tile, TileWeight,
};

/// Weighted factory for the cards that refill the queue.
#[derive(Debug, Clone)]
pub struct CardGenerator {
    weights: Vec<CardWeight>,
}

impl CardGenerator {
    pub fn new(weights: Vec<CardWeight>) -> Result<Self, EngineError> {
        if let Some(entry) = weights.iter().find(|entry| entry.kind.is_mystery_only()) {
            return Err(EngineError::InvalidWeights(format!(
                "{:?} cannot be generated",
                entry.kind
            )));
        }
        if weights.iter().all(|entry| entry.weight == 0) {
            return Err(EngineError::InvalidWeights(
                "card weights are empty".to_string(),
            ));
        }
        Ok(Self { weights })
    }

    pub fn standard() -> Self {
        Self {
            weights: standard_card_weights(),
        }
    }

    pub fn weights(&self) -> &[CardWeight] {
        &self.weights
    }

    pub fn next<R: RandomSupplier + ?Sized>(&self, rng: &mut R) -> Result<Card, EngineError> {
        let weights: Vec<u32> = self.weights.iter().map(|entry| entry.weight).collect();
        let index = rng.weighted_index(&weights)?;
        Ok(Card::new(self.weights[index].kind))
    }
}

/// Weighted factory for special tiles.
#[derive(Debug, Clone)]
pub struct TileGenerator {
    weights: Vec<TileWeight>,
}

impl TileGenerator {
    pub fn new(weights: Vec<TileWeight>) -> Result<Self, EngineError> {
        if let Some(entry) = weights.iter().find(|entry| !entry.tile.is_special()) {
            return Err(EngineError::InvalidWeights(format!(
                "{:?} is not a special tile",
                entry.tile
            )));
        }
        if weights.iter().all(|entry| entry.weight == 0) {
            return Err(EngineError::InvalidWeights(
                "tile weights are empty".to_string(),
            ));
        }
        Ok(Self { weights })
    }

    pub fn standard() -> Self {
        Self {
            weights: standard_tile_weights(),
        }
    }

    pub fn weights(&self) -> &[TileWeight] {
        &self.weights
    }

    pub fn next<R: RandomSupplier + ?Sized>(&self, rng: &mut R) -> Result<Tile, EngineError> {
        let weights: Vec<u32> = self.weights.iter().map(|entry| entry.weight).collect();
        let index = rng.weighted_index(&weights)?;
        Ok(self.weights[index].tile)
    }
}
