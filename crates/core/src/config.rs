use crate::{CardKind, Tile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardWeight {
    pub kind: CardKind,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileWeight {
    pub tile: Tile,
    pub weight: u32,
}

pub fn standard_card_weights() -> Vec<CardWeight> {
    [
        (CardKind::Thunder, 150),
        (CardKind::Tornado, 150),
        (CardKind::Purify, 100),
        (CardKind::Tempest, 70),
        (CardKind::Hellfire, 115),
        (CardKind::Shockwave, 95),
        (CardKind::Earthquake, 70),
        (CardKind::TidalWave, 55),
        (CardKind::Explosion, 105),
        (CardKind::Lightning, 90),
    ]
    .into_iter()
    .map(|(kind, weight)| CardWeight { kind, weight })
    .collect()
}

pub fn standard_tile_weights() -> Vec<TileWeight> {
    [
        (Tile::Enhancement, 160),
        (Tile::Addition, 235),
        (Tile::Clone, 160),
        (Tile::Relocation, 170),
        (Tile::Mystery, 160),
        (Tile::Blessing, 115),
    ]
    .into_iter()
    .map(|(tile, weight)| TileWeight { tile, weight })
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    /// Rows of tile digits; overrides `width`/`height` when present.
    pub layout: Option<Vec<String>>,
    pub queue_size: usize,
    pub starting_turns: i32,
    pub starting_changes: u32,
    pub card_weights: Vec<CardWeight>,
    pub tile_weights: Vec<TileWeight>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            layout: None,
            queue_size: 3,
            starting_turns: 0,
            starting_changes: 0,
            card_weights: standard_card_weights(),
            tile_weights: standard_tile_weights(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"width": 8, "starting_changes": 2}"#).expect("parse");
        assert_eq!(config.width, 8);
        assert_eq!(config.height, 5);
        assert_eq!(config.starting_changes, 2);
        assert_eq!(config.queue_size, 3);
        assert_eq!(config.card_weights, standard_card_weights());
    }

    #[test]
    fn weights_parse_by_name() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"tile_weights": [{"tile": "Blessing", "weight": 1}],
                "layout": ["0110", "1331"]}"#,
        )
        .expect("parse");
        assert_eq!(
            config.tile_weights,
            vec![TileWeight {
                tile: Tile::Blessing,
                weight: 1
            }]
        );
        assert_eq!(config.layout.as_ref().map(Vec::len), Some(2));
    }
}
