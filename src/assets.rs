//! Sprite assets with a procedural fallback
//!
//! Sprites are small vector drawings described in a JSON manifest. Anything
//! that goes wrong while loading one falls back to the built-in artwork, so a
//! missing or broken asset never stops the game.

use std::collections::HashMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{BIRD_SPRITE_HEIGHT, BIRD_SPRITE_WIDTH};
use crate::renderer::draw::Color;

/// Sprite the bird uses when gliding
pub const BIRD: &str = "bird";
/// Sprite the bird uses while the flap animation runs
pub const BIRD_FLAP: &str = "bird_flap";

/// One shape of a sprite, in sprite-local pixels (origin top-left)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SpritePart {
    /// Ellipse inscribed in `[x, y, w, h]`
    Ellipse { bounds: [f32; 4], color: Color },
    /// Ellipse outline of the given stroke width
    EllipseOutline {
        bounds: [f32; 4],
        width: f32,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    /// Convex polygon
    Polygon { points: Vec<Vec2>, color: Color },
    Rect { bounds: [f32; 4], color: Color },
}

/// A vector sprite drawn centered on its owner's position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub size: Vec2,
    pub parts: Vec<SpritePart>,
}

/// Errors raised while loading sprite assets
#[derive(Debug, Error)]
pub enum AssetError {
    /// The manifest file could not be read
    #[error("failed to read sprite manifest: {0}")]
    Io(#[from] std::io::Error),
    /// The manifest is not valid sprite JSON
    #[error("invalid sprite manifest: {0}")]
    Parse(#[from] serde_json::Error),
    /// The manifest does not define a required sprite
    #[error("sprite manifest has no '{0}' entry")]
    MissingSprite(String),
}

/// Named sprites available to the renderer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub sprites: HashMap<String, Sprite>,
}

impl SpriteSheet {
    /// Sheet containing only the procedural artwork
    pub fn builtin() -> Self {
        let mut sprites = HashMap::new();
        sprites.insert(BIRD.to_string(), procedural_bird(false));
        sprites.insert(BIRD_FLAP.to_string(), procedural_bird(true));
        Self { sprites }
    }

    /// Parse a manifest; it must at least define the bird
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let sheet: SpriteSheet = serde_json::from_str(json)?;
        if !sheet.sprites.contains_key(BIRD) {
            return Err(AssetError::MissingSprite(BIRD.to_string()));
        }
        Ok(sheet)
    }

    /// Read a manifest from disk
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a manifest, falling back to the built-in artwork on any error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(mut sheet) => {
                log::info!("Loaded {} sprites from {}", sheet.sprites.len(), path.display());
                // Fill gaps (e.g. no flap frame) from the built-in set
                for (name, sprite) in Self::builtin().sprites {
                    sheet.sprites.entry(name).or_insert(sprite);
                }
                sheet
            }
            Err(e) => {
                log::warn!("{e}; using procedural sprites");
                Self::builtin()
            }
        }
    }

    /// Look up a sprite, using the plain bird for unknown names
    pub fn get(&self, name: &str) -> Option<&Sprite> {
        self.sprites.get(name).or_else(|| self.sprites.get(BIRD))
    }
}

/// The fallback bird: yellow body, wing, eye, beak and outline on a 50x35 canvas
pub fn procedural_bird(wings_up: bool) -> Sprite {
    const YELLOW: Color = [255, 220, 50, 255];
    const WING: Color = [200, 150, 0, 255];
    const BLACK: Color = [0, 0, 0, 255];
    const WHITE: Color = [255, 255, 255, 255];
    const RED: Color = [255, 80, 80, 255];

    let wing_y = if wings_up { 8.0 } else { 15.0 };

    Sprite {
        size: Vec2::new(BIRD_SPRITE_WIDTH, BIRD_SPRITE_HEIGHT),
        parts: vec![
            SpritePart::Ellipse {
                bounds: [5.0, 5.0, 40.0, 25.0],
                color: YELLOW,
            },
            SpritePart::Ellipse {
                bounds: [15.0, wing_y, 25.0, 15.0],
                color: WING,
            },
            SpritePart::Circle {
                center: Vec2::new(40.0, 15.0),
                radius: 4.0,
                color: BLACK,
            },
            SpritePart::Circle {
                center: Vec2::new(41.0, 14.0),
                radius: 1.0,
                color: WHITE,
            },
            SpritePart::Polygon {
                points: vec![
                    Vec2::new(45.0, 18.0),
                    Vec2::new(50.0, 15.0),
                    Vec2::new(50.0, 21.0),
                ],
                color: RED,
            },
            SpritePart::EllipseOutline {
                bounds: [5.0, 5.0, 40.0, 25.0],
                width: 2.0,
                color: BLACK,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_both_bird_frames() {
        let sheet = SpriteSheet::builtin();
        assert!(sheet.sprites.contains_key(BIRD));
        assert!(sheet.sprites.contains_key(BIRD_FLAP));
        assert_ne!(sheet.sprites[BIRD], sheet.sprites[BIRD_FLAP]);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let sheet = SpriteSheet::load("/definitely/not/here/sprites.json");
        assert_eq!(sheet, SpriteSheet::builtin());
    }

    #[test]
    fn test_try_load_reports_io_error() {
        let err = SpriteSheet::try_load("/definitely/not/here/sprites.json").unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
        assert!(err.to_string().starts_with("failed to read sprite manifest"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_manifest_without_bird_is_rejected() {
        let err = SpriteSheet::from_json(r#"{"sprites": {}}"#).unwrap_err();
        assert!(matches!(err, AssetError::MissingSprite(ref name) if name == BIRD));
        assert_eq!(err.to_string(), "sprite manifest has no 'bird' entry");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_garbage_manifest_is_parse_error() {
        let err = SpriteSheet::from_json("not json").unwrap_err();
        assert!(matches!(err, AssetError::Parse(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_manifest_roundtrips_through_json() {
        let json = r#"{
            "sprites": {
                "bird": {
                    "size": [20.0, 10.0],
                    "parts": [
                        { "shape": "rect", "bounds": [0.0, 0.0, 20.0, 10.0], "color": [255, 0, 0, 255] },
                        { "shape": "circle", "center": [10.0, 5.0], "radius": 3.0, "color": [0, 0, 0, 255] }
                    ]
                }
            }
        }"#;
        let sheet = SpriteSheet::from_json(json).unwrap();
        let bird = sheet.get(BIRD).unwrap();
        assert_eq!(bird.size, Vec2::new(20.0, 10.0));
        assert_eq!(bird.parts.len(), 2);
    }

    #[test]
    fn test_unknown_name_resolves_to_bird() {
        let sheet = SpriteSheet::builtin();
        assert_eq!(sheet.get("pelican"), sheet.get(BIRD));
    }
}
