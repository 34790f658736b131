//! Splat Texture Set
//!
//! Up to [`MAX_GROUND_TEXTURES`] decoded ground layers and the three blend
//! units that pick which layer each splat slot samples:
//!
//! - unit `A`: lowland layer, shown where the vertex grey is white
//! - unit `B`: cliff layer, blended in by the vertex alpha
//! - unit `C`: highland layer, shown where the vertex grey is black
//!
//! Units can be cycled at runtime to swap which ground layer they show.

use std::path::Path;

use crate::error::{Result, TerrainError};

/// Ground layers a set can hold.
pub const MAX_GROUND_TEXTURES: usize = 4;

/// Edge length of the procedural fallback layers.
pub const PROCEDURAL_TEXTURE_SIZE: u32 = 64;

/// One of the three splat blend slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendUnit {
    A,
    B,
    C,
}

impl BlendUnit {
    pub const ALL: [BlendUnit; 3] = [BlendUnit::A, BlendUnit::B, BlendUnit::C];

    fn slot(self) -> usize {
        match self {
            BlendUnit::A => 0,
            BlendUnit::B => 1,
            BlendUnit::C => 2,
        }
    }
}

/// Decoded ground layers plus the layer index bound to each blend unit.
#[derive(Clone, Debug)]
pub struct TerrainTextureSet {
    layers: Vec<image::RgbaImage>,
    units: [usize; 3],
}

impl TerrainTextureSet {
    /// Decode ground layers from image files, bottom layer first. Files past
    /// [`MAX_GROUND_TEXTURES`] are ignored.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(TerrainError::invalid_params("no ground textures given"));
        }
        if paths.len() > MAX_GROUND_TEXTURES {
            log::warn!(
                "[Textures] {} ground textures given, only the first {} are used",
                paths.len(),
                MAX_GROUND_TEXTURES
            );
        }

        let mut layers = Vec::with_capacity(MAX_GROUND_TEXTURES);
        for path in paths.iter().take(MAX_GROUND_TEXTURES) {
            let path = path.as_ref();
            let img = image::open(path)
                .map_err(|source| TerrainError::Texture {
                    path: path.to_path_buf(),
                    source,
                })?
                .to_rgba8();
            log::debug!(
                "[Textures] Loaded {} ({}x{})",
                path.display(),
                img.width(),
                img.height()
            );
            layers.push(img);
        }
        log::info!("[Textures] Loaded {} ground layers", layers.len());
        Ok(Self::from_layers(layers))
    }

    /// Four solid-tinted checker layers for headless runs and tests.
    pub fn procedural() -> Self {
        const TINTS: [[u8; 3]; MAX_GROUND_TEXTURES] = [
            [74, 110, 46],   // grass
            [120, 116, 110], // rock
            [92, 70, 48],    // dirt
            [200, 184, 140], // sand
        ];
        let size = PROCEDURAL_TEXTURE_SIZE;
        let layers = TINTS
            .iter()
            .map(|tint| {
                image::RgbaImage::from_fn(size, size, |x, y| {
                    let shade = if ((x / 8) + (y / 8)) % 2 == 0 { 1.0 } else { 0.85 };
                    let [r, g, b] = tint.map(|c| (c as f32 * shade) as u8);
                    image::Rgba([r, g, b, 255])
                })
            })
            .collect();
        Self::from_layers(layers)
    }

    fn from_layers(layers: Vec<image::RgbaImage>) -> Self {
        let count = layers.len().max(1);
        Self {
            layers,
            units: [0, 2 % count, 1 % count],
        }
    }

    pub fn layers(&self) -> &[image::RgbaImage] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layer index currently bound to `unit`.
    pub fn layer_index(&self, unit: BlendUnit) -> usize {
        self.units[unit.slot()]
    }

    /// Layer image currently bound to `unit`.
    pub fn layer_for(&self, unit: BlendUnit) -> Option<&image::RgbaImage> {
        self.layers.get(self.layer_index(unit))
    }

    /// Advance `unit` to the next loaded layer, wrapping around.
    /// Returns the new layer index.
    pub fn cycle_unit(&mut self, unit: BlendUnit) -> usize {
        let count = self.layers.len().max(1);
        let slot = &mut self.units[unit.slot()];
        *slot = (*slot + 1) % count;
        log::debug!("[Textures] Unit {:?} now shows layer {}", unit, *slot);
        *slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedural_initial_units() {
        let set = TerrainTextureSet::procedural();
        assert_eq!(set.layer_count(), MAX_GROUND_TEXTURES);
        assert_eq!(set.layer_index(BlendUnit::A), 0);
        assert_eq!(set.layer_index(BlendUnit::B), 2);
        assert_eq!(set.layer_index(BlendUnit::C), 1);
        assert!(set.layer_for(BlendUnit::B).is_some());
    }

    #[test]
    fn test_cycle_unit_wraps() {
        let mut set = TerrainTextureSet::procedural();
        assert_eq!(set.cycle_unit(BlendUnit::B), 3);
        assert_eq!(set.cycle_unit(BlendUnit::B), 0);
        assert_eq!(set.cycle_unit(BlendUnit::B), 1);
        // Other units are untouched
        assert_eq!(set.layer_index(BlendUnit::A), 0);
        assert_eq!(set.layer_index(BlendUnit::C), 1);
    }

    #[test]
    fn test_cycle_wraps_on_loaded_count() {
        let mut set = TerrainTextureSet::from_layers(vec![image::RgbaImage::new(2, 2); 2]);
        assert_eq!(set.layer_index(BlendUnit::B), 0);
        assert_eq!(set.cycle_unit(BlendUnit::A), 1);
        assert_eq!(set.cycle_unit(BlendUnit::A), 0);
    }

    #[test]
    fn test_missing_file_is_texture_error() {
        let err = TerrainTextureSet::load(&["definitely/not/here.png"]).unwrap_err();
        match err {
            TerrainError::Texture { path, .. } => assert!(path.ends_with("here.png")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_load_decodes_png() {
        let path = std::env::temp_dir().join("motor_terrain_layer.png");
        image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        let set = TerrainTextureSet::load(&[&path]).unwrap();
        assert_eq!(set.layer_count(), 1);
        assert_eq!(set.layer_for(BlendUnit::C).unwrap().get_pixel(0, 0).0, [1, 2, 3, 255]);
        let _ = std::fs::remove_file(&path);
    }
}
