//! Process-wide configuration.
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file yields the standard setup:
//!
//! ```toml
//! chunk_size = 32
//!
//! [catalog]
//! lengths = [0, 1, 2, 3, 4, 5, 6, 8, 10, 12, 14, 16, 18, 20]
//!
//! [default_appearance]
//! material = 1
//! surface = 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{PanelSizeCatalog, STANDARD_LENGTHS};
use crate::chunk::{validate_chunk_size, DEFAULT_CHUNK_SIZE};
use crate::error::{CoreError, CoreResult};
use crate::space::ChunkSpace;
use crate::voxel::{MaterialId, SurfaceId};

/// Panel catalog section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Permitted edge lengths, strictly ascending.
    pub lengths: Vec<u32>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            lengths: STANDARD_LENGTHS.to_vec(),
        }
    }
}

/// Fallback appearance for faces with nothing assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Material id.
    pub material: u32,
    /// Surface id.
    pub surface: u32,
}

impl AppearanceConfig {
    /// Material as a typed id.
    #[must_use]
    pub const fn material_id(&self) -> MaterialId {
        MaterialId::new(self.material)
    }

    /// Surface as a typed id.
    #[must_use]
    pub const fn surface_id(&self) -> SurfaceId {
        SurfaceId::new(self.surface)
    }
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            material: 1,
            surface: 1,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelforgeConfig {
    /// Voxels per chunk edge.
    pub chunk_size: usize,
    /// Panel size catalog.
    pub catalog: CatalogConfig,
    /// Default face appearance.
    pub default_appearance: AppearanceConfig,
}

impl Default for PanelforgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            catalog: CatalogConfig::default(),
            default_appearance: AppearanceConfig::default(),
        }
    }
}

impl PanelforgeConfig {
    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] for malformed TOML, or the
    /// validation error for a bad chunk size or catalog.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the file cannot be read, otherwise as
    /// [`PanelforgeConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            chunk_size = config.chunk_size,
            lengths = config.catalog.lengths.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Serializes back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> CoreResult<String> {
        toml::to_string(self).map_err(|e| CoreError::InvalidConfig(e.to_string()))
    }

    /// Checks chunk size and catalog.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> CoreResult<()> {
        validate_chunk_size(self.chunk_size)?;
        self.build_catalog().map(|_| ())
    }

    /// Builds the immutable panel catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCatalog`] if the lengths are invalid.
    pub fn build_catalog(&self) -> CoreResult<PanelSizeCatalog> {
        PanelSizeCatalog::new(&self.catalog.lengths)
    }

    /// Builds an empty chunk space with the configured chunk size.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidChunkSize`] if the size is out of range.
    pub fn build_space(&self) -> CoreResult<ChunkSpace> {
        ChunkSpace::new(self.chunk_size)
    }
}
