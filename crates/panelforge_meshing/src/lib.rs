//! # PANELFORGE Meshing
//!
//! Turns voxel chunks into panels drawn from a fixed size catalog.
//!
//! ## Pipeline
//!
//! 1. [`FaceCuller`]: exposed faces via 64-bit occupancy columns, binned into
//!    planes by direction, depth, material and surface
//! 2. [`GreedyMesher`]: each plane merged into catalog-sized rectangles
//! 3. [`placement`]: rectangles normalized into panel placements
//! 4. [`PanelPipeline`]: per-chunk regeneration and hand-off to the sink
//!
//! ## Example
//!
//! ```rust,ignore
//! use panelforge_core::PanelforgeConfig;
//! use panelforge_meshing::{DefaultAppearance, PanelLibrary, PanelPipeline};
//!
//! let config = PanelforgeConfig::load("panelforge.toml")?;
//! let catalog = config.build_catalog()?;
//! let library = PanelLibrary::for_catalog(&catalog);
//! let appearance = DefaultAppearance::from_config(&config.default_appearance);
//!
//! let mut pipeline = PanelPipeline::new(catalog);
//! let report = pipeline.regenerate_dirty(&mut space, &appearance, &library, &mut sink);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod appearance;
pub mod error;
pub mod face_culler;
pub mod greedy;
pub mod placement;
pub mod regen;

pub use appearance::{AppearanceProvider, DefaultAppearance};
pub use error::{MeshError, MeshResult, PlacementError};
pub use face_culler::{CulledChunk, FaceCuller, FacePlane, PlaneKey};
pub use greedy::{GreedyMesher, PanelRect};
pub use placement::{
    PanelHandle, PanelInstance, PanelLibrary, PanelPlacement, PanelResolver, PlacementSink,
};
pub use regen::{ChunkPanels, PanelPipeline, RegenReport};
