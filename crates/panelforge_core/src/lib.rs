//! # PANELFORGE Core
//!
//! Voxel storage and chunk addressing for catalog-constrained panel meshing.
//!
//! ## Design Principles
//!
//! 1. **Flat storage**: each chunk is one dense `N³` voxel array
//! 2. **Total sampling**: reads outside any chunk degrade to empty voxels
//! 3. **Handles, not references**: chunks are addressed by [`ChunkId`]
//! 4. **Immutable catalog**: panel sizes are fixed at startup
//!
//! ## Core Components
//!
//! - `PanelSizeCatalog`: permitted panel edge lengths
//! - `Voxel` / `VoxelChunk`: per-cell data and dense chunk storage
//! - `ChunkSpace`: coordinate registry with cross-chunk addressing
//! - `edit`: extrude, intrude, paint and flood-fill on voxel faces
//! - `persistence`: compressed snapshots of a whole space
//!
//! ## Example
//!
//! ```rust,ignore
//! use panelforge_core::{ChunkCoord, ChunkSpace, LocalPos, Voxel};
//!
//! let mut space = ChunkSpace::new(32)?;
//! let origin = space.create_chunk(ChunkCoord::new(0, 0, 0));
//!
//! // Writing one past the edge lands in (and creates) the neighbor.
//! let right = space.set_voxel(origin, LocalPos::new(32, 0, 0), Voxel::wall());
//! assert_ne!(right, Some(origin));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod catalog;
pub mod chunk;
pub mod config;
pub mod edit;
pub mod error;
pub mod math;
pub mod persistence;
pub mod space;
pub mod voxel;

pub use catalog::{PanelSizeCatalog, STANDARD_LENGTHS};
pub use chunk::{ChunkCoord, LocalPos, VoxelChunk, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
pub use config::{AppearanceConfig, CatalogConfig, PanelforgeConfig};
pub use edit::FaceRef;
pub use error::{CoreError, CoreResult};
pub use math::{Quaternion, Vec3};
pub use space::{ChunkId, ChunkSpace, ChunkView};
pub use voxel::{Axis, FaceDirection, MaterialId, SurfaceId, Voxel, VoxelKind};
