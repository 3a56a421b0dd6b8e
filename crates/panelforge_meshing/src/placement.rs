//! Placement normalization and the external collaborators it feeds.
//!
//! A [`PanelRect`] becomes a [`PanelPlacement`]: a panel asset handle looked
//! up by `(short, long)` edge lengths, a chunk-local position at the centre
//! of the rectangle, and a rotation that lays the panel's long edge along the
//! rectangle's long side.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use panelforge_core::{
    Axis, ChunkCoord, MaterialId, PanelSizeCatalog, Quaternion, SurfaceId, Vec3,
};

use crate::error::PlacementError;
use crate::greedy::PanelRect;

/// Opaque handle to a panel asset.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
pub struct PanelHandle(pub u32);

/// Looks up panel assets by size.
pub trait PanelResolver {
    /// Panel for a `short × long` rectangle (`short <= long`), if one exists.
    fn find_panel(&self, short: u32, long: u32) -> Option<PanelHandle>;
}

/// Table-backed [`PanelResolver`].
#[derive(Debug, Clone, Default)]
pub struct PanelLibrary {
    panels: HashMap<(u32, u32), PanelHandle>,
}

impl PanelLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A library with one panel for every pair of non-zero catalog lengths,
    /// numbered in ascending `(short, long)` order.
    #[must_use]
    pub fn for_catalog(catalog: &PanelSizeCatalog) -> Self {
        let lengths: Vec<u32> = catalog.lengths().iter().copied().filter(|&l| l > 0).collect();
        let mut library = Self::new();
        let mut next = 0u32;
        for (i, &short) in lengths.iter().enumerate() {
            for &long in &lengths[i..] {
                library.insert(short, long, PanelHandle(next));
                next += 1;
            }
        }
        library
    }

    /// Registers a panel. Edge order does not matter.
    pub fn insert(&mut self, a: u32, b: u32, handle: PanelHandle) -> Option<PanelHandle> {
        self.panels.insert((a.min(b), a.max(b)), handle)
    }

    /// Unregisters a panel size.
    pub fn remove(&mut self, a: u32, b: u32) -> Option<PanelHandle> {
        self.panels.remove(&(a.min(b), a.max(b)))
    }

    /// Number of registered sizes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

impl PanelResolver for PanelLibrary {
    fn find_panel(&self, short: u32, long: u32) -> Option<PanelHandle> {
        self.panels.get(&(short, long)).copied()
    }
}

/// A panel ready to be instantiated by a [`PlacementSink`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPlacement {
    /// Chunk the position is relative to.
    pub chunk: ChunkCoord,
    /// Panel asset.
    pub handle: PanelHandle,
    /// Panel centre, chunk-local voxel units.
    pub position: Vec3,
    /// Panel orientation: local +Z along the long edge, local +Y into the
    /// wall.
    pub rotation: Quaternion,
    /// Material.
    pub material: MaterialId,
    /// Surface.
    pub surface: SurfaceId,
    /// Source rectangle.
    pub rect: PanelRect,
}

impl PanelPlacement {
    /// Short edge length.
    #[must_use]
    pub fn short(&self) -> u32 {
        self.rect.width.min(self.rect.height)
    }

    /// Long edge length.
    #[must_use]
    pub fn long(&self) -> u32 {
        self.rect.width.max(self.rect.height)
    }

    /// Flat GPU/FFI-friendly record.
    #[must_use]
    pub fn to_instance(&self) -> PanelInstance {
        PanelInstance {
            position: self.position,
            rotation: self.rotation,
            handle: self.handle.0,
            material: self.material.0,
            surface: self.surface.0,
            short: self.short(),
            long: self.long(),
        }
    }
}

/// Plain-old-data form of a placement, for instance buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PanelInstance {
    /// Panel centre.
    pub position: Vec3,
    /// Panel orientation.
    pub rotation: Quaternion,
    /// Panel asset handle.
    pub handle: u32,
    /// Material id.
    pub material: u32,
    /// Surface id.
    pub surface: u32,
    /// Short edge.
    pub short: u32,
    /// Long edge.
    pub long: u32,
}

/// Receives a chunk's placements and creates, moves or destroys the scene
/// objects for them. Replaces whatever it holds for the chunk.
pub trait PlacementSink {
    /// Publishes a chunk's panels. `skipped` lists rectangles that had no
    /// panel asset.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError`] if the chunk could not be published; the
    /// chunk then stays dirty.
    fn replace_chunk(
        &mut self,
        chunk: ChunkCoord,
        placements: &[PanelPlacement],
        skipped: &[PanelRect],
    ) -> Result<(), PlacementError>;
}

fn axis_vec(axis: Axis) -> Vec3 {
    match axis {
        Axis::X => Vec3::X,
        Axis::Y => Vec3::Y,
        Axis::Z => Vec3::Z,
    }
}

fn set_component(v: &mut [f32; 3], axis: Axis, value: f32) {
    v[axis.index()] = value;
}

/// Chunk-local centre of a rectangle on its face plane.
#[must_use]
pub fn rect_center(rect: &PanelRect) -> Vec3 {
    let axis = rect.axis();
    let (u_axis, v_axis) = axis.plane_axes();
    let plane = if rect.direction.is_positive() {
        rect.depth + 1
    } else {
        rect.depth
    };

    let mut pos = [0.0f32; 3];
    set_component(&mut pos, axis, plane as f32);
    set_component(&mut pos, u_axis, rect.start_u as f32 + rect.width as f32 / 2.0);
    set_component(&mut pos, v_axis, rect.start_v as f32 + rect.height as f32 / 2.0);
    Vec3::new(pos[0], pos[1], pos[2])
}

/// Orientation of a rectangle's panel: forward along the long edge (the `v`
/// axis when `height >= width`), up along the inward face normal.
#[must_use]
pub fn rect_rotation(rect: &PanelRect) -> Quaternion {
    let (u_axis, v_axis) = rect.axis().plane_axes();
    let long_axis = if rect.height >= rect.width { v_axis } else { u_axis };
    let [x, y, z] = rect.direction.opposite().offset();
    let inward = Vec3::new(x as f32, y as f32, z as f32);
    Quaternion::look_rotation(axis_vec(long_axis), inward)
}

/// Normalizes a rectangle into a placement, or `None` if the resolver has
/// no panel of that size.
pub fn place<R: PanelResolver + ?Sized>(
    chunk: ChunkCoord,
    rect: &PanelRect,
    resolver: &R,
) -> Option<PanelPlacement> {
    let short = rect.width.min(rect.height);
    let long = rect.width.max(rect.height);
    let handle = resolver.find_panel(short, long)?;
    Some(PanelPlacement {
        chunk,
        handle,
        position: rect_center(rect),
        rotation: rect_rotation(rect),
        material: rect.material,
        surface: rect.surface,
        rect: *rect,
    })
}
