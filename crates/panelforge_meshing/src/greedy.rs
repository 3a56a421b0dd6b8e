//! Greedy rectangle merging constrained to catalog panel sizes.
//!
//! ## Algorithm
//!
//! Rows `u` are visited in ascending order, bits `v` ascending within a row:
//!
//! 1. Find the next set bit with a trailing-zero count.
//! 2. Measure the run of set bits from there and snap it *down* to the
//!    largest catalog length; that is the rectangle height.
//! 3. Grow the width across following rows while their `[v, v + height)`
//!    band is fully set. When `width + 1` is not a catalog length, probe
//!    ahead to the next catalog length and jump there only if every probed
//!    row is full; otherwise keep the last valid width.
//! 4. Clear the band in every consumed row, emit the rectangle, and continue
//!    in the same row at `v + height`.
//!
//! With the unit length in the catalog this covers every set bit exactly
//! once.

use panelforge_core::{Axis, FaceDirection, MaterialId, PanelSizeCatalog, SurfaceId};

use crate::face_culler::{CulledChunk, FacePlane, PlaneKey};

/// A catalog-sized rectangle of faces on one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelRect {
    /// First row covered.
    pub start_u: u32,
    /// First bit covered.
    pub start_v: u32,
    /// Extent along `u` (rows).
    pub width: u32,
    /// Extent along `v` (bits).
    pub height: u32,
    /// Face material.
    pub material: MaterialId,
    /// Face surface.
    pub surface: SurfaceId,
    /// Face direction.
    pub direction: FaceDirection,
    /// Depth of the faced voxels along the direction's axis.
    pub depth: u32,
}

impl PanelRect {
    /// Axis the rectangle is perpendicular to.
    #[inline]
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.direction.axis()
    }

    /// Number of faces covered.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Returns true if the face at `(u, v)` lies inside the rectangle.
    #[inline]
    #[must_use]
    pub const fn contains(&self, u: u32, v: u32) -> bool {
        u >= self.start_u
            && u < self.start_u + self.width
            && v >= self.start_v
            && v < self.start_v + self.height
    }
}

/// Mask of the low `len` bits.
#[inline]
const fn low_bits(len: u32) -> u64 {
    if len >= 64 {
        u64::MAX
    } else {
        (1u64 << len) - 1
    }
}

/// Greedy meshing engine.
///
/// Owns the catalog and reuses its row and output buffers between chunks.
/// [`PanelSizeCatalog::new`] only accepts catalogs containing `1`, so a set
/// bit always snaps to a height of at least one and no face is left uncovered.
#[derive(Debug, Clone)]
pub struct GreedyMesher {
    catalog: PanelSizeCatalog,
    /// Working copy of the plane being merged.
    rows: Vec<u64>,
    /// Rectangles of the last `mesh` call.
    output: Vec<PanelRect>,
}

impl GreedyMesher {
    /// Creates a mesher for a catalog.
    #[must_use]
    pub fn new(catalog: PanelSizeCatalog) -> Self {
        Self {
            catalog,
            rows: Vec::new(),
            output: Vec::new(),
        }
    }

    /// The catalog rectangles are restricted to.
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &PanelSizeCatalog {
        &self.catalog
    }

    /// Merges every plane of a culled chunk, in plane key order.
    ///
    /// The returned slice is valid until the next call.
    pub fn mesh(&mut self, culled: &CulledChunk) -> &[PanelRect] {
        self.output.clear();
        for (key, plane) in culled.planes() {
            self.merge_plane(key, plane);
        }
        &self.output
    }

    /// Merges a single plane.
    pub fn mesh_plane(&mut self, key: &PlaneKey, plane: &FacePlane) -> &[PanelRect] {
        self.output.clear();
        self.merge_plane(key, plane);
        &self.output
    }

    fn merge_plane(&mut self, key: &PlaneKey, plane: &FacePlane) {
        self.rows.clear();
        self.rows.extend_from_slice(plane.rows());
        let size = self.rows.len();

        for u in 0..size {
            let mut v = 0u32;
            while v < 64 {
                let rest = self.rows[u] >> v;
                if rest == 0 {
                    break;
                }
                v += rest.trailing_zeros();

                let raw = (self.rows[u] >> v).trailing_ones();
                let height = self.catalog.snap_down(raw);
                // Unreachable while the catalog holds unit length.
                if height == 0 {
                    break;
                }
                let band = low_bits(height) << v;
                self.rows[u] &= !band;

                let width = self.grow_width(u, band);
                self.output.push(PanelRect {
                    start_u: u as u32,
                    start_v: v,
                    width,
                    height,
                    material: key.material,
                    surface: key.surface,
                    direction: key.direction,
                    depth: key.depth,
                });
                v += height;
            }
        }
    }

    /// Extends a rectangle starting at row `u` across following rows whose
    /// `band` is full, clearing the band in each consumed row.
    fn grow_width(&mut self, u: usize, band: u64) -> u32 {
        let size = self.rows.len();
        let full = |row: u64| row & band == band;
        let mut width = 1u32;

        loop {
            let next = u + width as usize;
            if next >= size || !full(self.rows[next]) {
                break;
            }
            if self.catalog.contains(width + 1) {
                self.rows[next] &= !band;
                width += 1;
                continue;
            }

            // Width + 1 is not a panel size: jump to the next one or stop.
            let Some(target) = self.catalog.next_above(width) else {
                break;
            };
            let end = u + target as usize;
            if end > size || !self.rows[next..end].iter().all(|&row| full(row)) {
                break;
            }
            for row in &mut self.rows[next..end] {
                *row &= !band;
            }
            width = target;
        }
        width
    }
}
