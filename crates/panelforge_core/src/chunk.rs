//! Voxel chunk data structures.
//!
//! A chunk owns a dense `N×N×N` array of voxels. `N` is shared by every chunk
//! of a [`ChunkSpace`](crate::space::ChunkSpace) and capped at
//! [`MAX_CHUNK_SIZE`] so a padded occupancy column fits a `u64`.

use crate::error::{CoreError, CoreResult};
use crate::voxel::{FaceDirection, Voxel};

/// Default chunk dimension - 32 voxels per axis.
pub const DEFAULT_CHUNK_SIZE: usize = 32;

/// Largest supported chunk dimension (`N + 2` padded bits per `u64` column).
pub const MAX_CHUNK_SIZE: usize = 62;

/// Validates a chunk edge length.
///
/// # Errors
///
/// Returns [`CoreError::InvalidChunkSize`] outside `1..=MAX_CHUNK_SIZE`.
pub fn validate_chunk_size(size: usize) -> CoreResult<usize> {
    if (1..=MAX_CHUNK_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(CoreError::InvalidChunkSize {
            size,
            max: MAX_CHUNK_SIZE,
        })
    }
}

/// Chunk coordinate in chunk space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkCoord {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Neighbor coordinate one step along a face direction.
    #[inline]
    #[must_use]
    pub const fn neighbor(self, face: FaceDirection) -> Self {
        let [dx, dy, dz] = face.offset();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Voxel position relative to a chunk's origin.
///
/// May lie outside `[0, N)`; such positions are resolved through the chunk
/// space or sampled as empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalPos {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl LocalPos {
    /// Creates a new local position.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Creates a position from an `[x, y, z]` array.
    #[inline]
    #[must_use]
    pub const fn from_array(a: [i32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    /// Converts to an `[x, y, z]` array.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns true if every coordinate is within `[0, size)`.
    #[inline]
    #[must_use]
    pub const fn in_bounds(self, size: usize) -> bool {
        let n = size as i32;
        self.x >= 0 && self.x < n && self.y >= 0 && self.y < n && self.z >= 0 && self.z < n
    }

    /// The position one step along a face direction.
    #[inline]
    #[must_use]
    pub const fn step(self, face: FaceDirection) -> Self {
        let [dx, dy, dz] = face.offset();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The position one step against a face direction.
    #[inline]
    #[must_use]
    pub const fn step_back(self, face: FaceDirection) -> Self {
        self.step(face.opposite())
    }
}

/// A chunk of voxels - `N×N×N` cells in a flat dense array.
///
/// Layout: `cells[x + N * (y + N * z)]`.
#[derive(Debug, Clone)]
pub struct VoxelChunk {
    /// The coordinate of this chunk in chunk space.
    coord: ChunkCoord,

    /// Edge length.
    size: usize,

    /// Voxel data - always exactly `size³` cells.
    cells: Box<[Voxel]>,

    /// Dirty flag - set when the chunk needs regenerating.
    dirty: bool,

    /// Number of solid voxels (for quick empty checks).
    solid_count: u32,
}

impl VoxelChunk {
    /// Creates a new empty, dirty chunk at the given coordinate.
    ///
    /// `size` must already be validated by the owning space.
    #[must_use]
    pub fn new(coord: ChunkCoord, size: usize) -> Self {
        debug_assert!((1..=MAX_CHUNK_SIZE).contains(&size));
        Self {
            coord,
            size,
            cells: vec![Voxel::EMPTY; size * size * size].into_boxed_slice(),
            dirty: true,
            solid_count: 0,
        }
    }

    /// Rebuilds a chunk from a stored dense array.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PayloadSizeMismatch`] if `cells` is not `size³`
    /// long, or [`CoreError::CorruptVoxel`] for an ill-formed cell.
    pub fn from_cells(
        coord: ChunkCoord,
        size: usize,
        cells: Box<[Voxel]>,
        dirty: bool,
    ) -> CoreResult<Self> {
        let size = validate_chunk_size(size)?;
        let volume = size * size * size;
        if cells.len() != volume {
            return Err(CoreError::PayloadSizeMismatch {
                expected: volume * Voxel::SIZE,
                actual: cells.len() * Voxel::SIZE,
            });
        }
        if let Some(index) = cells.iter().position(|v| !v.is_well_formed()) {
            return Err(CoreError::CorruptVoxel { index });
        }
        let solid_count = cells.iter().filter(|v| v.is_solid()).count() as u32;
        Ok(Self {
            coord,
            size,
            cells,
            dirty,
            solid_count,
        })
    }

    /// Returns the chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the edge length.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns true if the chunk needs regenerating.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the chunk as needing regeneration.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the dirty flag.
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Returns true if the chunk has no solid voxels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.solid_count == 0
    }

    /// Returns the number of solid voxels.
    #[inline]
    #[must_use]
    pub const fn solid_count(&self) -> u32 {
        self.solid_count
    }

    /// Dense cell array, `x + N * (y + N * z)` order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Voxel] {
        &self.cells
    }

    /// Linear index for a local position, or `None` out of bounds.
    #[inline]
    #[must_use]
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if LocalPos::new(x, y, z).in_bounds(self.size) {
            let n = self.size;
            Some(x as usize + n * (y as usize + n * z as usize))
        } else {
            None
        }
    }

    /// Samples a voxel; any out-of-bounds coordinate yields an empty voxel.
    #[inline]
    #[must_use]
    pub fn safe_sample(&self, x: i32, y: i32, z: i32) -> Voxel {
        self.index(x, y, z)
            .map_or(Voxel::EMPTY, |idx| self.cells[idx])
    }

    /// Stores a voxel and marks the chunk dirty.
    ///
    /// Out-of-bounds writes are silently dropped; returns whether the write
    /// landed.
    pub fn safe_set(&mut self, pos: LocalPos, voxel: Voxel) -> bool {
        let Some(idx) = self.index(pos.x, pos.y, pos.z) else {
            return false;
        };
        let old = self.cells[idx];

        // Update solid count
        if old.is_solid() && voxel.is_empty() {
            self.solid_count -= 1;
        } else if old.is_empty() && voxel.is_solid() {
            self.solid_count += 1;
        }

        self.cells[idx] = voxel;
        self.dirty = true;
        true
    }

    /// Resets every cell to empty and marks the chunk dirty.
    pub fn regen(&mut self) {
        self.cells.fill(Voxel::EMPTY);
        self.solid_count = 0;
        self.dirty = true;
    }

    /// Returns the voxel data as a byte slice for snapshots.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.cells)
    }
}
