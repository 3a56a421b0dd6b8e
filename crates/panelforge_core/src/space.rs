//! Chunk space management.
//!
//! Owns every chunk and resolves local positions that spill over a chunk
//! boundary into the neighboring chunk. Chunks refer back to the space only
//! through [`ChunkId`] handles.

use std::collections::HashMap;

use crate::chunk::{validate_chunk_size, ChunkCoord, LocalPos, VoxelChunk, DEFAULT_CHUNK_SIZE};
use crate::error::{CoreError, CoreResult};
use crate::voxel::{FaceDirection, Voxel};

/// Handle to a chunk registered in a [`ChunkSpace`].
///
/// Handles are never reused; a handle to a removed chunk simply resolves to
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkId(usize);

impl ChunkId {
    /// Slot index of this handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Registry of chunks keyed by chunk coordinate.
#[derive(Debug, Clone)]
pub struct ChunkSpace {
    /// Edge length shared by every chunk.
    chunk_size: usize,

    /// Chunk storage; removed chunks leave a `None` slot.
    slots: Vec<Option<VoxelChunk>>,

    /// Coordinate lookup. Each occupied coordinate maps to exactly one slot.
    table: HashMap<ChunkCoord, ChunkId>,
}

impl ChunkSpace {
    /// Creates an empty space with the given chunk edge length.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidChunkSize`] if the size is out of range.
    pub fn new(chunk_size: usize) -> CoreResult<Self> {
        Ok(Self {
            chunk_size: validate_chunk_size(chunk_size)?,
            slots: Vec::new(),
            table: HashMap::new(),
        })
    }

    /// Edge length of every chunk in this space.
    #[inline]
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of live chunks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true if no chunk exists.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Looks up the chunk at a coordinate.
    #[inline]
    #[must_use]
    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<ChunkId> {
        self.table.get(&coord).copied()
    }

    /// Borrows a chunk by handle.
    #[inline]
    #[must_use]
    pub fn chunk(&self, id: ChunkId) -> Option<&VoxelChunk> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Mutably borrows a chunk by handle.
    #[inline]
    pub fn chunk_mut(&mut self, id: ChunkId) -> Option<&mut VoxelChunk> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Borrows the chunk at a coordinate.
    #[must_use]
    pub fn chunk_at(&self, coord: ChunkCoord) -> Option<&VoxelChunk> {
        self.get_chunk(coord).and_then(|id| self.chunk(id))
    }

    /// Borrows a chunk together with this space for neighbor-aware reads.
    #[must_use]
    pub fn view(&self, id: ChunkId) -> Option<ChunkView<'_>> {
        self.chunk(id).map(|chunk| ChunkView {
            space: self,
            id,
            chunk,
        })
    }

    /// Creates an empty chunk at a coordinate.
    ///
    /// Returns the existing chunk if the coordinate is already occupied.
    pub fn create_chunk(&mut self, coord: ChunkCoord) -> ChunkId {
        if let Some(id) = self.get_chunk(coord) {
            return id;
        }
        let id = ChunkId(self.slots.len());
        self.slots.push(Some(VoxelChunk::new(coord, self.chunk_size)));
        self.table.insert(coord, id);
        tracing::trace!(x = coord.x, y = coord.y, z = coord.z, "chunk created");
        id
    }

    /// Removes a chunk, returning it if it existed.
    pub fn remove_chunk(&mut self, id: ChunkId) -> Option<VoxelChunk> {
        let chunk = self.slots.get_mut(id.0)?.take()?;
        self.table.remove(&chunk.coord());
        Some(chunk)
    }

    /// Registers a fully built chunk of this space's size (snapshot restore).
    pub(crate) fn insert_chunk(&mut self, chunk: VoxelChunk) -> CoreResult<ChunkId> {
        debug_assert_eq!(chunk.size(), self.chunk_size);
        let coord = chunk.coord();
        if self.table.contains_key(&coord) {
            return Err(CoreError::DuplicateChunk {
                x: coord.x,
                y: coord.y,
                z: coord.z,
            });
        }
        let id = ChunkId(self.slots.len());
        self.slots.push(Some(chunk));
        self.table.insert(coord, id);
        Ok(id)
    }

    /// Iterates live chunks in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkId, &VoxelChunk)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|chunk| (ChunkId(i), chunk)))
    }

    /// Handles of all dirty chunks, ordered by chunk coordinate.
    #[must_use]
    pub fn dirty_chunks(&self) -> Vec<ChunkId> {
        let mut dirty: Vec<(ChunkCoord, ChunkId)> = self
            .iter()
            .filter(|(_, chunk)| chunk.is_dirty())
            .map(|(id, chunk)| (chunk.coord(), id))
            .collect();
        dirty.sort_unstable();
        dirty.into_iter().map(|(_, id)| id).collect()
    }

    /// Wraps a position that overflows the chunk by at most one chunk width
    /// per axis. Returns the target coordinate, the wrapped position, and
    /// whether any axis overflowed.
    fn wrap(&self, origin: ChunkCoord, pos: LocalPos) -> (ChunkCoord, LocalPos, bool) {
        let n = self.chunk_size as i32;
        let mut coord = [origin.x, origin.y, origin.z];
        let mut local = pos.to_array();
        let mut overflowed = false;
        for axis in 0..3 {
            if local[axis] < 0 {
                coord[axis] -= 1;
                local[axis] += n;
                overflowed = true;
            } else if local[axis] >= n {
                coord[axis] += 1;
                local[axis] -= n;
                overflowed = true;
            }
        }
        (
            ChunkCoord::new(coord[0], coord[1], coord[2]),
            LocalPos::from_array(local),
            overflowed,
        )
    }

    /// Resolves a position relative to `origin` without creating chunks.
    ///
    /// An absent neighbor resolves to the origin and the unwrapped position,
    /// so sampling it yields an empty voxel.
    #[must_use]
    pub fn resolve(&self, origin: ChunkId, pos: LocalPos) -> Option<(ChunkId, LocalPos)> {
        let origin_coord = self.chunk(origin)?.coord();
        let (coord, wrapped, overflowed) = self.wrap(origin_coord, pos);
        if !overflowed {
            return Some((origin, pos));
        }
        Some(
            self.get_chunk(coord)
                .map_or((origin, pos), |id| (id, wrapped)),
        )
    }

    /// Resolves a position relative to `origin`, optionally creating the
    /// neighbor chunk it lands in.
    ///
    /// Each axis is adjusted at most once: a position more than one chunk
    /// width outside the origin resolves to a position that is still out of
    /// bounds, which then samples empty and drops writes.
    ///
    /// Returns `None` only for an unknown origin handle.
    pub fn resolve_address(
        &mut self,
        origin: ChunkId,
        pos: LocalPos,
        create_if_absent: bool,
    ) -> Option<(ChunkId, LocalPos)> {
        if !create_if_absent {
            return self.resolve(origin, pos);
        }
        let origin_coord = self.chunk(origin)?.coord();
        let (coord, wrapped, overflowed) = self.wrap(origin_coord, pos);
        if !overflowed {
            return Some((origin, pos));
        }
        Some((self.create_chunk(coord), wrapped))
    }

    /// Reads a voxel relative to a chunk, crossing into neighbors as needed.
    ///
    /// Total: unknown handles, absent chunks and out-of-range positions all
    /// read as [`Voxel::EMPTY`].
    #[must_use]
    pub fn get_voxel(&self, id: ChunkId, pos: LocalPos) -> Voxel {
        self.resolve(id, pos)
            .and_then(|(id, pos)| self.chunk(id).map(|c| c.safe_sample(pos.x, pos.y, pos.z)))
            .unwrap_or(Voxel::EMPTY)
    }

    /// Writes a voxel relative to a chunk, lazily creating the neighbor it
    /// lands in. Marks the resolved chunk dirty.
    ///
    /// A write on a border cell also dirties the existing chunks across that
    /// border, since their boundary faces depend on it.
    ///
    /// Returns the chunk written to, or `None` for an unknown origin or a
    /// position more than one chunk width outside it. Such a write is
    /// dropped without creating or dirtying any chunk.
    pub fn set_voxel(&mut self, id: ChunkId, pos: LocalPos, voxel: Voxel) -> Option<ChunkId> {
        let (_, wrapped, _) = self.wrap(self.chunk(id)?.coord(), pos);
        if !wrapped.in_bounds(self.chunk_size) {
            return None;
        }

        let (target, local) = self.resolve_address(id, pos, true)?;
        let chunk = self.chunk_mut(target)?;
        if !chunk.safe_set(local, voxel) {
            return None;
        }
        let coord = chunk.coord();

        let last = self.chunk_size as i32 - 1;
        for face in FaceDirection::ALL {
            let along = local.to_array()[face.axis().index()];
            let on_border = if face.is_positive() { along == last } else { along == 0 };
            if !on_border {
                continue;
            }
            if let Some(neighbor) = self.get_chunk(coord.neighbor(face)) {
                if let Some(chunk) = self.chunk_mut(neighbor) {
                    chunk.mark_dirty();
                }
            }
        }
        Some(target)
    }
}

impl Default for ChunkSpace {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            slots: Vec::new(),
            table: HashMap::new(),
        }
    }
}

/// A chunk borrowed together with its space.
///
/// In-bounds reads hit the chunk directly; anything else is resolved through
/// the space so the chunk can see into its neighbors.
#[derive(Debug, Clone, Copy)]
pub struct ChunkView<'a> {
    space: &'a ChunkSpace,
    id: ChunkId,
    chunk: &'a VoxelChunk,
}

impl<'a> ChunkView<'a> {
    /// Handle of the viewed chunk.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ChunkId {
        self.id
    }

    /// The viewed chunk.
    #[inline]
    #[must_use]
    pub const fn chunk(&self) -> &'a VoxelChunk {
        self.chunk
    }

    /// The owning space.
    #[inline]
    #[must_use]
    pub const fn space(&self) -> &'a ChunkSpace {
        self.space
    }

    /// Reads a voxel, deferring to the space outside this chunk.
    #[inline]
    #[must_use]
    pub fn get_voxel(&self, pos: LocalPos) -> Voxel {
        if pos.in_bounds(self.chunk.size()) {
            self.chunk.safe_sample(pos.x, pos.y, pos.z)
        } else {
            self.space.get_voxel(self.id, pos)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::MaterialId;

    fn space_with_origin(size: usize) -> (ChunkSpace, ChunkId) {
        let mut space = ChunkSpace::new(size).unwrap();
        let id = space.create_chunk(ChunkCoord::new(0, 0, 0));
        (space, id)
    }

    #[test]
    fn test_rejects_bad_chunk_size() {
        assert!(ChunkSpace::new(0).is_err());
        assert!(ChunkSpace::new(63).is_err());
        assert!(ChunkSpace::new(62).is_ok());
    }

    #[test]
    fn test_create_is_idempotent() {
        let (mut space, id) = space_with_origin(4);
        assert_eq!(space.create_chunk(ChunkCoord::new(0, 0, 0)), id);
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_resolve_in_bounds_is_unchanged() {
        let (mut space, id) = space_with_origin(4);
        let pos = LocalPos::new(1, 2, 3);
        assert_eq!(space.resolve_address(id, pos, true), Some((id, pos)));
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_resolve_absent_without_create_returns_origin() {
        let (mut space, id) = space_with_origin(4);
        let pos = LocalPos::new(-1, 0, 0);
        assert_eq!(space.resolve_address(id, pos, false), Some((id, pos)));
        assert!(space.get_voxel(id, pos).is_empty());
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn test_resolve_wraps_each_axis() {
        let (mut space, id) = space_with_origin(4);
        let (target, local) = space
            .resolve_address(id, LocalPos::new(-1, 4, 2), true)
            .unwrap();
        assert_eq!(local, LocalPos::new(3, 0, 2));
        assert_eq!(space.chunk(target).unwrap().coord(), ChunkCoord::new(-1, 1, 0));
    }

    #[test]
    fn test_resolve_unknown_origin() {
        let (mut space, id) = space_with_origin(4);
        space.remove_chunk(id);
        assert_eq!(space.resolve_address(id, LocalPos::new(0, 0, 0), true), None);
        assert!(space.get_voxel(id, LocalPos::new(0, 0, 0)).is_empty());
        assert_eq!(space.set_voxel(id, LocalPos::new(0, 0, 0), Voxel::wall()), None);
    }

    #[test]
    fn test_set_voxel_across_boundary() {
        let (mut space, id) = space_with_origin(4);
        let voxel = Voxel::with_appearance(MaterialId::new(5), crate::voxel::SurfaceId::NONE);
        let target = space.set_voxel(id, LocalPos::new(4, 0, 0), voxel).unwrap();

        assert_ne!(target, id);
        assert_eq!(space.chunk(target).unwrap().coord(), ChunkCoord::new(1, 0, 0));
        assert_eq!(space.get_voxel(target, LocalPos::new(0, 0, 0)), voxel);
        assert_eq!(space.get_voxel(id, LocalPos::new(4, 0, 0)), voxel);
        assert!(space.chunk(target).unwrap().is_dirty());
    }

    #[test]
    fn test_far_write_is_dropped() {
        let (mut space, id) = space_with_origin(4);
        space.chunk_mut(id).unwrap().clear_dirty();

        assert_eq!(space.set_voxel(id, LocalPos::new(9, 0, 0), Voxel::wall()), None);
        assert_eq!(space.set_voxel(id, LocalPos::new(0, -5, 0), Voxel::wall()), None);
        assert_eq!(space.len(), 1);
        assert!(space.chunk_at(ChunkCoord::new(1, 0, 0)).is_none());
        assert!(space.chunk_at(ChunkCoord::new(0, -1, 0)).is_none());
        assert!(space.dirty_chunks().is_empty());
    }

    #[test]
    fn test_border_write_dirties_neighbor() {
        let (mut space, id) = space_with_origin(4);
        let right = space.create_chunk(ChunkCoord::new(1, 0, 0));
        let up = space.create_chunk(ChunkCoord::new(0, 1, 0));
        for chunk in [id, right, up] {
            space.chunk_mut(chunk).unwrap().clear_dirty();
        }

        space.set_voxel(id, LocalPos::new(3, 1, 1), Voxel::wall());
        assert!(space.chunk(id).unwrap().is_dirty());
        assert!(space.chunk(right).unwrap().is_dirty());
        assert!(!space.chunk(up).unwrap().is_dirty());
    }

    #[test]
    fn test_dirty_chunks_sorted_by_coord() {
        let mut space = ChunkSpace::new(4).unwrap();
        let b = space.create_chunk(ChunkCoord::new(2, 0, 0));
        let a = space.create_chunk(ChunkCoord::new(-1, 0, 0));
        let c = space.create_chunk(ChunkCoord::new(0, 0, 0));
        space.chunk_mut(c).unwrap().clear_dirty();
        assert_eq!(space.dirty_chunks(), vec![a, b]);
    }

    #[test]
    fn test_view_reads_neighbors() {
        let (mut space, id) = space_with_origin(4);
        let left = space.create_chunk(ChunkCoord::new(-1, 0, 0));
        space.set_voxel(left, LocalPos::new(3, 2, 2), Voxel::wall());

        let view = space.view(id).unwrap();
        assert!(view.get_voxel(LocalPos::new(-1, 2, 2)).is_solid());
        assert!(view.get_voxel(LocalPos::new(0, 2, 2)).is_empty());
        assert!(view.get_voxel(LocalPos::new(0, 0, -1)).is_empty());
    }

    #[test]
    fn test_removed_handle_is_not_reused() {
        let (mut space, id) = space_with_origin(4);
        assert!(space.remove_chunk(id).is_some());
        assert!(space.remove_chunk(id).is_none());
        let again = space.create_chunk(ChunkCoord::new(0, 0, 0));
        assert_ne!(again, id);
        assert!(space.chunk(id).is_none());
    }
}
