//! Face-level edit operations.
//!
//! Every edit addresses a single voxel face and writes through
//! [`ChunkSpace::set_voxel`], so edits that step over a chunk border land in
//! (and lazily create) the neighboring chunk.

use std::collections::{HashSet, VecDeque};

use crate::chunk::LocalPos;
use crate::space::{ChunkId, ChunkSpace};
use crate::voxel::{FaceDirection, MaterialId, SurfaceId, Voxel};

/// One face of one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceRef {
    /// Chunk the position is relative to.
    pub chunk: ChunkId,
    /// Voxel position, local to `chunk`.
    pub pos: LocalPos,
    /// Which face of the voxel.
    pub direction: FaceDirection,
}

impl FaceRef {
    /// Creates a face reference.
    #[inline]
    #[must_use]
    pub const fn new(chunk: ChunkId, pos: LocalPos, direction: FaceDirection) -> Self {
        Self {
            chunk,
            pos,
            direction,
        }
    }

    /// Position of the cell this face looks into.
    #[inline]
    #[must_use]
    pub const fn front(&self) -> LocalPos {
        self.pos.step(self.direction)
    }

    /// Position of the cell behind this face's voxel.
    #[inline]
    #[must_use]
    pub const fn behind(&self) -> LocalPos {
        self.pos.step_back(self.direction)
    }
}

/// Fills the cell in front of a face, carrying the face's appearance onto
/// the same face of the new voxel.
///
/// Returns the matching face of the new voxel, or `None` if the face's voxel
/// is empty or its chunk is unknown.
pub fn extrude_face(space: &mut ChunkSpace, face: FaceRef) -> Option<FaceRef> {
    let source = space.get_voxel(face.chunk, face.pos);
    if source.is_empty() {
        return None;
    }
    let (chunk, pos) = space.resolve_address(face.chunk, face.front(), true)?;

    let mut voxel = space.get_voxel(chunk, pos);
    voxel.set_solid(true);
    voxel.set_material(face.direction, source.material(face.direction));
    voxel.set_surface(face.direction, source.surface(face.direction));
    space.set_voxel(chunk, pos, voxel)?;

    Some(FaceRef::new(chunk, pos, face.direction))
}

/// Empties a face's voxel and carries the face's appearance onto the same
/// face of the voxel behind it.
///
/// Returns the newly exposed face, or `None` if the face's voxel is empty or
/// its chunk is unknown.
pub fn intrude_face(space: &mut ChunkSpace, face: FaceRef) -> Option<FaceRef> {
    let source = space.get_voxel(face.chunk, face.pos);
    if source.is_empty() {
        return None;
    }
    let (chunk, pos) = space.resolve_address(face.chunk, face.behind(), true)?;

    let mut behind = space.get_voxel(chunk, pos);
    behind.set_material(face.direction, source.material(face.direction));
    behind.set_surface(face.direction, source.surface(face.direction));
    space.set_voxel(chunk, pos, behind)?;
    space.set_voxel(face.chunk, face.pos, Voxel::EMPTY)?;

    Some(FaceRef::new(chunk, pos, face.direction))
}

/// Assigns material and surface to one face. Returns false for empty cells.
pub fn paint_face(
    space: &mut ChunkSpace,
    face: FaceRef,
    material: MaterialId,
    surface: SurfaceId,
) -> bool {
    let mut voxel = space.get_voxel(face.chunk, face.pos);
    if voxel.is_empty() {
        return false;
    }
    voxel.set_material(face.direction, material);
    voxel.set_surface(face.direction, surface);
    space.set_voxel(face.chunk, face.pos, voxel).is_some()
}

/// Forces a face hidden, or clears the override. Returns false for empty
/// cells.
pub fn set_face_hidden(space: &mut ChunkSpace, face: FaceRef, hidden: bool) -> bool {
    let mut voxel = space.get_voxel(face.chunk, face.pos);
    if voxel.is_empty() {
        return false;
    }
    voxel.set_face_hidden(face.direction, hidden);
    space.set_voxel(face.chunk, face.pos, voxel).is_some()
}

/// Collects every face connected to `start` that points the same way, lies
/// in the same plane and is exposed, without leaving `start`'s chunk.
///
/// Visits in breadth-first order; `start` comes first. Returns nothing if the
/// starting voxel is empty.
#[must_use]
pub fn flood_fill_faces(space: &ChunkSpace, start: FaceRef) -> Vec<FaceRef> {
    let Some(view) = space.view(start.chunk) else {
        return Vec::new();
    };
    let size = view.chunk().size();
    if !start.pos.in_bounds(size) || view.get_voxel(start.pos).is_empty() {
        return Vec::new();
    }

    let (u_axis, v_axis) = start.direction.axis().plane_axes();
    let steps = [
        FaceDirection::from_axis(u_axis, false),
        FaceDirection::from_axis(u_axis, true),
        FaceDirection::from_axis(v_axis, false),
        FaceDirection::from_axis(v_axis, true),
    ];

    let mut found = Vec::new();
    let mut visited = HashSet::from([start.pos]);
    let mut queue = VecDeque::from([start.pos]);

    while let Some(pos) = queue.pop_front() {
        found.push(FaceRef::new(start.chunk, pos, start.direction));

        for step in steps {
            let next = pos.step(step);
            if !next.in_bounds(size) || visited.contains(&next) {
                continue;
            }
            if view.get_voxel(next).is_empty() {
                continue;
            }
            if view.get_voxel(next.step(start.direction)).is_solid() {
                continue;
            }
            visited.insert(next);
            queue.push_back(next);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkCoord;

    fn floor(size: usize) -> (ChunkSpace, ChunkId) {
        let mut space = ChunkSpace::new(size).unwrap();
        let id = space.create_chunk(ChunkCoord::new(0, 0, 0));
        let n = size as i32;
        for x in 0..n {
            for z in 0..n {
                space.set_voxel(id, LocalPos::new(x, 0, z), Voxel::wall());
            }
        }
        (space, id)
    }

    #[test]
    fn test_extrude_carries_appearance() {
        let (mut space, id) = floor(4);
        let face = FaceRef::new(id, LocalPos::new(1, 0, 1), FaceDirection::Up);
        assert!(paint_face(&mut space, face, MaterialId::new(3), SurfaceId::new(4)));

        let new_face = extrude_face(&mut space, face).unwrap();
        assert_eq!(new_face.pos, LocalPos::new(1, 1, 1));

        let voxel = space.get_voxel(id, new_face.pos);
        assert!(voxel.is_solid());
        assert_eq!(voxel.material(FaceDirection::Up), MaterialId::new(3));
        assert_eq!(voxel.surface(FaceDirection::Up), SurfaceId::new(4));
    }

    #[test]
    fn test_extrude_across_border_creates_chunk() {
        let (mut space, id) = floor(4);
        let face = FaceRef::new(id, LocalPos::new(3, 0, 0), FaceDirection::Right);
        let new_face = extrude_face(&mut space, face).unwrap();

        assert_ne!(new_face.chunk, id);
        assert_eq!(new_face.pos, LocalPos::new(0, 0, 0));
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn test_extrude_empty_is_noop() {
        let (mut space, id) = floor(4);
        let face = FaceRef::new(id, LocalPos::new(1, 2, 1), FaceDirection::Up);
        assert!(extrude_face(&mut space, face).is_none());
    }

    #[test]
    fn test_intrude_moves_face_back() {
        let (mut space, id) = floor(4);
        for x in 0..4 {
            space.set_voxel(id, LocalPos::new(x, 1, 0), Voxel::wall());
        }
        let face = FaceRef::new(id, LocalPos::new(2, 1, 0), FaceDirection::Up);
        paint_face(&mut space, face, MaterialId::new(9), SurfaceId::NONE);

        let exposed = intrude_face(&mut space, face).unwrap();
        assert_eq!(exposed.pos, LocalPos::new(2, 0, 0));
        assert!(space.get_voxel(id, LocalPos::new(2, 1, 0)).is_empty());
        assert_eq!(
            space.get_voxel(id, exposed.pos).material(FaceDirection::Up),
            MaterialId::new(9)
        );
    }

    #[test]
    fn test_set_face_hidden_toggles() {
        let (mut space, id) = floor(4);
        let face = FaceRef::new(id, LocalPos::new(0, 0, 0), FaceDirection::Down);
        assert!(set_face_hidden(&mut space, face, true));
        assert!(space.get_voxel(id, face.pos).is_face_hidden(FaceDirection::Down));
        assert!(set_face_hidden(&mut space, face, false));
        assert!(!space.get_voxel(id, face.pos).is_face_hidden(FaceDirection::Down));
    }

    #[test]
    fn test_flood_fill_stops_at_covered_faces() {
        let (mut space, id) = floor(4);
        // A block on top covers one floor face.
        space.set_voxel(id, LocalPos::new(2, 1, 2), Voxel::wall());

        let start = FaceRef::new(id, LocalPos::new(0, 0, 0), FaceDirection::Up);
        let faces = flood_fill_faces(&space, start);

        assert_eq!(faces.len(), 15);
        assert_eq!(faces[0], start);
        assert!(!faces.iter().any(|f| f.pos == LocalPos::new(2, 0, 2)));
        assert!(faces.iter().all(|f| f.direction == FaceDirection::Up));
    }

    #[test]
    fn test_flood_fill_empty_start() {
        let (space, id) = floor(4);
        let start = FaceRef::new(id, LocalPos::new(0, 3, 0), FaceDirection::Up);
        assert!(flood_fill_faces(&space, start).is_empty());
    }
}
