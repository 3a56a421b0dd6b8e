//! Voxel records, face directions and appearance ids.
//!
//! A voxel is packed into 52 bytes so a whole chunk can be cast to a byte
//! slice for snapshots.
//!
//! Layout:
//! - `materials`: material id per face (indexed by [`FaceDirection::index`])
//! - `surfaces`: surface id per face
//! - `flags`: bit 0 = solid
//! - `kind`: [`VoxelKind`] discriminant
//! - `hidden_faces`: bit per face, forces that face hidden

use bytemuck::{Pod, Zeroable};

/// Opaque material id. [`MaterialId::NONE`] means "not assigned".
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// No material assigned; replaced by the default appearance when meshing.
    pub const NONE: Self = Self(0);

    /// Creates a new material id.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns true if no material is assigned.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Opaque surface (physics/impact) id. [`SurfaceId::NONE`] means "not assigned".
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
pub struct SurfaceId(pub u32);

impl SurfaceId {
    /// No surface assigned; replaced by the default appearance when meshing.
    pub const NONE: Self = Self(0);

    /// Creates a new surface id.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns true if no surface is assigned.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Voxel shape. Only [`VoxelKind::Wall`] is meshed; the corner shapes are
/// stored and persisted but filtered out of panel generation.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VoxelKind {
    /// Full cube wall.
    #[default]
    Wall = 0,
    /// One-metre concave corner.
    CornerConcave1m = 1,
    /// Two-metre concave corner.
    CornerConcave2m = 2,
}

impl VoxelKind {
    /// Converts from the stored discriminant.
    #[must_use]
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Wall),
            1 => Some(Self::CornerConcave1m),
            2 => Some(Self::CornerConcave2m),
            _ => None,
        }
    }
}

/// One of the three primary axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// All axes in sweep order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Axis index (0, 1, 2).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Builds a position from a depth along this axis and plane coordinates.
    ///
    /// Plane convention:
    /// - X faces: `u = z`, `v = y`
    /// - Y faces: `u = x`, `v = z`
    /// - Z faces: `u = x`, `v = y`
    #[inline]
    #[must_use]
    pub const fn compose(self, depth: i32, u: i32, v: i32) -> [i32; 3] {
        match self {
            Self::X => [depth, v, u],
            Self::Y => [u, depth, v],
            Self::Z => [u, v, depth],
        }
    }

    /// Inverse of [`Axis::compose`]: `(depth, u, v)` for a position.
    #[inline]
    #[must_use]
    pub const fn decompose(self, pos: [i32; 3]) -> (i32, i32, i32) {
        match self {
            Self::X => (pos[0], pos[2], pos[1]),
            Self::Y => (pos[1], pos[0], pos[2]),
            Self::Z => (pos[2], pos[0], pos[1]),
        }
    }

    /// Axes spanning the face plane, as `(u_axis, v_axis)`.
    #[inline]
    #[must_use]
    pub const fn plane_axes(self) -> (Self, Self) {
        match self {
            Self::X => (Self::Z, Self::Y),
            Self::Y => (Self::X, Self::Z),
            Self::Z => (Self::X, Self::Y),
        }
    }

    /// Unit vector along this axis.
    #[inline]
    #[must_use]
    pub const fn unit(self) -> [i32; 3] {
        match self {
            Self::X => [1, 0, 0],
            Self::Y => [0, 1, 0],
            Self::Z => [0, 0, 1],
        }
    }
}

/// Direction a voxel face points toward.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FaceDirection {
    /// -X
    Left = 0,
    /// +X
    Right = 1,
    /// -Y
    Down = 2,
    /// +Y
    Up = 3,
    /// -Z
    Backward = 4,
    /// +Z
    Forward = 5,
}

impl FaceDirection {
    /// All six directions, ordered by index.
    pub const ALL: [Self; 6] = [
        Self::Left,
        Self::Right,
        Self::Down,
        Self::Up,
        Self::Backward,
        Self::Forward,
    ];

    /// Per-face array index (0..6).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Converts from a per-face index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Down),
            3 => Some(Self::Up),
            4 => Some(Self::Backward),
            5 => Some(Self::Forward),
            _ => None,
        }
    }

    /// Axis this face is perpendicular to.
    #[inline]
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::X,
            Self::Down | Self::Up => Axis::Y,
            Self::Backward | Self::Forward => Axis::Z,
        }
    }

    /// True if the face points toward increasing axis values.
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Right | Self::Up | Self::Forward)
    }

    /// Direction with the given axis and sign.
    #[must_use]
    pub const fn from_axis(axis: Axis, positive: bool) -> Self {
        match (axis, positive) {
            (Axis::X, false) => Self::Left,
            (Axis::X, true) => Self::Right,
            (Axis::Y, false) => Self::Down,
            (Axis::Y, true) => Self::Up,
            (Axis::Z, false) => Self::Backward,
            (Axis::Z, true) => Self::Forward,
        }
    }

    /// The opposite face.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_axis(self.axis(), !self.is_positive())
    }

    /// Unit step toward the neighbor this face looks at.
    #[must_use]
    pub const fn offset(self) -> [i32; 3] {
        let unit = self.axis().unit();
        if self.is_positive() {
            unit
        } else {
            [-unit[0], -unit[1], -unit[2]]
        }
    }
}

/// A single voxel cell.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Voxel {
    materials: [MaterialId; 6],
    surfaces: [SurfaceId; 6],
    flags: u8,
    kind: u8,
    hidden_faces: u8,
    reserved: u8,
}

impl Voxel {
    /// Solid bit in `flags`.
    const FLAG_SOLID: u8 = 1;

    /// Mask of valid `hidden_faces` bits.
    const FACE_BITS: u8 = 0b0011_1111;

    /// Empty cell - also the all-zero bit pattern.
    pub const EMPTY: Self = Self {
        materials: [MaterialId::NONE; 6],
        surfaces: [SurfaceId::NONE; 6],
        flags: 0,
        kind: VoxelKind::Wall as u8,
        hidden_faces: 0,
        reserved: 0,
    };

    /// Size of one voxel in a snapshot image.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// A solid wall voxel with no appearance assigned.
    #[must_use]
    pub const fn wall() -> Self {
        Self {
            flags: Self::FLAG_SOLID,
            ..Self::EMPTY
        }
    }

    /// A solid voxel of the given kind.
    #[must_use]
    pub const fn solid(kind: VoxelKind) -> Self {
        Self {
            flags: Self::FLAG_SOLID,
            kind: kind as u8,
            ..Self::EMPTY
        }
    }

    /// A solid wall with the same material and surface on every face.
    #[must_use]
    pub const fn with_appearance(material: MaterialId, surface: SurfaceId) -> Self {
        Self {
            materials: [material; 6],
            surfaces: [surface; 6],
            ..Self::wall()
        }
    }

    /// Returns true if the cell is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.flags & Self::FLAG_SOLID == 0
    }

    /// Returns true if the cell is solid.
    #[inline]
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        !self.is_empty()
    }

    /// Marks the cell solid or empty, keeping its face data.
    #[inline]
    pub fn set_solid(&mut self, solid: bool) {
        if solid {
            self.flags |= Self::FLAG_SOLID;
        } else {
            self.flags &= !Self::FLAG_SOLID;
        }
    }

    /// Voxel shape.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> VoxelKind {
        VoxelKind::from_u8(self.kind).unwrap_or_default()
    }

    /// Sets the voxel shape.
    #[inline]
    pub fn set_kind(&mut self, kind: VoxelKind) {
        self.kind = kind as u8;
    }

    /// Material on one face.
    #[inline]
    #[must_use]
    pub const fn material(&self, face: FaceDirection) -> MaterialId {
        self.materials[face.index()]
    }

    /// Sets the material on one face.
    #[inline]
    pub fn set_material(&mut self, face: FaceDirection, material: MaterialId) {
        self.materials[face.index()] = material;
    }

    /// Surface on one face.
    #[inline]
    #[must_use]
    pub const fn surface(&self, face: FaceDirection) -> SurfaceId {
        self.surfaces[face.index()]
    }

    /// Sets the surface on one face.
    #[inline]
    pub fn set_surface(&mut self, face: FaceDirection, surface: SurfaceId) {
        self.surfaces[face.index()] = surface;
    }

    /// True if the face is forced hidden regardless of exposure.
    #[inline]
    #[must_use]
    pub const fn is_face_hidden(&self, face: FaceDirection) -> bool {
        self.hidden_faces & (1 << face.index()) != 0
    }

    /// Forces a face hidden (or clears the override).
    #[inline]
    pub fn set_face_hidden(&mut self, face: FaceDirection, hidden: bool) {
        let bit = 1 << face.index();
        if hidden {
            self.hidden_faces |= bit;
        } else {
            self.hidden_faces &= !bit;
        }
    }

    /// Checks that every packed field holds a value a voxel can have.
    ///
    /// Used when restoring raw images from disk.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.flags & !Self::FLAG_SOLID == 0
            && VoxelKind::from_u8(self.kind).is_some()
            && self.hidden_faces & !Self::FACE_BITS == 0
            && self.reserved == 0
    }
}

impl Default for Voxel {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxel_size_and_zero_is_empty() {
        assert_eq!(Voxel::SIZE, 52);
        assert_eq!(Voxel::zeroed(), Voxel::EMPTY);
        assert!(Voxel::EMPTY.is_empty());
        assert!(Voxel::wall().is_solid());
    }

    #[test]
    fn test_face_data() {
        let mut voxel = Voxel::wall();
        voxel.set_material(FaceDirection::Up, MaterialId::new(7));
        voxel.set_surface(FaceDirection::Up, SurfaceId::new(3));
        voxel.set_face_hidden(FaceDirection::Left, true);

        assert_eq!(voxel.material(FaceDirection::Up), MaterialId::new(7));
        assert!(voxel.material(FaceDirection::Down).is_none());
        assert_eq!(voxel.surface(FaceDirection::Up), SurfaceId::new(3));
        assert!(voxel.is_face_hidden(FaceDirection::Left));
        assert!(!voxel.is_face_hidden(FaceDirection::Right));

        voxel.set_face_hidden(FaceDirection::Left, false);
        assert!(!voxel.is_face_hidden(FaceDirection::Left));
        assert!(voxel.is_well_formed());
    }

    #[test]
    fn test_direction_mapping() {
        for dir in FaceDirection::ALL {
            assert_eq!(FaceDirection::from_axis(dir.axis(), dir.is_positive()), dir);
            assert_eq!(FaceDirection::from_index(dir.index()), Some(dir));
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert_eq!(FaceDirection::Up.offset(), [0, 1, 0]);
        assert_eq!(FaceDirection::Backward.offset(), [0, 0, -1]);
    }

    #[test]
    fn test_compose_roundtrip() {
        for axis in Axis::ALL {
            let pos = axis.compose(3, 5, 7);
            assert_eq!(axis.decompose(pos), (3, 5, 7));
        }
    }

    #[test]
    fn test_malformed_bits_detected() {
        let mut raw = Voxel::wall();
        raw.kind = 9;
        assert!(!raw.is_well_formed());
        assert_eq!(raw.kind(), VoxelKind::Wall);
    }
}
