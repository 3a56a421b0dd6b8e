//! Exposed-face extraction over bit-packed occupancy columns.
//!
//! ## Algorithm
//!
//! 1. For each axis, pack the chunk into `N×N` columns of `u64`: bit `k` is
//!    set when the voxel at depth `k - 1` is occupied. Depths `-1` and `N`
//!    are sampled from the neighboring chunks.
//! 2. Per column, `col & !(col << 1)` marks faces exposed toward decreasing
//!    depth and `col & !(col >> 1)` faces toward increasing depth.
//! 3. Strip the padding bit, truncate to `N` bits, and walk the set bits.
//! 4. Bin every surviving face into a [`FacePlane`] keyed by [`PlaneKey`].

use std::collections::BTreeMap;

use panelforge_core::{
    Axis, ChunkView, FaceDirection, LocalPos, MaterialId, SurfaceId, VoxelKind,
};

use crate::appearance::{resolve_appearance, AppearanceProvider};

/// Identity of a face plane. Faces merge only within one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaneKey {
    /// Face direction.
    pub direction: FaceDirection,
    /// Depth of the faced voxels along the direction's axis.
    pub depth: u32,
    /// Voxel kind.
    pub kind: VoxelKind,
    /// Face material after default substitution.
    pub material: MaterialId,
    /// Face surface after default substitution.
    pub surface: SurfaceId,
}

impl PlaneKey {
    /// Creates a plane key.
    #[must_use]
    pub const fn new(
        direction: FaceDirection,
        depth: u32,
        kind: VoxelKind,
        material: MaterialId,
        surface: SurfaceId,
    ) -> Self {
        Self {
            direction,
            depth,
            kind,
            material,
            surface,
        }
    }

    /// Axis the plane is perpendicular to.
    #[inline]
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.direction.axis()
    }

    /// Local position of the voxel owning the face at `(u, v)`.
    #[inline]
    #[must_use]
    pub const fn voxel_at(&self, u: u32, v: u32) -> LocalPos {
        LocalPos::from_array(self.axis().compose(self.depth as i32, u as i32, v as i32))
    }
}

/// `N` rows of `N`-bit face masks. Bit `v` of row `u` marks an exposed face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacePlane {
    rows: Box<[u64]>,
}

impl FacePlane {
    /// Creates an empty plane for a chunk of edge length `size`.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            rows: vec![0; size].into_boxed_slice(),
        }
    }

    /// Builds a plane from explicit rows.
    #[must_use]
    pub fn from_rows(rows: Vec<u64>) -> Self {
        Self {
            rows: rows.into_boxed_slice(),
        }
    }

    /// Number of rows (the chunk edge length).
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Row masks.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[u64] {
        &self.rows
    }

    /// Marks the face at `(u, v)`.
    #[inline]
    pub fn set(&mut self, u: u32, v: u32) {
        self.rows[u as usize] |= 1u64 << v;
    }

    /// Returns true if the face at `(u, v)` is marked.
    #[inline]
    #[must_use]
    pub fn get(&self, u: u32, v: u32) -> bool {
        self.rows
            .get(u as usize)
            .is_some_and(|row| v < 64 && row & (1u64 << v) != 0)
    }

    /// Number of marked faces.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }

    /// Returns true if no face is marked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|&row| row == 0)
    }
}

/// Exposed faces of one chunk, binned into planes in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CulledChunk {
    planes: BTreeMap<PlaneKey, FacePlane>,
}

impl CulledChunk {
    /// Planes in deterministic key order.
    #[inline]
    #[must_use]
    pub fn planes(&self) -> &BTreeMap<PlaneKey, FacePlane> {
        &self.planes
    }

    /// Number of non-empty planes.
    #[inline]
    #[must_use]
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// Total number of exposed faces.
    #[must_use]
    pub fn face_count(&self) -> u32 {
        self.planes.values().map(FacePlane::count).sum()
    }

    /// Returns true if no face is exposed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

/// Face culling engine.
///
/// Keeps its column buffers between calls; cull chunks one at a time.
#[derive(Debug, Default)]
pub struct FaceCuller {
    /// Occupancy columns per axis, `u * N + v`.
    columns: [Vec<u64>; 3],
}

impl FaceCuller {
    /// Creates a culler with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts the exposed faces of a chunk.
    ///
    /// Neighbor occupancy is read through the view, so faces against a
    /// solid neighbor are hidden even if that neighbor has never been
    /// meshed.
    pub fn cull<A: AppearanceProvider + ?Sized>(
        &mut self,
        view: ChunkView<'_>,
        appearance: &A,
    ) -> CulledChunk {
        let chunk = view.chunk();
        if chunk.is_empty() {
            return CulledChunk::default();
        }
        let n = chunk.size();
        self.fill_columns(view);

        let truncate = (1u64 << n) - 1;
        let mut planes = BTreeMap::new();

        for axis in Axis::ALL {
            let columns = &self.columns[axis.index()];
            for u in 0..n as u32 {
                for v in 0..n as u32 {
                    let col = columns[u as usize * n + v as usize];
                    if col == 0 {
                        continue;
                    }
                    let negative = col & !(col << 1);
                    let positive = col & !(col >> 1);

                    for (mask, positive_dir) in [(negative, false), (positive, true)] {
                        let direction = FaceDirection::from_axis(axis, positive_dir);
                        let mut bits = (mask >> 1) & truncate;
                        while bits != 0 {
                            let depth = bits.trailing_zeros();
                            bits &= bits - 1;

                            let [x, y, z] = axis.compose(depth as i32, u as i32, v as i32);
                            let voxel = chunk.safe_sample(x, y, z);
                            if voxel.kind() != VoxelKind::Wall || voxel.is_face_hidden(direction) {
                                continue;
                            }
                            let (material, surface) = resolve_appearance(
                                appearance,
                                direction,
                                voxel.material(direction),
                                voxel.surface(direction),
                            );
                            let key =
                                PlaneKey::new(direction, depth, VoxelKind::Wall, material, surface);
                            planes
                                .entry(key)
                                .or_insert_with(|| FacePlane::new(n))
                                .set(u, v);
                        }
                    }
                }
            }
        }

        CulledChunk { planes }
    }

    /// Packs the padded neighborhood into occupancy columns for all axes.
    fn fill_columns(&mut self, view: ChunkView<'_>) {
        let n = view.chunk().size();
        for columns in &mut self.columns {
            columns.clear();
            columns.resize(n * n, 0);
        }

        let hi = n as i32;
        for z in -1..=hi {
            for y in -1..=hi {
                for x in -1..=hi {
                    let outside = [x, y, z].iter().filter(|&&c| c < 0 || c >= hi).count();
                    if outside > 1 {
                        continue;
                    }
                    if view.get_voxel(LocalPos::new(x, y, z)).is_empty() {
                        continue;
                    }
                    for axis in Axis::ALL {
                        let (depth, u, v) = axis.decompose([x, y, z]);
                        if u < 0 || u >= hi || v < 0 || v >= hi {
                            continue;
                        }
                        self.columns[axis.index()][u as usize * n + v as usize] |=
                            1u64 << (depth + 1);
                    }
                }
            }
        }
    }
}
