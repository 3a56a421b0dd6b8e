//! Panel size catalog.
//!
//! Physical panels only come in a handful of edge lengths. The catalog is the
//! ordered list of those lengths; the mesher may only emit rectangles whose
//! width and height both appear in it.
//!
//! The catalog is built once from configuration and never mutated afterwards.

use crate::error::{CoreError, CoreResult};

/// Edge lengths shipped with the standard panel set.
pub const STANDARD_LENGTHS: [u32; 14] = [0, 1, 2, 3, 4, 5, 6, 8, 10, 12, 14, 16, 18, 20];

/// Immutable, strictly ascending list of permitted panel edge lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSizeCatalog {
    lengths: Box<[u32]>,
}

impl PanelSizeCatalog {
    /// Builds a catalog from a list of lengths.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCatalog`] if the list is not strictly
    /// ascending or does not contain `1`. Without unit length some occupancy
    /// grids cannot be tiled exactly.
    pub fn new(lengths: &[u32]) -> CoreResult<Self> {
        if let Some(pair) = lengths.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(CoreError::InvalidCatalog(format!(
                "lengths must be strictly ascending, found {} before {}",
                pair[0], pair[1]
            )));
        }
        if lengths.binary_search(&1).is_err() {
            return Err(CoreError::InvalidCatalog(
                "catalog must contain unit length 1".to_owned(),
            ));
        }
        Ok(Self {
            lengths: lengths.into(),
        })
    }

    /// The standard panel set: `{0,1,2,3,4,5,6,8,10,12,14,16,18,20}`.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            lengths: STANDARD_LENGTHS.into(),
        }
    }

    /// All permitted lengths, ascending.
    #[inline]
    #[must_use]
    pub fn lengths(&self) -> &[u32] {
        &self.lengths
    }

    /// Returns true if `length` is a permitted edge length.
    #[inline]
    #[must_use]
    pub fn contains(&self, length: u32) -> bool {
        self.lengths.binary_search(&length).is_ok()
    }

    /// Greatest permitted length `<= raw`. Never snaps up.
    ///
    /// Returns 0 when nothing in the catalog fits.
    #[must_use]
    pub fn snap_down(&self, raw: u32) -> u32 {
        match self.lengths.binary_search(&raw) {
            Ok(_) => raw,
            Err(0) => 0,
            Err(insert_at) => self.lengths[insert_at - 1],
        }
    }

    /// Smallest permitted length strictly greater than `length`.
    #[must_use]
    pub fn next_above(&self, length: u32) -> Option<u32> {
        let idx = self.lengths.partition_point(|&l| l <= length);
        self.lengths.get(idx).copied()
    }

    /// Largest permitted length.
    #[inline]
    #[must_use]
    pub fn max_length(&self) -> u32 {
        // Construction guarantees at least the unit length is present.
        self.lengths.last().copied().unwrap_or(1)
    }
}

impl Default for PanelSizeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
