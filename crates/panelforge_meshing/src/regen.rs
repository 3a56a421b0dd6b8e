//! Chunk regeneration pipeline.
//!
//! cull → merge → normalize for one chunk at a time, then hand the result to
//! the placement sink. The dirty flag is cleared only once the sink accepts
//! the chunk; a failed hand-off leaves it dirty for a later full recompute.

use std::time::{Duration, Instant};

use panelforge_core::{ChunkCoord, ChunkId, ChunkSpace, PanelSizeCatalog};

use crate::appearance::AppearanceProvider;
use crate::error::{MeshError, MeshResult};
use crate::face_culler::FaceCuller;
use crate::greedy::{GreedyMesher, PanelRect};
use crate::placement::{place, PanelPlacement, PanelResolver, PlacementSink};

/// Chunks slower than this are reported with a warning.
const SLOW_CHUNK: Duration = Duration::from_millis(10);

/// Result of regenerating one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkPanels {
    /// Regenerated chunk.
    pub chunk: ChunkId,
    /// Its coordinate.
    pub coord: ChunkCoord,
    /// Placements in mesher order.
    pub placements: Vec<PanelPlacement>,
    /// Rectangles with no panel asset.
    pub skipped: Vec<PanelRect>,
}

/// Summary of a dirty-chunk pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenReport {
    /// Chunks regenerated and published.
    pub published: usize,
    /// Panels placed across all published chunks.
    pub panels: usize,
    /// Rectangles skipped for lack of a panel asset.
    pub skipped: usize,
    /// Chunks whose hand-off failed; they remain dirty.
    pub failed: Vec<ChunkId>,
}

/// Turns chunk voxels into panel placements.
#[derive(Debug)]
pub struct PanelPipeline {
    culler: FaceCuller,
    mesher: GreedyMesher,
}

impl PanelPipeline {
    /// Creates a pipeline for a panel catalog.
    #[must_use]
    pub fn new(catalog: PanelSizeCatalog) -> Self {
        Self {
            culler: FaceCuller::new(),
            mesher: GreedyMesher::new(catalog),
        }
    }

    /// The panel catalog in use.
    #[must_use]
    pub fn catalog(&self) -> &PanelSizeCatalog {
        self.mesher.catalog()
    }

    /// Computes the placements for one chunk.
    ///
    /// Rectangles without a registered panel are logged and collected in
    /// [`ChunkPanels::skipped`]; they never abort the chunk.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::UnknownChunk`] if `id` is not a live chunk.
    pub fn regenerate_chunk<A, R>(
        &mut self,
        space: &ChunkSpace,
        id: ChunkId,
        appearance: &A,
        resolver: &R,
    ) -> MeshResult<ChunkPanels>
    where
        A: AppearanceProvider + ?Sized,
        R: PanelResolver + ?Sized,
    {
        let view = space.view(id).ok_or(MeshError::UnknownChunk(id))?;
        let coord = view.chunk().coord();
        let start = Instant::now();

        let culled = self.culler.cull(view, appearance);
        let rects = self.mesher.mesh(&culled);

        let mut placements = Vec::with_capacity(rects.len());
        let mut skipped = Vec::new();
        for rect in rects {
            if let Some(placement) = place(coord, rect, resolver) {
                placements.push(placement);
            } else {
                tracing::warn!(
                    x = coord.x,
                    y = coord.y,
                    z = coord.z,
                    width = rect.width,
                    height = rect.height,
                    "no panel registered for size, skipping"
                );
                skipped.push(*rect);
            }
        }

        let elapsed = start.elapsed();
        tracing::debug!(
            x = coord.x,
            y = coord.y,
            z = coord.z,
            planes = culled.plane_count(),
            faces = culled.face_count(),
            panels = placements.len(),
            skipped = skipped.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "chunk regenerated"
        );
        if elapsed > SLOW_CHUNK {
            tracing::warn!(
                x = coord.x,
                y = coord.y,
                z = coord.z,
                elapsed_ms = elapsed.as_millis() as u64,
                "slow chunk regeneration"
            );
        }

        Ok(ChunkPanels {
            chunk: id,
            coord,
            placements,
            skipped,
        })
    }

    /// Hands a chunk's result to the sink and clears its dirty flag.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::UnknownChunk`] if the chunk is gone, or
    /// [`MeshError::Sink`] if the sink refuses; the chunk stays dirty.
    pub fn publish<S: PlacementSink + ?Sized>(
        &self,
        space: &mut ChunkSpace,
        panels: &ChunkPanels,
        sink: &mut S,
    ) -> MeshResult<()> {
        if space.chunk(panels.chunk).is_none() {
            return Err(MeshError::UnknownChunk(panels.chunk));
        }
        sink.replace_chunk(panels.coord, &panels.placements, &panels.skipped)?;
        if let Some(chunk) = space.chunk_mut(panels.chunk) {
            chunk.clear_dirty();
        }
        Ok(())
    }

    /// Regenerates and publishes every dirty chunk, one at a time, in chunk
    /// coordinate order.
    ///
    /// Failures are logged and reported, never propagated.
    pub fn regenerate_dirty<A, R, S>(
        &mut self,
        space: &mut ChunkSpace,
        appearance: &A,
        resolver: &R,
        sink: &mut S,
    ) -> RegenReport
    where
        A: AppearanceProvider + ?Sized,
        R: PanelResolver + ?Sized,
        S: PlacementSink + ?Sized,
    {
        let mut report = RegenReport::default();
        for id in space.dirty_chunks() {
            let result = match self.regenerate_chunk(space, id, appearance, resolver) {
                Ok(panels) => self.publish(space, &panels, sink).map(|()| panels),
                Err(err) => Err(err),
            };
            match result {
                Ok(panels) => {
                    report.published += 1;
                    report.panels += panels.placements.len();
                    report.skipped += panels.skipped.len();
                }
                Err(err) => {
                    tracing::error!(chunk = id.index(), error = %err, "chunk regeneration failed");
                    report.failed.push(id);
                }
            }
        }
        tracing::debug!(
            published = report.published,
            panels = report.panels,
            failed = report.failed.len(),
            "dirty pass complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appearance::DefaultAppearance;
    use crate::error::PlacementError;
    use crate::placement::PanelLibrary;
    use panelforge_core::{LocalPos, Voxel};

    #[derive(Default)]
    struct CountingSink {
        calls: usize,
        fail: bool,
    }

    impl PlacementSink for CountingSink {
        fn replace_chunk(
            &mut self,
            _chunk: ChunkCoord,
            _placements: &[PanelPlacement],
            _skipped: &[PanelRect],
        ) -> Result<(), PlacementError> {
            self.calls += 1;
            if self.fail {
                Err(PlacementError::new("offline"))
            } else {
                Ok(())
            }
        }
    }

    fn setup() -> (ChunkSpace, ChunkId, PanelPipeline, PanelLibrary) {
        let mut space = ChunkSpace::new(8).unwrap();
        let id = space.create_chunk(ChunkCoord::default());
        space.set_voxel(id, LocalPos::new(2, 2, 2), Voxel::wall());
        let catalog = PanelSizeCatalog::standard();
        let library = PanelLibrary::for_catalog(&catalog);
        (space, id, PanelPipeline::new(catalog), library)
    }

    #[test]
    fn test_regenerate_lone_voxel() {
        let (space, id, mut pipeline, library) = setup();
        let panels = pipeline
            .regenerate_chunk(&space, id, &DefaultAppearance::default(), &library)
            .unwrap();
        assert_eq!(panels.placements.len(), 6);
        assert!(panels.skipped.is_empty());
    }

    #[test]
    fn test_publish_clears_dirty_only_on_success() {
        let (mut space, id, mut pipeline, library) = setup();
        let panels = pipeline
            .regenerate_chunk(&space, id, &DefaultAppearance::default(), &library)
            .unwrap();

        let mut failing = CountingSink {
            fail: true,
            ..CountingSink::default()
        };
        assert!(matches!(
            pipeline.publish(&mut space, &panels, &mut failing),
            Err(MeshError::Sink(_))
        ));
        assert!(space.chunk(id).unwrap().is_dirty());

        let mut sink = CountingSink::default();
        pipeline.publish(&mut space, &panels, &mut sink).unwrap();
        assert!(!space.chunk(id).unwrap().is_dirty());
    }

    #[test]
    fn test_unknown_chunk() {
        let (mut space, id, mut pipeline, library) = setup();
        space.remove_chunk(id);
        assert_eq!(
            pipeline
                .regenerate_chunk(&space, id, &DefaultAppearance::default(), &library)
                .unwrap_err(),
            MeshError::UnknownChunk(id)
        );
    }

    #[test]
    fn test_dirty_pass_reports_failures() {
        let (mut space, id, mut pipeline, library) = setup();
        let mut sink = CountingSink {
            fail: true,
            ..CountingSink::default()
        };
        let report =
            pipeline.regenerate_dirty(&mut space, &DefaultAppearance::default(), &library, &mut sink);
        assert_eq!(report.failed, vec![id]);
        assert_eq!(report.published, 0);
        assert!(space.chunk(id).unwrap().is_dirty());

        sink.fail = false;
        let report =
            pipeline.regenerate_dirty(&mut space, &DefaultAppearance::default(), &library, &mut sink);
        assert_eq!(report.published, 1);
        assert_eq!(report.panels, 6);
        assert!(space.dirty_chunks().is_empty());
        assert_eq!(sink.calls, 2);
    }
}
