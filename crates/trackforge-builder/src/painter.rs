//! Selected segment painter
//!
//! Marks the selected piece by switching it to a borrowed structure colour
//! scheme painted in the highlight colours. Everything that was changed is
//! recorded in memory and in cold storage so it can be put back on the
//! next selection, on teardown, or after a crash.

use parking_lot::Mutex;
use tracing::{debug, warn};

use trackforge_core::{
    ActionResult, PaintedSegmentDetails, ResolveError, Result, Segment, SharedColdStorage,
    SharedExecutor, TrackAction,
};
use trackforge_settings::PaintingSettings;

use crate::resolver::TrackElementResolver;

pub struct SegmentPainter {
    resolver: TrackElementResolver,
    executor: SharedExecutor,
    storage: SharedColdStorage,
    settings: PaintingSettings,
    memory: Mutex<Option<PaintedSegmentDetails>>,
}

impl SegmentPainter {
    pub fn new(
        resolver: TrackElementResolver,
        executor: SharedExecutor,
        storage: SharedColdStorage,
        settings: PaintingSettings,
    ) -> Self {
        Self {
            resolver,
            executor,
            storage,
            settings,
            memory: Mutex::new(None),
        }
    }

    /// Details of the currently painted segment, if any
    pub fn painted(&self) -> Option<PaintedSegmentDetails> {
        self.memory.lock().clone()
    }

    async fn dispatch(&self, action: TrackAction) -> Result<ActionResult> {
        let name = action.name();
        Ok(self.executor.execute(action).await.into_result(name)?)
    }

    /// Restore the previous segment and paint `segment`
    pub async fn paint_selected_segment(&self, segment: &Segment) -> Result<()> {
        self.restore_initial_colour().await?;
        if !self.settings.enabled {
            return Ok(());
        }

        let resolved = self.resolver.resolve_segment(segment)?;
        let covered = self.resolver.all_segment_elements(segment);
        let tiles = segment.piece_type().definition().footprint.len();
        if covered.len() < tiles {
            warn!(
                "Only {} of {} tiles of {} resolved, painting it anyway",
                covered.len(),
                tiles,
                segment
            );
        }
        let structure = self
            .resolver
            .world()
            .structure(segment.structure_id())
            .ok_or(ResolveError::UnknownStructure {
                structure_id: segment.structure_id(),
            })?;

        let highlight_scheme = self.settings.highlight_scheme;
        let details = PaintedSegmentDetails {
            segment: segment.clone(),
            colour_scheme: resolved.element.colour_scheme,
            colours: structure
                .colour_scheme(resolved.element.colour_scheme)
                .unwrap_or_default(),
            highlight_scheme,
            highlight_colours: structure
                .colour_scheme(highlight_scheme)
                .unwrap_or_default(),
        };

        // recorded before painting so a partial paint is still restored
        *self.memory.lock() = Some(details.clone());
        self.storage.set_painted_segment_details(Some(&details))?;

        self.dispatch(TrackAction::SetStructureColours {
            structure_id: segment.structure_id(),
            scheme: highlight_scheme,
            colours: self.settings.highlight_colours,
        })
        .await?;
        self.dispatch(TrackAction::SetColourScheme {
            location: segment.location().with_z(resolved.element.base_height),
            piece_type: resolved.element.piece_type,
            colour_scheme: highlight_scheme,
        })
        .await?;

        debug!("Painted {}", segment);
        Ok(())
    }

    /// Undo the last paint
    ///
    /// Falls back to cold storage when nothing was painted in this session.
    pub async fn restore_initial_colour(&self) -> Result<()> {
        let remembered = self.memory.lock().take();
        let details = match remembered {
            Some(details) => Some(details),
            None => self.storage.painted_segment_details()?,
        };
        let Some(details) = details else {
            return Ok(());
        };

        let segment = &details.segment;
        match self.resolver.resolve_segment(segment) {
            Ok(resolved) => {
                self.dispatch(TrackAction::SetStructureColours {
                    structure_id: segment.structure_id(),
                    scheme: details.colour_scheme,
                    colours: details.colours,
                })
                .await?;
                if details.highlight_scheme != details.colour_scheme {
                    self.dispatch(TrackAction::SetStructureColours {
                        structure_id: segment.structure_id(),
                        scheme: details.highlight_scheme,
                        colours: details.highlight_colours,
                    })
                    .await?;
                }
                self.dispatch(TrackAction::SetColourScheme {
                    location: segment.location().with_z(resolved.element.base_height),
                    piece_type: resolved.element.piece_type,
                    colour_scheme: details.colour_scheme,
                })
                .await?;
                debug!("Restored colours of {}", segment);
            }
            Err(err) => {
                warn!("Painted segment {} is gone, dropping its record: {}", segment, err);
            }
        }

        self.storage.set_painted_segment_details(None)?;
        Ok(())
    }
}

impl std::fmt::Debug for SegmentPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentPainter")
            .field("settings", &self.settings)
            .field("painted", &*self.memory.lock())
            .finish_non_exhaustive()
    }
}
