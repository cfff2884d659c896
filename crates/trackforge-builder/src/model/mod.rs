//! Segment model
//!
//! Orchestrates selection, build direction and the preview lifecycle. The
//! model state only changes through [`transition`]; [`SegmentModel`] is
//! the single dispatcher that applies transitions and runs their effects
//! against the world, feeding effect results back as follow-up inputs
//! until the model settles.
//!
//! Dispatches are serialized, so a remove is always awaited before the
//! place that follows it.

mod state;
mod transitions;

pub use state::{Effect, ModelInput, ModelState};
pub use transitions::{transition, TransitionContext};

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

use trackforge_core::{
    BuildDirection, BuildError, Error, EventFilter, Message, MessageDispatcher, ModelEvent,
    ModelEventBus, PieceType, PlacementMode, Result, Segment, SharedColdStorage, SharedExecutor,
    SharedHighlighter, SharedPermissions, SharedWorld, SubscriptionId,
};
use trackforge_settings::{BuilderConfig, ConstructionSettings};

use crate::construction::{BuildOutcome, ConstructionEngine};
use crate::navigator::ChainNavigator;
use crate::painter::SegmentPainter;
use crate::resolver::TrackElementResolver;
use crate::rules::{BuildRules, ContinuationSuggestion, SlopeContinuityRules, SuggestionStrategy};

/// Host collaborators the model is wired to
#[derive(Clone)]
pub struct Collaborators {
    pub world: SharedWorld,
    pub executor: SharedExecutor,
    pub permissions: SharedPermissions,
    pub storage: SharedColdStorage,
    pub highlighter: SharedHighlighter,
}

/// What a dispatch produced besides state changes
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Set when the dispatch ran or rejected a commit
    pub commit: Option<Result<BuildOutcome>>,
    /// Number of inputs processed, follow-ups included
    pub inputs: usize,
}

pub struct SegmentModel {
    state: Mutex<ModelState>,
    dispatch_lock: tokio::sync::Mutex<()>,
    resolver: TrackElementResolver,
    engine: ConstructionEngine,
    painter: SegmentPainter,
    storage: SharedColdStorage,
    highlighter: SharedHighlighter,
    rules: Arc<dyn BuildRules>,
    suggestion: Arc<dyn SuggestionStrategy>,
    settings: ConstructionSettings,
    events: ModelEventBus,
    messages: MessageDispatcher,
}

impl SegmentModel {
    pub fn new(collaborators: Collaborators, config: &BuilderConfig) -> Self {
        let resolver = TrackElementResolver::new(collaborators.world);
        let engine = ConstructionEngine::new(
            resolver.clone(),
            collaborators.executor.clone(),
            collaborators.permissions,
            config.construction.clone(),
        );
        let painter = SegmentPainter::new(
            resolver.clone(),
            collaborators.executor,
            collaborators.storage.clone(),
            config.painting.clone(),
        );

        Self {
            state: Mutex::new(ModelState::new(Some(config.general.default_build_direction))),
            dispatch_lock: tokio::sync::Mutex::new(()),
            resolver,
            engine,
            painter,
            storage: collaborators.storage,
            highlighter: collaborators.highlighter,
            rules: Arc::new(SlopeContinuityRules),
            suggestion: Arc::new(ContinuationSuggestion),
            settings: config.construction.clone(),
            events: ModelEventBus::new(),
            messages: MessageDispatcher::default(),
        }
    }

    pub fn with_rules(mut self, rules: Arc<dyn BuildRules>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_suggestion(mut self, suggestion: Arc<dyn SuggestionStrategy>) -> Self {
        self.suggestion = suggestion;
        self
    }

    pub fn with_event_bus(mut self, events: ModelEventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_messages(mut self, messages: MessageDispatcher) -> Self {
        self.messages = messages;
        self
    }

    /// Snapshot of the whole state
    pub fn state(&self) -> ModelState {
        self.state.lock().clone()
    }

    pub fn selected_segment(&self) -> Option<Segment> {
        self.state.lock().selected.clone()
    }

    pub fn preview_segment(&self) -> Option<Segment> {
        self.state.lock().preview.clone()
    }

    pub fn build_direction(&self) -> Option<BuildDirection> {
        self.state.lock().build_direction
    }

    pub fn selected_build(&self) -> Option<PieceType> {
        self.state.lock().selected_build
    }

    pub fn buildable_pieces(&self) -> Vec<PieceType> {
        self.state.lock().buildable.clone()
    }

    pub fn events(&self) -> &ModelEventBus {
        &self.events
    }

    pub fn messages(&self) -> &MessageDispatcher {
        &self.messages
    }

    /// Subscribe to model events
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(ModelEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(filter, handler)
    }

    pub fn resolver(&self) -> &TrackElementResolver {
        &self.resolver
    }

    pub fn engine(&self) -> &ConstructionEngine {
        &self.engine
    }

    pub fn painter(&self) -> &SegmentPainter {
        &self.painter
    }

    pub async fn select_segment(&self, segment: Option<Segment>) {
        self.dispatch(ModelInput::SelectSegment(segment)).await;
    }

    pub async fn set_build_direction(&self, direction: Option<BuildDirection>) {
        self.dispatch(ModelInput::SetBuildDirection(direction)).await;
    }

    pub async fn select_build(&self, piece: Option<PieceType>) {
        self.dispatch(ModelInput::SelectBuild(piece)).await;
    }

    /// Commit the selected build as a real piece
    ///
    /// Failures are also reported on the message dispatcher; the model
    /// stays usable either way.
    pub async fn build_selected_piece(&self) -> Result<BuildOutcome> {
        self.dispatch(ModelInput::Commit)
            .await
            .commit
            .unwrap_or_else(|| {
                Err(BuildError::NothingToBuild {
                    reason: "commit produced no result".to_string(),
                }
                .into())
            })
    }

    /// Move the selection one piece along the chain
    ///
    /// Returns false when there is no committed piece in that direction;
    /// ghosts do not count.
    pub async fn move_to_next_segment(&self, direction: BuildDirection) -> bool {
        let Some(selected) = self.selected_segment() else {
            return false;
        };

        let neighbour = {
            let mut navigator = match ChainNavigator::at_segment(&self.resolver, &selected) {
                Ok(navigator) => navigator,
                Err(err) => {
                    warn!("Cannot walk from {}: {}", selected, err);
                    return false;
                }
            };
            if !navigator.step(direction) {
                return false;
            }
            navigator.segment().and_then(|segment| {
                self.resolver
                    .resolve_segment(&segment)
                    .map(|resolved| (segment, resolved.element.is_ghost))
            })
        };

        match neighbour {
            Ok((_, true)) => {
                debug!("Only a ghost {} of {}", direction, selected);
                false
            }
            Ok((segment, false)) => {
                self.select_segment(Some(segment)).await;
                true
            }
            Err(err) => {
                warn!("{} neighbour of {} not resolved: {}", direction, selected, err);
                false
            }
        }
    }

    /// Tear down: restore paint, remove the ghost, clear the selection
    pub async fn close(&self) {
        self.dispatch(ModelInput::Close).await;
    }

    /// Repair what an unclean shutdown left behind
    ///
    /// Loads the markers from cold storage and closes against them. Returns
    /// whether anything had to be cleaned up.
    pub async fn clean_up_from_improper_close(&self) -> Result<bool> {
        let snapshot = self.storage.load()?;
        if snapshot.is_empty() {
            return Ok(false);
        }

        debug!(
            "Cleaning up after improper close (preview: {:?}, painted: {})",
            snapshot.preview,
            snapshot.painted.is_some()
        );
        self.dispatch(ModelInput::Recover {
            selected: snapshot.selected,
            preview: snapshot.preview,
        })
        .await;
        self.dispatch(ModelInput::Close).await;
        Ok(true)
    }

    /// Apply an input and run effects until no follow-up remains
    pub async fn dispatch(&self, input: ModelInput) -> DispatchReport {
        let _serial = self.dispatch_lock.lock().await;
        let mut queue = VecDeque::from([input]);
        let mut report = DispatchReport::default();

        while let Some(input) = queue.pop_front() {
            report.inputs += 1;
            let effects = {
                let ctx = TransitionContext {
                    rules: self.rules.as_ref(),
                    suggestion: self.suggestion.as_ref(),
                    settings: &self.settings,
                };
                let mut state = self.state.lock();
                let (next, effects) = transition(&state, input, &ctx);
                *state = next;
                effects
            };

            for effect in effects {
                if let Some(follow_up) = self.run_effect(effect, &mut report).await {
                    queue.push_back(follow_up);
                }
            }
        }

        report
    }

    async fn run_effect(&self, effect: Effect, report: &mut DispatchReport) -> Option<ModelInput> {
        match effect {
            Effect::Paint(segment) => {
                if let Err(err) = self.painter.paint_selected_segment(&segment).await {
                    warn!("Could not paint {}: {}", segment, err);
                }
                None
            }
            Effect::RestorePaint => {
                if let Err(err) = self.painter.restore_initial_colour().await {
                    warn!("Could not restore painted colours: {}", err);
                }
                None
            }
            Effect::Highlight(segment) => {
                self.highlighter.highlight(segment.as_ref());
                None
            }
            Effect::PersistSelected(segment) => {
                if let Err(err) = self.storage.set_selected_segment(segment.as_ref()) {
                    warn!("Could not persist selected segment: {}", err);
                }
                None
            }
            Effect::PersistPreview(segment) => {
                if let Err(err) = self.storage.set_preview_segment(segment.as_ref()) {
                    warn!("Could not persist preview segment: {}", err);
                }
                None
            }
            Effect::ProbeSlot {
                segment,
                direction,
                piece,
            } => Some(match ChainNavigator::at_segment(&self.resolver, &segment) {
                Ok(navigator) => {
                    let kind = navigator.peek(direction);
                    debug!("{} slot of {} is {}", direction, segment, kind);
                    ModelInput::SlotProbed { piece, kind }
                }
                Err(err) => ModelInput::PreviewFailed {
                    piece,
                    reason: err.to_string(),
                },
            }),
            Effect::PlaceGhost {
                segment,
                direction,
                piece,
            } => Some(self.place_ghost(&segment, direction, piece).await),
            Effect::ReplaceGhost {
                segment,
                direction,
                piece,
            } => {
                if let Err(err) = self
                    .engine
                    .remove_at_following_position(&segment, direction, PlacementMode::Ghost)
                    .await
                {
                    return Some(ModelInput::PreviewFailed {
                        piece,
                        reason: err.to_string(),
                    });
                }
                Some(self.place_ghost(&segment, direction, piece).await)
            }
            Effect::RemovePreview(segment) => {
                match self.engine.remove_segment(&segment, PlacementMode::Ghost).await {
                    Ok(_) => {}
                    Err(err) if is_already_gone(&err) => {
                        debug!("Preview {} already gone: {}", segment, err);
                    }
                    Err(err) => warn!("Could not remove preview {}: {}", segment, err),
                }
                None
            }
            Effect::CommitBuild {
                segment,
                direction,
                piece,
                remove_ghost,
            } => {
                let mut ghost_removed = false;
                if remove_ghost {
                    match self
                        .engine
                        .remove_at_following_position(&segment, direction, PlacementMode::Ghost)
                        .await
                    {
                        Ok(removed) => ghost_removed = removed.is_some(),
                        Err(err) => debug!("No ghost removed before commit: {}", err),
                    }
                }

                match self
                    .engine
                    .build_at_following_position(&segment, direction, piece, PlacementMode::Real)
                    .await
                {
                    Ok(outcome) => {
                        let built = outcome.segment.clone();
                        report.commit = Some(Ok(outcome));
                        built.map(ModelInput::Committed)
                    }
                    Err(err) => {
                        let reason = err.to_string();
                        report.commit = Some(Err(err));
                        Some(ModelInput::CommitFailed {
                            piece,
                            reason,
                            ghost_removed,
                        })
                    }
                }
            }
            Effect::RejectCommit { reason } => {
                report.commit = Some(Err(BuildError::NothingToBuild { reason }.into()));
                None
            }
            Effect::Publish(event) => {
                self.events.publish(event);
                None
            }
            Effect::Notify(message) => {
                self.notify(message);
                None
            }
        }
    }

    async fn place_ghost(
        &self,
        segment: &Segment,
        direction: BuildDirection,
        piece: PieceType,
    ) -> ModelInput {
        match self
            .engine
            .build_at_following_position(segment, direction, piece, PlacementMode::Ghost)
            .await
        {
            Ok(BuildOutcome {
                segment: Some(preview),
                ..
            }) => ModelInput::PreviewPlaced(preview),
            Ok(_) => ModelInput::PreviewFailed {
                piece,
                reason: "placement reported no segment".to_string(),
            },
            Err(err) => ModelInput::PreviewFailed {
                piece,
                reason: err.to_string(),
            },
        }
    }

    fn notify(&self, message: Message) {
        self.messages.publish(message);
    }
}

/// A ghost that vanished or turned out to be committed is not ours to remove
fn is_already_gone(err: &Error) -> bool {
    err.is_not_found() || matches!(err, Error::Build(BuildError::ModeMismatch { .. }))
}

impl std::fmt::Debug for SegmentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentModel")
            .field("state", &*self.state.lock())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
