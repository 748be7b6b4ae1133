//! Sheet controller
//!
//! [`SheetController`] owns one sheet instance: its motion state, the
//! published snap table, the content-height map, and the settle/gesture
//! machinery. Hosts drive it from two timelines:
//!
//! - the frame timeline: [`GestureEvent`]s and [`SheetController::tick`]
//! - the layout timeline: container measurements and content heights
//!
//! Every mutation runs under one state lock and queues its [`SheetEvent`]s;
//! listeners are called after the lock is released, so a listener may call
//! straight back into the sheet.
//!
//! [`SheetHandle`] is a weak reference for collaborators. Once the
//! controller is dropped every handle operation is a logged no-op.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use glide_core::{ListenerId, Listeners, SnapshotCell};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::backdrop::{BackdropFrame, BackdropReactor};
use crate::bindings::ScrollableKind;
use crate::config::SheetConfig;
use crate::content::{ContentHeightAggregator, ContentRegion, ContentSnapshot, HeightReport, InstanceKey};
use crate::error::Result;
use crate::events::{SettleReason, SheetCommand, SheetEvent, TransitionId, TransitionOutcome};
use crate::footer::footer_margin_for;
use crate::gesture::{DragBounds, GestureEvent, GestureSession};
use crate::layout::ContainerLayout;
use crate::motion::{MotionSnapshot, MotionState};
use crate::resolver::{Resolution, SnapResolver, SnapTarget};
use crate::scroll_lock::{drag_owner, DragOwner, ScrollBehavior, ScrollLock, ScrollLockMode};
use crate::settle::Settle;
use crate::snap::{SnapTable, CLOSED_INDEX};

/// A settle starting this close to its target completes immediately
const ARRIVAL_EPSILON: f32 = 0.5;

slotmap::new_key_type! {
    /// Identifies a registered scrollable collaborator
    pub struct ScrollableId;
}

/// Everything a renderer needs for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SheetFrame {
    pub motion: MotionSnapshot,
    pub scroll: ScrollBehavior,
    pub backdrop: Option<BackdropFrame>,
    pub table_version: u64,
}

#[derive(Clone, Copy, Debug)]
struct ScrollableEntry {
    kind: ScrollableKind,
    offset: f32,
}

#[derive(Clone, Copy, Debug)]
struct PendingCommand {
    id: TransitionId,
    command: SheetCommand,
}

struct SheetState {
    key: InstanceKey,
    layout: ContainerLayout,
    resolver: SnapResolver,
    scroll_lock: ScrollLock,
    backdrop: Option<BackdropReactor>,
    settle: Option<Settle>,
    gesture: Option<GestureSession>,
    /// Command issued before the table had any snap points
    pending: Option<PendingCommand>,
    /// Initial settle done (or superseded)
    mounted: bool,
    next_transition: u64,
    scrollables: SlotMap<ScrollableId, ScrollableEntry>,
    active_scrollable: Option<ScrollableId>,
    outbox: SmallVec<[SheetEvent; 8]>,
}

impl SheetState {
    fn allocate_id(&mut self) -> TransitionId {
        self.next_transition += 1;
        TransitionId(self.next_transition)
    }
}

pub(crate) struct SheetShared {
    config: SheetConfig,
    motion: MotionState,
    table: SnapshotCell<SnapTable>,
    content: ContentHeightAggregator,
    listeners: Listeners<SheetEvent>,
    state: Mutex<SheetState>,
}

impl SheetShared {
    /// Run `f` under the state lock, then deliver queued events
    fn transact<R>(&self, f: impl FnOnce(&Self, &mut SheetState) -> R) -> R {
        let (result, events) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let result = f(self, &mut *state);
            (result, std::mem::take(&mut state.outbox))
        };
        for event in &events {
            self.listeners.emit(event);
        }
        result
    }

    fn read<R>(&self, f: impl FnOnce(&SheetState) -> R) -> R {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&*state)
    }

    // =========================================================================
    // Layout and content
    // =========================================================================

    fn set_layout(&self, layout: ContainerLayout) {
        self.transact(|shared, state| {
            if state.layout == layout {
                return;
            }
            tracing::debug!("'{}' container height {}", state.key, layout.height);
            state.layout = layout;
            shared.refresh_table(state);
        });
    }

    fn report_content(
        &self,
        region: ContentRegion,
        report: impl FnOnce(&ContentHeightAggregator, &InstanceKey) -> HeightReport,
    ) -> HeightReport {
        self.transact(|shared, state| {
            let report = report(&shared.content, &state.key);
            if let HeightReport::Accepted { total, .. } = &report {
                tracing::debug!("'{}' content height {} after {} report", state.key, total, region);
                if shared.config.enable_dynamic_sizing {
                    shared.refresh_table(state);
                }
            }
            report
        })
    }

    fn set_instance_key(&self, key: InstanceKey) {
        self.transact(|shared, state| {
            if state.key == key {
                return;
            }
            shared.content.retire_instance(&state.key);
            tracing::debug!("sheet key '{}' -> '{}'", state.key, key);
            state.key = key;
            shared.refresh_table(state);
        });
    }

    fn refresh_table(&self, state: &mut SheetState) {
        let content_height = if self.config.enable_dynamic_sizing {
            self.content.aggregated_height(&state.key)
        } else {
            0.0
        };
        let next = SnapTable::compute(&self.config, &state.layout, content_height);
        let previous = self.table.load();
        if *previous == next {
            // New content may still settle an unmounted sheet on the same table
            if !state.mounted {
                self.try_mount(state, &previous);
            }
            return;
        }

        let len = next.len();
        let version = self.table.publish(next);
        let table = self.table.load();
        tracing::debug!("'{}' snap table v{}: {:?}", state.key, version, table.positions());
        state.outbox.push(SheetEvent::SnapTableChanged { version, len });

        self.apply_table(state, &table);
    }

    fn apply_table(&self, state: &mut SheetState, table: &SnapTable) {
        if !state.mounted {
            self.try_mount(state, table);
            return;
        }
        if !table.is_empty() {
            if let Some(pending) = state.pending.take() {
                self.run_command(state, pending.id, pending.command);
                return;
            }
        }
        if state.gesture.is_some() {
            // Bounds are re-read on the next update; release uses the new table
            self.react(state, 0.0);
            return;
        }

        if let Some(settle) = state.settle.as_mut() {
            let index = if table.is_empty() {
                tracing::warn!("snap table emptied during a settle; closing");
                CLOSED_INDEX
            } else {
                table.clamp_index(settle.target.index)
            };
            let target = Resolution {
                index,
                position: table.position(index).unwrap_or(table.closed_position()),
            };
            if target != settle.target {
                tracing::debug!("retargeting settle {} to index {}", settle.id.raw(), index);
                settle.retarget(target);
                self.motion.set_next_target(Some(index));
            }
        } else {
            let current = self.motion.current_index();
            let index = table.clamp_index(current);
            if index != current {
                tracing::warn!("committed index {} no longer exists; moving to {}", current, index);
            }
            let position = table.position(index).unwrap_or(table.closed_position());
            if index == CLOSED_INDEX {
                self.motion
                    .set_position(position, table.index_for_position(position));
                self.motion.commit_index(CLOSED_INDEX);
            } else if (position - self.motion.position()).abs() >= ARRIVAL_EPSILON {
                let id = state.allocate_id();
                self.start_settle(
                    state,
                    id,
                    Resolution { index, position },
                    0.0,
                    SettleReason::TableChanged,
                );
            }
        }
        self.react(state, 0.0);
    }

    fn try_mount(&self, state: &mut SheetState, table: &SnapTable) {
        if !state.layout.is_measured() {
            return;
        }
        if state.gesture.is_none() && state.settle.is_none() {
            let closed = table.closed_position();
            self.motion
                .set_position(closed, table.index_for_position(closed));
        }
        if table.is_empty() {
            return;
        }

        if let Some(pending) = state.pending.take() {
            state.mounted = true;
            tracing::debug!("'{}' running queued {:?}", state.key, pending.command);
            self.run_command(state, pending.id, pending.command);
            return;
        }

        // The finger owns Position; its release settle replaces the mount settle
        if state.gesture.is_some() {
            state.mounted = true;
            tracing::debug!("'{}' mounted under an active drag", state.key);
            self.react(state, 0.0);
            return;
        }

        let mut initial = self.config.initial_index;
        if initial == CLOSED_INDEX {
            state.mounted = true;
            self.react(state, 0.0);
            return;
        }
        if table.position(initial).is_none() && self.content.aggregated_height(&state.key) > 0.0 {
            // The content point merged into a configured one or was capped away
            let fallback = table.clamp_index(initial);
            tracing::warn!(
                "'{}' initial index {} not in a {}-point table; mounting at {}",
                state.key,
                initial,
                table.len(),
                fallback
            );
            initial = fallback;
        }
        // A content-derived initial point may still be missing
        if let Some(position) = table.position(initial) {
            state.mounted = true;
            let id = state.allocate_id();
            self.start_settle(
                state,
                id,
                Resolution {
                    index: initial,
                    position,
                },
                0.0,
                SettleReason::Mount,
            );
            self.react(state, 0.0);
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn start_settle(
        &self,
        state: &mut SheetState,
        id: TransitionId,
        target: Resolution,
        velocity: f32,
        reason: SettleReason,
    ) {
        if let Some(previous) = state.settle.take() {
            tracing::debug!("settle {} interrupted by {}", previous.id.raw(), id.raw());
            self.finish(state, previous.id, TransitionOutcome::Interrupted);
        }

        state.outbox.push(SheetEvent::TransitionStarted {
            id,
            target_index: target.index,
            target_position: target.position,
            reason,
        });
        tracing::debug!(
            "settle {} ({:?}) -> index {} at {:.1}",
            id.raw(),
            reason,
            target.index,
            target.position
        );

        let from = self.motion.position();
        if (from - target.position).abs() < ARRIVAL_EPSILON {
            self.complete(state, id, target);
            return;
        }

        self.motion.set_next_target(Some(target.index));
        state.settle = Some(Settle::new(
            id,
            from,
            velocity,
            target,
            reason,
            &self.config.animation,
        ));
    }

    fn complete(&self, state: &mut SheetState, id: TransitionId, target: Resolution) {
        let table = self.table.load();
        self.motion
            .set_position(target.position, table.index_for_position(target.position));
        self.motion.set_next_target(None);
        self.finish(
            state,
            id,
            TransitionOutcome::Settled {
                index: target.index,
                position: target.position,
            },
        );
        if self.motion.commit_index(target.index) {
            state.outbox.push(SheetEvent::IndexCommitted {
                index: target.index,
            });
        }
    }

    fn finish(&self, state: &mut SheetState, id: TransitionId, outcome: TransitionOutcome) {
        if let Some(backdrop) = state.backdrop.as_mut() {
            backdrop.transition_finished(id);
        }
        state
            .outbox
            .push(SheetEvent::TransitionFinished { id, outcome });
    }

    /// Re-derive scroll lock and backdrop from the current motion values
    fn react(&self, state: &mut SheetState, dt_ms: f32) {
        let snapshot = self.motion.snapshot();
        let table = self.table.load();

        if let Some(mode) = state.scroll_lock.update(snapshot.index, &table) {
            state.outbox.push(SheetEvent::ScrollLockChanged { mode });
        }
        if let Some(backdrop) = state.backdrop.as_mut() {
            if let Some(pointer_events) = backdrop.update(&snapshot, dt_ms) {
                state
                    .outbox
                    .push(SheetEvent::BackdropPointerEvents { pointer_events });
            }
        }
    }

    fn tick(&self, dt: f32) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.transact(|shared, state| {
            if let Some(settle) = state.settle.as_mut() {
                let moving = settle.tick(dt) && !settle.is_finished();
                let position = settle.position();
                let table = shared.table.load();
                shared
                    .motion
                    .set_position(position, table.index_for_position(position));
                tracing::trace!(
                    "settle {} ({:?}) at {:.2}",
                    settle.id.raw(),
                    settle.reason,
                    position
                );

                if !moving {
                    if let Some(settle) = state.settle.take() {
                        shared.complete(state, settle.id, settle.target);
                    }
                }
            }
            shared.react(state, dt * 1000.0);
            state.settle.is_some()
        })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn command(&self, command: SheetCommand) -> TransitionId {
        self.transact(|shared, state| {
            let id = state.allocate_id();
            shared.issue(state, id, command);
            id
        })
    }

    fn issue(&self, state: &mut SheetState, id: TransitionId, command: SheetCommand) {
        if state.gesture.take().is_some() {
            tracing::debug!("{:?} abandons the active drag", command);
            self.motion.set_gesture_active(false);
        }

        if self.table.load().is_empty() {
            if let Some(previous) = state.pending.replace(PendingCommand { id, command }) {
                self.finish(state, previous.id, TransitionOutcome::Interrupted);
            }
            tracing::debug!("'{}' queued {:?} until layout", state.key, command);
            return;
        }

        state.mounted = true;
        if let Some(previous) = state.pending.take() {
            self.finish(state, previous.id, TransitionOutcome::Interrupted);
        }
        self.run_command(state, id, command);
    }

    fn run_command(&self, state: &mut SheetState, id: TransitionId, command: SheetCommand) {
        let table = self.table.load();
        let target = match command {
            SheetCommand::SnapToIndex(index) => SnapTarget::Index(index),
            SheetCommand::SnapToPosition(position) => SnapTarget::Position(position),
            SheetCommand::Expand => SnapTarget::Index(table.highest_index()),
            SheetCommand::Collapse => SnapTarget::Index(0),
            SheetCommand::Close => SnapTarget::Close,
        };
        let resolution = state
            .resolver
            .resolve(self.motion.position(), 0.0, &table, Some(target));
        self.start_settle(state, id, resolution, 0.0, SettleReason::Command);
        self.react(state, 0.0);
    }

    fn press_backdrop(&self) -> Option<TransitionId> {
        self.transact(|shared, state| {
            let snapshot = shared.motion.snapshot();
            let command = state.backdrop.as_ref()?.tap(&snapshot)?;

            let id = state.allocate_id();
            state
                .outbox
                .push(SheetEvent::BackdropPressed { command });
            // Marked before issuing so a synchronous completion clears it
            if let Some(backdrop) = state.backdrop.as_mut() {
                backdrop.dispatched(id);
            }
            shared.issue(state, id, command);
            Some(id)
        })
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    fn drag_bounds(&self, table: &SnapTable) -> DragBounds {
        DragBounds::new(
            table,
            self.config.enable_pan_down_to_close,
            self.config.enable_over_drag,
            self.config.gesture.overdrag_resistance,
        )
    }

    fn gesture(&self, event: GestureEvent) -> Option<TransitionId> {
        self.transact(|shared, state| match event {
            GestureEvent::Begin { timestamp_ms } => {
                if shared.table.load().is_empty() {
                    tracing::debug!("drag ignored before the sheet has snap points");
                    return None;
                }
                let interrupted = state.settle.take().map(|settle| {
                    tracing::debug!("drag interrupts settle {}", settle.id.raw());
                    shared.finish(state, settle.id, TransitionOutcome::Interrupted);
                    settle.target
                });
                shared.motion.set_next_target(None);
                let anchor = shared.motion.position();
                state.gesture = Some(GestureSession::begin(anchor, timestamp_ms, interrupted));
                shared.motion.set_gesture_active(true);
                shared.react(state, 0.0);
                None
            }
            GestureEvent::Update {
                translation_y,
                velocity_y,
                timestamp_ms,
            } => {
                let table = shared.table.load();
                let bounds = shared.drag_bounds(&table);
                let Some(session) = state.gesture.as_mut() else {
                    tracing::debug!("drag update without an active session");
                    return None;
                };
                let position = session.update(translation_y, velocity_y, timestamp_ms, &bounds);
                shared
                    .motion
                    .set_position(position, table.index_for_position(position));
                shared.react(state, 0.0);
                None
            }
            GestureEvent::End {
                translation_y,
                velocity_y,
                timestamp_ms,
            } => {
                let mut session = state.gesture.take()?;
                let table = shared.table.load();
                let position =
                    session.update(translation_y, velocity_y, timestamp_ms, &shared.drag_bounds(&table));
                shared
                    .motion
                    .set_position(position, table.index_for_position(position));
                shared.motion.set_gesture_active(false);

                let velocity = session.velocity();
                let target = state.resolver.resolve(position, velocity, &table, None);
                let id = state.allocate_id();
                shared.start_settle(state, id, target, velocity, SettleReason::Release);
                shared.react(state, 0.0);
                Some(id)
            }
            GestureEvent::Cancel => {
                let session = state.gesture.take()?;
                shared.motion.set_gesture_active(false);
                let table = shared.table.load();

                let target = match session.interrupted() {
                    Some(interrupted) => state.resolver.resolve(
                        session.anchor(),
                        0.0,
                        &table,
                        Some(SnapTarget::Index(interrupted.index)),
                    ),
                    None => Resolution {
                        index: table.clamp_index(shared.motion.current_index()),
                        position: session.anchor(),
                    },
                };
                let id = state.allocate_id();
                shared.start_settle(state, id, target, 0.0, SettleReason::Cancel);
                shared.react(state, 0.0);
                Some(id)
            }
        })
    }

    // =========================================================================
    // Scrollables
    // =========================================================================

    pub(crate) fn register_scrollable(&self, kind: ScrollableKind) -> ScrollableId {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let id = state.scrollables.insert(ScrollableEntry { kind, offset: 0.0 });
        state.active_scrollable = Some(id);
        tracing::debug!("'{}' active scrollable {:?}", state.key, kind);
        id
    }

    pub(crate) fn unregister_scrollable(&self, id: ScrollableId) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.scrollables.remove(id);
        if state.active_scrollable == Some(id) {
            // Fall back to any scrollable still mounted
            state.active_scrollable = state.scrollables.keys().next();
        }
    }

    pub(crate) fn set_scroll_offset(&self, id: ScrollableId, offset: f32) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = state.scrollables.get_mut(id) {
            entry.offset = if offset.is_finite() { offset } else { 0.0 };
        }
    }

    pub(crate) fn scroll_drag_owner(&self, id: ScrollableId, translation_y: f32) -> DragOwner {
        self.read(|state| {
            let offset = state.scrollables.get(id).map_or(0.0, |entry| entry.offset);
            drag_owner(state.scroll_lock.mode(), offset, translation_y)
        })
    }

    pub(crate) fn active_scrollable(&self) -> Option<(ScrollableId, ScrollableKind)> {
        self.read(|state| {
            let id = state.active_scrollable?;
            state.scrollables.get(id).map(|entry| (id, entry.kind))
        })
    }

    pub(crate) fn scroll_behavior(&self) -> ScrollBehavior {
        self.read(|state| state.scroll_lock.behavior())
    }

    pub(crate) fn content_snapshot(&self) -> Arc<ContentSnapshot> {
        self.content.snapshot()
    }

    pub(crate) fn instance_key(&self) -> InstanceKey {
        self.read(|state| state.key.clone())
    }

    pub(crate) fn footer_margin(&self, base_margin: f32, enabled: bool) -> f32 {
        let key = self.instance_key();
        footer_margin_for(&self.content.snapshot(), &key, base_margin, enabled)
    }

    pub(crate) fn report_region(&self, region: ContentRegion, height: f32) -> HeightReport {
        self.report_content(region, |content, key| {
            content.report_region_height(key, region, height)
        })
    }

    pub(crate) fn seed_region(&self, region: ContentRegion, height: f32) -> HeightReport {
        self.report_content(region, |content, key| {
            content.seed_region_height(key, region, height)
        })
    }

    pub(crate) fn evict_region(&self, region: ContentRegion) -> HeightReport {
        self.report_content(region, |content, key| content.evict_region(key, region))
    }

    /// Motion values read under the state lock, so position and index agree
    fn snapshot(&self) -> MotionSnapshot {
        self.read(|_| self.motion.snapshot())
    }

    fn frame(&self) -> SheetFrame {
        self.read(|state| SheetFrame {
            motion: self.motion.snapshot(),
            scroll: state.scroll_lock.behavior(),
            backdrop: state.backdrop.as_ref().map(BackdropReactor::frame),
            table_version: self.table.version(),
        })
    }

    fn dispose(&self) {
        self.transact(|shared, state| {
            if let Some(settle) = state.settle.take() {
                shared.finish(state, settle.id, TransitionOutcome::Disposed);
            }
            if let Some(pending) = state.pending.take() {
                shared.finish(state, pending.id, TransitionOutcome::Disposed);
            }
            state.gesture = None;
            state.scrollables.clear();
            state.active_scrollable = None;
            shared.motion.mark_disposed();
            shared.content.retire_instance(&state.key);
            tracing::debug!("sheet '{}' disposed", state.key);
        });
        self.listeners.clear();
    }
}

// =============================================================================
// SheetController
// =============================================================================

/// Owner of one sheet instance
///
/// Dropping the controller tears the sheet down: in-flight transitions
/// finish with [`TransitionOutcome::Disposed`] and outstanding handles go
/// inert.
pub struct SheetController {
    shared: Arc<SheetShared>,
}

impl SheetController {
    /// Validate `config` and create a closed, unmeasured sheet
    pub fn new(key: impl Into<InstanceKey>, config: SheetConfig) -> Result<Self> {
        config.validate()?;

        let backdrop = config.backdrop.map(BackdropReactor::new);
        let state = SheetState {
            key: key.into(),
            layout: ContainerLayout::default(),
            resolver: SnapResolver::from_config(&config),
            scroll_lock: ScrollLock::new(&config.scroll_lock, config.gesture.deceleration_rate),
            backdrop,
            settle: None,
            gesture: None,
            pending: None,
            mounted: false,
            next_transition: 0,
            scrollables: SlotMap::with_key(),
            active_scrollable: None,
            outbox: SmallVec::new(),
        };

        Ok(Self {
            shared: Arc::new(SheetShared {
                motion: MotionState::new(0.0),
                table: SnapshotCell::new(SnapTable::empty(0.0)),
                content: ContentHeightAggregator::new(config.content.height_epsilon),
                listeners: Listeners::new(),
                state: Mutex::new(state),
                config,
            }),
        })
    }

    pub fn handle(&self) -> SheetHandle {
        SheetHandle {
            inner: Arc::downgrade(&self.shared),
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.shared.config
    }

    pub fn instance_key(&self) -> InstanceKey {
        self.shared.instance_key()
    }

    /// Move this sheet to a new instance key, dropping the old key's heights
    pub fn set_instance_key(&self, key: impl Into<InstanceKey>) {
        self.shared.set_instance_key(key.into());
    }

    /// Live motion values; cheap to read every frame
    pub fn motion(&self) -> &MotionState {
        &self.shared.motion
    }

    /// Consistent copy of the motion values
    ///
    /// Unlike [`MotionState::snapshot`], this never pairs a new position with
    /// the previous index.
    pub fn snapshot(&self) -> MotionSnapshot {
        self.shared.snapshot()
    }

    pub fn table(&self) -> Arc<SnapTable> {
        self.shared.table.load()
    }

    pub fn content(&self) -> Arc<ContentSnapshot> {
        self.shared.content_snapshot()
    }

    pub fn frame(&self) -> SheetFrame {
        self.shared.frame()
    }

    pub fn scroll_lock_mode(&self) -> ScrollLockMode {
        self.shared.scroll_behavior().mode
    }

    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&SheetEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.add(callback)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.shared.listeners.remove(id)
    }

    // Layout timeline

    pub fn set_layout(&self, layout: ContainerLayout) {
        self.shared.set_layout(layout);
    }

    pub fn report_content_height(&self, region: ContentRegion, height: f32) -> HeightReport {
        self.shared.report_region(region, height)
    }

    // Frame timeline

    pub fn handle_gesture(&self, event: GestureEvent) -> Option<TransitionId> {
        self.shared.gesture(event)
    }

    /// Advance animations by `dt` seconds; returns `true` while settling
    pub fn tick(&self, dt: f32) -> bool {
        self.shared.tick(dt)
    }

    pub fn press_backdrop(&self) -> Option<TransitionId> {
        self.shared.press_backdrop()
    }

    // Programmatic API

    pub fn command(&self, command: SheetCommand) -> TransitionId {
        self.shared.command(command)
    }

    pub fn snap_to_index(&self, index: i32) -> TransitionId {
        self.command(SheetCommand::SnapToIndex(index))
    }

    pub fn snap_to_position(&self, position: f32) -> TransitionId {
        self.command(SheetCommand::SnapToPosition(position))
    }

    pub fn expand(&self) -> TransitionId {
        self.command(SheetCommand::Expand)
    }

    pub fn collapse(&self) -> TransitionId {
        self.command(SheetCommand::Collapse)
    }

    pub fn close(&self) -> TransitionId {
        self.command(SheetCommand::Close)
    }
}

impl Drop for SheetController {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

impl std::fmt::Debug for SheetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetController")
            .field("key", &self.shared.instance_key())
            .field("motion", &self.shared.motion.snapshot())
            .finish()
    }
}

// =============================================================================
// SheetHandle
// =============================================================================

/// Weak handle to a sheet, held by collaborators
///
/// Operations on a torn-down sheet are ignored.
#[derive(Clone, Default)]
pub struct SheetHandle {
    inner: Weak<SheetShared>,
}

impl SheetHandle {
    pub(crate) fn upgrade(&self) -> Option<Arc<SheetShared>> {
        self.inner
            .upgrade()
            .filter(|shared| !shared.motion.is_disposed())
    }

    fn with<R>(&self, operation: &'static str, f: impl FnOnce(&SheetShared) -> R) -> Option<R> {
        match self.upgrade() {
            Some(shared) => Some(f(&shared)),
            None => {
                tracing::warn!("ignoring {} on a disposed sheet", operation);
                None
            }
        }
    }

    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some()
    }

    pub fn snapshot(&self) -> Option<MotionSnapshot> {
        self.upgrade().map(|shared| shared.snapshot())
    }

    pub fn table(&self) -> Option<Arc<SnapTable>> {
        self.upgrade().map(|shared| shared.table.load())
    }

    pub fn frame(&self) -> Option<SheetFrame> {
        self.upgrade().map(|shared| shared.frame())
    }

    pub fn set_layout(&self, layout: ContainerLayout) {
        self.with("set_layout", |shared| shared.set_layout(layout));
    }

    pub fn report_content_height(&self, region: ContentRegion, height: f32) -> Option<HeightReport> {
        self.with("report_content_height", |shared| {
            shared.report_region(region, height)
        })
    }

    pub fn handle_gesture(&self, event: GestureEvent) -> Option<TransitionId> {
        self.with("handle_gesture", |shared| shared.gesture(event))
            .flatten()
    }

    pub fn press_backdrop(&self) -> Option<TransitionId> {
        self.with("press_backdrop", |shared| shared.press_backdrop())
            .flatten()
    }

    pub fn command(&self, command: SheetCommand) -> Option<TransitionId> {
        self.with("command", |shared| shared.command(command))
    }

    pub fn snap_to_index(&self, index: i32) -> Option<TransitionId> {
        self.command(SheetCommand::SnapToIndex(index))
    }

    pub fn snap_to_position(&self, position: f32) -> Option<TransitionId> {
        self.command(SheetCommand::SnapToPosition(position))
    }

    pub fn expand(&self) -> Option<TransitionId> {
        self.command(SheetCommand::Expand)
    }

    pub fn collapse(&self) -> Option<TransitionId> {
        self.command(SheetCommand::Collapse)
    }

    pub fn close(&self) -> Option<TransitionId> {
        self.command(SheetCommand::Close)
    }
}

impl std::fmt::Debug for SheetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
