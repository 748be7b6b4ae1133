//! End-to-end behavior of a sheet driven headlessly at 60 fps

use std::sync::{Arc, Mutex};

use crate::backdrop::backdrop_opacity;
use crate::config::{BackdropConfig, PressBehavior, SheetConfig, SnapPoint};
use crate::content::ContentRegion;
use crate::controller::SheetController;
use crate::events::{SettleReason, SheetEvent};
use crate::gesture::GestureEvent;
use crate::layout::ContainerLayout;
use crate::scroll_lock::mode_for_index;

const FRAME: f32 = 1.0 / 60.0;

fn three_points() -> SheetConfig {
    SheetConfig::new([
        SnapPoint::Percent(25.0),
        SnapPoint::Percent(50.0),
        SnapPoint::Percent(90.0),
    ])
}

fn record(controller: &SheetController) -> Arc<Mutex<Vec<SheetEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    controller.subscribe(move |event| sink.lock().unwrap().push(*event));
    events
}

fn settle(controller: &SheetController) {
    for _ in 0..600 {
        if !controller.tick(FRAME) {
            return;
        }
    }
    panic!("sheet never came to rest");
}

fn mounted(config: SheetConfig) -> SheetController {
    let controller = SheetController::new("scenario", config).unwrap();
    controller.set_layout(ContainerLayout::new(800.0));
    settle(&controller);
    controller
}

/// Drag from the resting position to `position` and release
fn fling_to(controller: &SheetController, position: f32, velocity: f32) {
    let translation = position - controller.snapshot().position;
    controller.handle_gesture(GestureEvent::Begin { timestamp_ms: 0.0 });
    controller.handle_gesture(GestureEvent::Update {
        translation_y: translation / 2.0,
        velocity_y: Some(velocity),
        timestamp_ms: 16.0,
    });
    controller.handle_gesture(GestureEvent::End {
        translation_y: translation,
        velocity_y: Some(velocity),
        timestamp_ms: 32.0,
    });
}

fn table_changes(events: &[SheetEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SheetEvent::SnapTableChanged { .. }))
        .count()
}

#[test]
fn test_slow_release_at_sixty_percent_settles_at_half() {
    let controller = mounted(three_points());

    // 60% of the container tall
    fling_to(&controller, 320.0, 5.0);
    settle(&controller);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.current_index, 1);
    assert_eq!(snapshot.position, 400.0);
}

#[test]
fn test_fast_upward_release_at_sixty_percent_expands() {
    let controller = mounted(three_points());

    fling_to(&controller, 320.0, -2000.0);
    settle(&controller);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.current_index, 2);
    assert_eq!(snapshot.position, 80.0);
}

#[test]
fn test_dynamic_height_filters_small_changes() {
    let controller = mounted(three_points().dynamic_sizing(true));
    let events = record(&controller);

    controller.report_content_height(ContentRegion::Body, 300.0);
    controller.report_content_height(ContentRegion::Footer, 50.0);
    assert_eq!(controller.content().aggregated_height(&controller.instance_key()), 350.0);
    assert_eq!(controller.table().positions(), &[600.0, 450.0, 400.0, 80.0]);
    let after_measure = table_changes(&events.lock().unwrap());

    controller.report_content_height(ContentRegion::Body, 305.0);
    assert_eq!(table_changes(&events.lock().unwrap()), after_measure);
    assert_eq!(controller.table().positions()[1], 450.0);

    controller.report_content_height(ContentRegion::Body, 320.0);
    assert_eq!(table_changes(&events.lock().unwrap()), after_measure + 1);
    assert_eq!(controller.table().positions()[1], 430.0);
    assert!(controller.table().is_monotonic());
}

#[test]
fn test_same_height_twice_recomputes_once() {
    let controller = mounted(three_points().dynamic_sizing(true));
    let events = record(&controller);

    controller.report_content_height(ContentRegion::Body, 260.0);
    controller.report_content_height(ContentRegion::Body, 260.0);
    assert_eq!(table_changes(&events.lock().unwrap()), 1);
}

#[test]
fn test_table_stays_monotonic_under_content_churn() {
    let controller = mounted(three_points().dynamic_sizing(true));
    let mut height = 0.0_f32;
    for step in 0..80 {
        height = (height + 37.0 * (step % 7) as f32) % 900.0;
        controller.report_content_height(ContentRegion::Body, height);
        controller.tick(FRAME);
        assert!(controller.table().is_monotonic());
    }
}

#[test]
fn test_backdrop_opacity_tracks_index() {
    let backdrop = BackdropConfig::default().range(0, 2).opacity(0.6);
    let controller = SheetController::new(
        "scenario",
        three_points().initial_index(-1).backdrop(backdrop),
    )
    .unwrap();
    controller.set_layout(ContainerLayout::new(800.0));
    settle(&controller);

    let frame = controller.frame();
    assert_eq!(frame.motion.index, -1.0);
    assert_eq!(frame.backdrop.unwrap().opacity, 0.0);

    controller.expand();
    let mut previous = 0.0;
    loop {
        let moving = controller.tick(FRAME);
        let frame = controller.frame();
        let opacity = frame.backdrop.unwrap().opacity;
        let index = frame.motion.index;

        assert!((opacity - backdrop_opacity(index, &backdrop)).abs() < 1e-6);
        if index <= 0.0 {
            assert_eq!(opacity, 0.0);
        } else {
            assert!((opacity - 0.6 * index / 2.0).abs() < 1e-5);
        }
        assert!(opacity >= previous - 1e-6);
        previous = opacity;
        if !moving {
            break;
        }
    }
    assert_eq!(controller.frame().backdrop.unwrap().opacity, 0.6);
}

#[test]
fn test_collapse_tap_dispatches_once() {
    let backdrop = BackdropConfig::default()
        .range(0, 2)
        .press_behavior(PressBehavior::Collapse);
    let controller = mounted(three_points().initial_index(2).backdrop(backdrop));
    assert_eq!(controller.snapshot().current_index, 2);
    let events = record(&controller);

    assert!(controller.press_backdrop().is_some());
    for _ in 0..10 {
        controller.tick(FRAME);
        assert!(controller.press_backdrop().is_none());
    }
    settle(&controller);
    assert!(controller.press_backdrop().is_none());

    let events = events.lock().unwrap();
    let commands: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SheetEvent::TransitionStarted {
                target_index,
                reason: SettleReason::Command,
                ..
            } => Some(*target_index),
            _ => None,
        })
        .collect();
    assert_eq!(commands, vec![0]);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SheetEvent::BackdropPressed { .. }))
            .count(),
        1
    );
    assert_eq!(controller.snapshot().current_index, 0);
}

#[test]
fn test_backdrop_tap_ignored_during_drag() {
    let backdrop = BackdropConfig::default().range(0, 2);
    let controller = mounted(three_points().initial_index(2).backdrop(backdrop));

    controller.handle_gesture(GestureEvent::Begin { timestamp_ms: 0.0 });
    assert!(controller.press_backdrop().is_none());
}

#[test]
fn test_index_stays_in_range_for_any_release() {
    // Small LCG so the sequence is reproducible
    let mut seed: u32 = 0x2545_f491;
    let mut next = move || {
        seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (seed >> 8) as f32 / (1u32 << 24) as f32
    };

    for pan_down_to_close in [false, true] {
        let controller = mounted(three_points().pan_down_to_close(pan_down_to_close));
        let table = controller.table();
        for _ in 0..40 {
            let target = next() * 1400.0 - 300.0;
            let velocity = next() * 12_000.0 - 6_000.0;
            fling_to(&controller, target, velocity);

            for _ in 0..20 {
                controller.tick(FRAME);
                let snapshot = controller.snapshot();
                assert!(snapshot.index >= -1.0 && snapshot.index <= table.highest_index() as f32);
            }
            settle(&controller);
            let committed = controller.snapshot().current_index;
            assert!(committed >= -1 && committed <= table.highest_index());
            if !pan_down_to_close {
                assert!(committed >= 0);
            }
        }
    }
}

#[test]
fn test_scroll_lock_matches_index_every_frame() {
    let controller = mounted(three_points());
    let threshold = 1;

    for target in [2, 0, 1, 2, 1] {
        controller.snap_to_index(target);
        loop {
            let moving = controller.tick(FRAME);
            let frame = controller.frame();
            assert_eq!(frame.scroll.mode, mode_for_index(frame.motion.index, threshold));
            if !moving {
                break;
            }
        }
    }
}
