use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use swiper_core::{
    CancelReason, ClassTarget, EventKind, HeadlessSurface, Instant, PointerEvent, PointerKind,
    PointerPosition, Swiper, SwiperArgs, SwiperEvent, SwiperPhase, surface::HISTORY_LIMIT,
};

type Log = Arc<Mutex<Vec<SwiperEvent>>>;

fn swiper_with(panels: usize, args: SwiperArgs) -> (Swiper<HeadlessSurface>, Log) {
    let mut swiper = Swiper::new(HeadlessSurface::new(300.0), panels, args);
    let log: Log = Arc::default();
    for kind in EventKind::ALL {
        let log = log.clone();
        swiper.on(kind, move |event| {
            log.lock().expect("log lock").push(event.clone());
        });
    }
    (swiper, log)
}

fn page_events(log: &Log) -> Vec<SwiperEvent> {
    log.lock()
        .expect("log lock")
        .iter()
        .filter(|event| {
            matches!(
                event,
                SwiperEvent::PageChange { .. } | SwiperEvent::TransitionEnd { .. }
            )
        })
        .cloned()
        .collect()
}

fn at(x: f32) -> PointerPosition {
    PointerPosition::new(x, 200.0)
}

fn finish_transition(swiper: &mut Swiper<HeadlessSurface>) {
    let token = swiper
        .surface()
        .last_transition()
        .expect("an animated move")
        .token;
    swiper.handle_transition_end(token);
}

fn drag(
    swiper: &mut Swiper<HeadlessSurface>,
    kind: PointerKind,
    from: f32,
    to: f32,
    held: Duration,
) -> Instant {
    let t0 = Instant::now();
    swiper.handle_pointer(&PointerEvent::down(t0, kind, at(from)));
    swiper.handle_pointer(&PointerEvent::moved(t0 + held / 2, kind, at(to)));
    swiper.handle_pointer(&PointerEvent::up(t0 + held, kind));
    t0 + held
}

#[test]
fn committed_drag_changes_page() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());

    drag(&mut swiper, PointerKind::Touch, 260.0, 10.0, Duration::from_millis(500));

    assert_eq!(swiper.current_index(), 1);
    assert_eq!(swiper.surface().strip_offset(), -300.0);
    let settle = swiper.surface().last_transition().expect("settle");
    assert_eq!(settle.duration, Duration::from_millis(50));

    finish_transition(&mut swiper);
    assert_eq!(
        page_events(&log),
        vec![
            SwiperEvent::PageChange { index: 1 },
            SwiperEvent::TransitionEnd { index: 1 },
        ]
    );
}

#[test]
fn short_slow_drag_snaps_back() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());

    drag(&mut swiper, PointerKind::Mouse, 150.0, 140.0, Duration::from_millis(500));

    assert_eq!(swiper.current_index(), 0);
    assert_eq!(swiper.surface().strip_offset(), 0.0);
    finish_transition(&mut swiper);
    assert_eq!(
        page_events(&log),
        vec![SwiperEvent::TransitionEnd { index: 0 }]
    );
}

#[test]
fn short_fast_flick_commits() {
    let (mut swiper, _log) = swiper_with(5, SwiperArgs::default());
    drag(&mut swiper, PointerKind::Touch, 150.0, 140.0, Duration::from_millis(100));
    assert_eq!(swiper.current_index(), 1);

    let (mut distance_only, _log) =
        swiper_with(5, SwiperArgs::default().duration_threshold(None));
    drag(&mut distance_only, PointerKind::Touch, 150.0, 140.0, Duration::from_millis(100));
    assert_eq!(distance_only.current_index(), 0);
}

#[test]
fn drag_past_first_panel_is_damped_and_reverts() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());
    let t0 = Instant::now();

    swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Touch, at(0.0)));
    swiper.handle_pointer(&PointerEvent::moved(t0, PointerKind::Touch, at(400.0)));
    let damped = swiper.surface().strip_offset();
    assert!((damped - 171.43).abs() < 0.01);

    swiper.handle_pointer(&PointerEvent::up(
        t0 + Duration::from_millis(600),
        PointerKind::Touch,
    ));
    assert_eq!(swiper.current_index(), 0);
    assert_eq!(swiper.surface().strip_offset(), 0.0);
    finish_transition(&mut swiper);
    assert_eq!(
        page_events(&log),
        vec![SwiperEvent::TransitionEnd { index: 0 }]
    );
}

#[test]
fn rapid_moves_collapse_into_one_transition_end() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());

    swiper.next(None);
    let first = swiper.surface().last_transition().expect("first move").token;
    swiper.prev(None);

    swiper.handle_transition_end(first);
    assert!(swiper.has_pending_transition());
    finish_transition(&mut swiper);

    assert_eq!(
        page_events(&log),
        vec![
            SwiperEvent::PageChange { index: 1 },
            SwiperEvent::PageChange { index: 0 },
            SwiperEvent::TransitionEnd { index: 0 },
        ]
    );
}

#[test]
fn zero_speed_completes_before_returning() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());

    swiper.move_to_index(3, Some(Duration::ZERO), false);

    assert_eq!(swiper.phase(), SwiperPhase::Idle);
    assert_eq!(swiper.surface().strip_offset(), -900.0);
    assert_eq!(swiper.surface().last_transition(), None);
    assert_eq!(
        page_events(&log),
        vec![
            SwiperEvent::PageChange { index: 3 },
            SwiperEvent::TransitionEnd { index: 3 },
        ]
    );
}

#[test]
fn move_to_current_index_completes_without_page_change() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default().start_index(2));
    swiper.move_to_index(2, Some(Duration::from_millis(400)), false);
    assert_eq!(
        page_events(&log),
        vec![SwiperEvent::TransitionEnd { index: 2 }]
    );
}

#[test]
fn out_of_range_moves_clamp() {
    let (mut swiper, _log) = swiper_with(5, SwiperArgs::default());
    swiper.move_to_index(42, Some(Duration::ZERO), false);
    assert_eq!(swiper.current_index(), 4);
    assert_eq!(swiper.surface().strip_offset(), -1200.0);

    let (mut single, log) = swiper_with(1, SwiperArgs::default());
    assert!(!single.next(None));
    assert!(!single.prev(None));
    assert!(page_events(&log).is_empty());
}

#[test]
fn resize_repositions_without_notifying() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default().start_index(2));

    swiper.surface_mut().set_viewport_width(412.7);
    swiper.resize();

    assert_eq!(swiper.page_width().raw(), 413);
    assert_eq!(swiper.surface().strip_offset(), -826.0);
    assert_eq!(swiper.surface().last_transition(), None);
    assert!(log.lock().expect("log lock").is_empty());
}

#[test]
fn auto_height_follows_width() {
    let (mut swiper, _log) = swiper_with(3, SwiperArgs::default().auto_height_ratio(0.5625));
    assert_eq!(swiper.surface().viewport_height().map(|h| h.raw()), Some(169));

    swiper.surface_mut().set_viewport_width(640.0);
    swiper.resize();
    assert_eq!(swiper.surface().viewport_height().map(|h| h.raw()), Some(360));
}

#[test]
fn vertical_scroll_never_moves_the_strip() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());
    let t0 = Instant::now();

    swiper.handle_pointer(&PointerEvent::down(
        t0,
        PointerKind::Touch,
        PointerPosition::new(150.0, 300.0),
    ));
    let response = swiper.handle_pointer(&PointerEvent::moved(
        t0,
        PointerKind::Touch,
        PointerPosition::new(145.0, 200.0),
    ));
    assert!(!response.prevent_default);
    swiper.handle_pointer(&PointerEvent::moved(
        t0,
        PointerKind::Touch,
        PointerPosition::new(0.0, 190.0),
    ));
    let released = swiper.handle_pointer(&PointerEvent::up(t0, PointerKind::Touch));

    assert!(!released.suppress_next_click);
    assert_eq!(swiper.surface().history().len(), 1);
    assert!(!swiper.has_pending_transition());
    assert!(page_events(&log).is_empty());
    assert!(!swiper.surface().has_class(ClassTarget::Viewport, "swiper-dragging"));
}

#[test]
fn tap_neither_moves_nor_suppresses_click() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());
    let t0 = Instant::now();

    swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Mouse, at(100.0)));
    let released = swiper.handle_pointer(&PointerEvent::up(t0, PointerKind::Mouse));

    assert!(!released.suppress_next_click);
    assert!(!swiper.has_pending_transition());
    let log = log.lock().expect("log lock");
    assert!(matches!(log.first(), Some(SwiperEvent::DragStart { .. })));
    assert!(matches!(
        log.last(),
        Some(SwiperEvent::DragEnd {
            cancelled: false,
            ..
        })
    ));
    assert_eq!(log.len(), 2);
}

#[test]
fn multi_touch_reverts_an_active_swipe() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default().start_index(1));
    let t0 = Instant::now();

    swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Touch, at(250.0)));
    swiper.handle_pointer(&PointerEvent::moved(t0, PointerKind::Touch, at(100.0)));
    assert_eq!(swiper.surface().strip_offset(), -450.0);

    swiper.handle_pointer(&PointerEvent::moved_with_contacts(
        t0,
        PointerKind::Touch,
        at(90.0),
        2,
    ));
    assert_eq!(swiper.surface().strip_offset(), -300.0);
    assert!(!swiper.surface().has_class(ClassTarget::Body, "swiper-body-dragging"));

    swiper.handle_pointer(&PointerEvent::up(
        t0 + Duration::from_millis(600),
        PointerKind::Touch,
    ));
    assert_eq!(swiper.current_index(), 1);
    finish_transition(&mut swiper);
    assert_eq!(
        page_events(&log),
        vec![SwiperEvent::TransitionEnd { index: 1 }]
    );
}

#[test]
fn drag_during_settle_takes_over_the_transition() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());
    swiper.next(None);
    let superseded = swiper.surface().last_transition().expect("first move").token;

    let t0 = Instant::now();
    swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Touch, at(200.0)));
    swiper.handle_pointer(&PointerEvent::moved(t0, PointerKind::Touch, at(100.0)));
    swiper.handle_transition_end(superseded);
    assert!(
        page_events(&log)
            .iter()
            .all(|event| !matches!(event, SwiperEvent::TransitionEnd { .. }))
    );

    swiper.handle_pointer(&PointerEvent::up(
        t0 + Duration::from_millis(500),
        PointerKind::Touch,
    ));
    finish_transition(&mut swiper);
    assert_eq!(
        page_events(&log),
        vec![
            SwiperEvent::PageChange { index: 1 },
            SwiperEvent::PageChange { index: 2 },
            SwiperEvent::TransitionEnd { index: 2 },
        ]
    );
}

#[test]
fn escape_cancels_without_paging() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());
    let t0 = Instant::now();

    swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Mouse, at(280.0)));
    swiper.handle_pointer(&PointerEvent::moved(t0, PointerKind::Mouse, at(20.0)));
    swiper.handle_pointer(&PointerEvent::cancel(t0, PointerKind::Mouse, CancelReason::Escape));
    swiper.handle_pointer(&PointerEvent::cancel(t0, PointerKind::Mouse, CancelReason::FocusLost));

    assert_eq!(swiper.current_index(), 0);
    swiper.tick(t0 + Duration::from_secs(1));
    let drag_ends = log
        .lock()
        .expect("log lock")
        .iter()
        .filter(|event| matches!(event, SwiperEvent::DragEnd { .. }))
        .count();
    assert_eq!(drag_ends, 1);
    assert_eq!(
        page_events(&log),
        vec![SwiperEvent::TransitionEnd { index: 0 }]
    );
}

#[test]
fn disabled_modalities_are_ignored() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default().disable_mouse(true));
    drag(&mut swiper, PointerKind::Mouse, 280.0, 20.0, Duration::from_millis(100));
    assert_eq!(swiper.current_index(), 0);
    assert!(log.lock().expect("log lock").is_empty());
}

#[test]
fn disabled_touch_leaves_mouse_working() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default().disable_touch(true));

    drag(&mut swiper, PointerKind::Touch, 280.0, 20.0, Duration::from_millis(100));
    assert_eq!(swiper.current_index(), 0);
    assert!(log.lock().expect("log lock").is_empty());
    assert!(!swiper.is_dragging());

    drag(&mut swiper, PointerKind::Mouse, 280.0, 20.0, Duration::from_millis(100));
    assert_eq!(swiper.current_index(), 1);
}

#[test]
fn resize_during_swipe_keeps_the_finger_offset() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());
    let t0 = Instant::now();

    swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Touch, at(250.0)));
    swiper.handle_pointer(&PointerEvent::moved(t0, PointerKind::Touch, at(150.0)));
    assert_eq!(swiper.surface().strip_offset(), -100.0);

    swiper.surface_mut().set_viewport_width(400.0);
    swiper.resize();
    assert_eq!(swiper.page_width().raw(), 400);
    assert_eq!(swiper.surface().strip_offset(), -100.0);
    assert_eq!(swiper.surface().last_transition(), None);
    assert_eq!(swiper.phase(), SwiperPhase::Dragging);

    swiper.handle_pointer(&PointerEvent::moved(t0, PointerKind::Touch, at(50.0)));
    assert_eq!(swiper.surface().strip_offset(), -200.0);
    swiper.handle_pointer(&PointerEvent::up(
        t0 + Duration::from_millis(100),
        PointerKind::Touch,
    ));

    assert_eq!(swiper.current_index(), 1);
    assert_eq!(swiper.surface().strip_offset(), -400.0);
    let settle = swiper.surface().last_transition().expect("settle");
    assert_eq!(settle.duration, Duration::from_millis(150));
    finish_transition(&mut swiper);
    assert_eq!(
        page_events(&log),
        vec![
            SwiperEvent::PageChange { index: 1 },
            SwiperEvent::TransitionEnd { index: 1 },
        ]
    );
}

#[test]
fn long_running_drags_keep_surface_history_bounded() {
    let (mut swiper, _log) = swiper_with(3, SwiperArgs::default());
    let t0 = Instant::now();

    for _ in 0..200 {
        swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Touch, at(200.0)));
        for step in 0..100 {
            swiper.handle_pointer(&PointerEvent::moved(
                t0,
                PointerKind::Touch,
                at(200.0 - step as f32),
            ));
        }
        swiper.handle_pointer(&PointerEvent::cancel(
            t0,
            PointerKind::Touch,
            CancelReason::Platform,
        ));
    }

    assert_eq!(swiper.surface().history().len(), HISTORY_LIMIT);
    assert_eq!(swiper.current_index(), 0);
    assert_eq!(swiper.surface().strip_offset(), 0.0);
}

#[test]
fn removed_listener_stops_receiving() {
    let mut swiper = Swiper::new(HeadlessSurface::new(300.0), 3, SwiperArgs::default());
    let hits: Arc<Mutex<usize>> = Arc::default();
    let counter = hits.clone();
    let id = swiper.on(EventKind::PageChange, move |_| {
        *counter.lock().expect("counter lock") += 1;
    });

    swiper.next(Some(Duration::ZERO));
    assert!(swiper.off(id));
    assert!(!swiper.off(id));
    swiper.next(Some(Duration::ZERO));

    assert_eq!(*hits.lock().expect("counter lock"), 1);
    assert_eq!(swiper.current_index(), 2);
}

#[test]
fn frame_driven_hosts_complete_through_tick() {
    let (mut swiper, log) = swiper_with(5, SwiperArgs::default());
    let released = drag(&mut swiper, PointerKind::Touch, 290.0, 140.0, Duration::from_millis(400));

    swiper.tick(released);
    assert!(swiper.has_pending_transition());
    swiper.tick(released + Duration::from_millis(150));
    assert!(!swiper.has_pending_transition());
    assert_eq!(
        page_events(&log),
        vec![
            SwiperEvent::PageChange { index: 1 },
            SwiperEvent::TransitionEnd { index: 1 },
        ]
    );
}
