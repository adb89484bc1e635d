//! Route screen behavior: simulation, arrivals, cancellation, camera follow.

mod fixtures;

use std::ops::ControlFlow;
use std::time::Duration;

use courier_route::camera::MarkerFill;
use courier_route::error::{CourierError, TrackerError};
use courier_route::haversine::ProximityMetric;
use courier_route::models::{CancelReason, Coordinate, DeliveryPoint, DeliveryStatus};
use courier_route::polyline::Polyline;
use courier_route::route_fetch::{FetchedRoute, fetch_route};
use courier_route::session::{RouteSession, ScreenScope, SimulationEnd, TickOutcome, run_simulation};

use fixtures::{Answer, BASE, BRAZ_CUBAS, CENTRO, RecordingMap, ScriptedDirections, ScriptedGeocoder, straight_path};

// ============================================================================
// Helpers
// ============================================================================

fn five_point_route() -> Vec<Coordinate> {
    (0..5)
        .map(|i| Coordinate::new(-23.51440 - i as f64 * 0.001, -46.18743))
        .collect()
}

fn delivery(id: u32, coordinate: Coordinate) -> DeliveryPoint {
    DeliveryPoint {
        address_id: id,
        input_index: id as usize,
        coordinate,
    }
}

fn fetched(path: Vec<Coordinate>, deliveries: Vec<DeliveryPoint>) -> FetchedRoute {
    FetchedRoute {
        path: Polyline::new(path),
        instructions: vec!["Siga em frente".to_string(), "Vire à esquerda".to_string()],
        deliveries,
        dropped: Vec::new(),
    }
}

fn session_for(path: Vec<Coordinate>, deliveries: Vec<DeliveryPoint>) -> RouteSession {
    RouteSession::simulated(fetched(path, deliveries), ProximityMetric::default())
}

// ============================================================================
// Simulation
// ============================================================================

#[test]
fn delivery_on_route_is_visited_after_reaching_it() {
    let route = five_point_route();
    let mut session = session_for(route.clone(), vec![delivery(1, route[3])]);
    let mut map = RecordingMap::default();

    for _ in 0..2 {
        session.tick(&mut map);
    }
    assert_eq!(session.status(0), Some(DeliveryStatus::Pending));

    let outcome = session.tick(&mut map);
    assert_eq!(
        outcome,
        TickOutcome::Moved {
            position: route[3],
            reached: vec![0]
        }
    );
    assert_eq!(session.status(0), Some(DeliveryStatus::Visited));

    assert!(matches!(session.tick(&mut map), TickOutcome::Moved { .. }));
    assert_eq!(session.tick(&mut map), TickOutcome::Finished);
    assert_eq!(session.tick(&mut map), TickOutcome::Finished);
    assert_eq!(session.cursor(), 4);
    assert_eq!(session.status(0), Some(DeliveryStatus::Visited));
    assert!(session.is_ready_to_finish());
}

#[test]
fn cursor_never_decreases_or_overruns() {
    let route = five_point_route();
    let mut session = session_for(route.clone(), Vec::new());
    let mut map = RecordingMap::default();
    let mut previous = session.cursor();

    for _ in 0..12 {
        session.tick(&mut map);
        assert!(session.cursor() >= previous);
        assert!(session.cursor() < route.len());
        previous = session.cursor();
    }
    assert_eq!(session.position(), Some(route[4]));
}

#[test]
fn starting_point_does_not_count_as_arrival() {
    let route = five_point_route();
    let mut session = session_for(route.clone(), vec![delivery(1, route[0])]);
    let mut map = RecordingMap::default();

    // Only positions reached by moving are checked; the route then moves away.
    while session.tick(&mut map) != TickOutcome::Finished {}
    assert_eq!(session.status(0), Some(DeliveryStatus::Pending));
}

#[test]
fn empty_route_never_starts() {
    let mut session = session_for(Vec::new(), vec![delivery(1, BASE.coordinate())]);
    let mut map = RecordingMap::default();
    let scope = ScreenScope::new();
    let mut ticks = 0;

    let end = run_simulation(&mut session, &mut map, &scope, Duration::ZERO, |_, _, _| {
        ticks += 1;
        ControlFlow::Continue(())
    });

    assert_eq!(end, SimulationEnd::NotStarted);
    assert_eq!(ticks, 0);
    assert!(map.moves.is_empty());
    assert_eq!(session.frame().vehicle, None);
}

#[test]
fn run_loop_completes_at_end_of_route() {
    let route = five_point_route();
    let mut session = session_for(route.clone(), vec![delivery(1, route[2]), delivery(2, route[4])]);
    let mut map = RecordingMap::default();
    let scope = ScreenScope::new();
    let mut ticks = 0;

    let end = run_simulation(&mut session, &mut map, &scope, Duration::ZERO, |_, _, _| {
        ticks += 1;
        ControlFlow::Continue(())
    });

    assert_eq!(end, SimulationEnd::Completed);
    // Four moves plus the tick that detects the end.
    assert_eq!(ticks, 5);
    assert_eq!(session.tracker().visited_count(), 2);
    assert_eq!(map.last_center(), Some(route[4]));
}

#[test]
fn closed_scope_stops_the_loop() {
    let route = five_point_route();
    let mut session = session_for(route, Vec::new());
    let mut map = RecordingMap::default();
    let scope = ScreenScope::new();
    let handle = scope.clone();

    let end = run_simulation(&mut session, &mut map, &scope, Duration::ZERO, |session, _, _| {
        if session.cursor() == 2 {
            handle.close();
        }
        ControlFlow::Continue(())
    });

    assert_eq!(end, SimulationEnd::ScopeClosed);
    assert_eq!(session.cursor(), 2);
}

#[test]
fn replacing_the_route_stops_the_old_loop() {
    let route = five_point_route();
    let mut session = session_for(route, Vec::new());
    let mut map = RecordingMap::default();
    let scope = ScreenScope::new();
    let replacement = straight_path(BASE.coordinate(), CENTRO[0].coordinate(), 3);

    let end = run_simulation(&mut session, &mut map, &scope, Duration::ZERO, |session, _, _| {
        if session.cursor() == 1 {
            session.replace_route(fetched(replacement.clone(), Vec::new()));
        }
        ControlFlow::Continue(())
    });

    assert_eq!(end, SimulationEnd::RouteReplaced);
    assert_eq!(session.route_version(), 1);
    assert_eq!(session.cursor(), 0);
    assert!(session.can_start());
}

#[test]
fn replacing_the_route_on_the_last_tick_is_not_completion() {
    let route = five_point_route();
    let mut session = session_for(route, Vec::new());
    let mut map = RecordingMap::default();
    let scope = ScreenScope::new();
    let replacement = straight_path(BASE.coordinate(), CENTRO[0].coordinate(), 3);

    let end = run_simulation(&mut session, &mut map, &scope, Duration::ZERO, |session, _, outcome| {
        if *outcome == TickOutcome::Finished {
            session.replace_route(fetched(replacement.clone(), Vec::new()));
        }
        ControlFlow::Continue(())
    });

    assert_eq!(end, SimulationEnd::RouteReplaced);
    assert_eq!(session.route_version(), 1);
    assert!(session.can_start());
}

#[test]
fn caller_can_stop_the_loop() {
    let mut session = session_for(five_point_route(), Vec::new());
    let mut map = RecordingMap::default();
    let scope = ScreenScope::new();

    let end = run_simulation(&mut session, &mut map, &scope, Duration::ZERO, |_, _, _| ControlFlow::Break(()));

    assert_eq!(end, SimulationEnd::Stopped);
    assert_eq!(session.cursor(), 1);
}

#[test]
fn results_after_close_are_stale() {
    let scope = ScreenScope::new();
    assert_eq!(scope.deliver(7).unwrap(), 7);

    scope.clone().close();
    assert!(!scope.is_active());
    assert!(matches!(scope.deliver(7), Err(CourierError::Stale)));
}

// ============================================================================
// Delivery state
// ============================================================================

#[test]
fn ready_only_when_every_stop_is_closed() {
    let route = straight_path(BASE.coordinate(), CENTRO[2].coordinate(), 40);
    let deliveries = vec![
        delivery(1, route[10]),
        delivery(2, CENTRO[1].coordinate()),
        delivery(3, route[30]),
    ];
    let mut session = session_for(route, deliveries);
    let mut map = RecordingMap::default();

    session.cancel(1, Some(CancelReason::WrongAddress)).unwrap();
    assert!(!session.is_ready_to_finish());
    assert!(matches!(session.finish(), Err(TrackerError::NotReady { remaining: 2 })));

    while session.tick(&mut map) != TickOutcome::Finished {}

    assert_eq!(session.status(0), Some(DeliveryStatus::Visited));
    assert_eq!(session.status(2), Some(DeliveryStatus::Visited));
    assert!(session.is_ready_to_finish());

    let summary = session.finish().unwrap();
    assert_eq!(summary.visited, 2);
    assert_eq!(summary.cancelled, vec![(2, CancelReason::WrongAddress)]);
}

#[test]
fn cancel_without_reason_or_on_closed_stop_changes_nothing() {
    let route = five_point_route();
    let mut session = session_for(route.clone(), vec![delivery(1, route[1]), delivery(2, BASE.coordinate())]);
    let mut map = RecordingMap::default();
    session.tick(&mut map);

    assert_eq!(session.cancel(1, None), Err(TrackerError::MissingReason));
    assert_eq!(session.status(1), Some(DeliveryStatus::Pending));

    assert_eq!(
        session.cancel(0, Some(CancelReason::CustomerAbsent)),
        Err(TrackerError::AlreadyTerminal(0))
    );
    assert_eq!(session.status(0), Some(DeliveryStatus::Visited));

    session.cancel(1, Some(CancelReason::Other)).unwrap();
    assert_eq!(
        session.cancel(1, Some(CancelReason::PackageLost)),
        Err(TrackerError::AlreadyTerminal(1))
    );
    assert_eq!(session.status(1), Some(DeliveryStatus::Cancelled(CancelReason::Other)));
}

#[test]
fn cancelled_stop_is_not_visited_when_passed() {
    let route = five_point_route();
    let mut session = session_for(route.clone(), vec![delivery(1, route[2])]);
    let mut map = RecordingMap::default();

    session.cancel(0, Some(CancelReason::PackageLost)).unwrap();
    while session.tick(&mut map) != TickOutcome::Finished {}

    assert_eq!(session.status(0), Some(DeliveryStatus::Cancelled(CancelReason::PackageLost)));
    assert!(session.frame().markers.is_empty(), "cancelled markers are hidden");
}

// ============================================================================
// Camera and frame
// ============================================================================

#[test]
fn panning_disables_follow_until_recenter() {
    let route = five_point_route();
    let mut session = session_for(route.clone(), Vec::new());
    let mut map = RecordingMap::default();

    session.tick(&mut map);
    assert_eq!(map.moves.len(), 1);
    assert_eq!(map.last_center(), Some(route[1]));

    session.user_panned();
    assert!(!session.is_following());
    assert!(session.frame().show_recenter_button);
    session.tick(&mut map);
    session.tick(&mut map);
    assert_eq!(map.moves.len(), 1, "camera stays put while the user is panning");

    session.recenter(&mut map);
    assert!(session.is_following());
    assert_eq!(map.moves.len(), 2);
    assert_eq!(map.last_center(), Some(route[3]));
    assert!(!session.frame().show_recenter_button);

    session.tick(&mut map);
    assert_eq!(map.last_center(), Some(route[4]));
}

#[test]
fn frame_reflects_statuses_and_zoom() {
    let route = five_point_route();
    let mut session = session_for(route.clone(), vec![delivery(1, route[1]), delivery(2, BASE.coordinate())]);
    let mut map = RecordingMap::default();

    session.region_changed(0.02);
    session.tick(&mut map);

    let frame = session.frame();
    assert_eq!(frame.vehicle, Some(route[1]));
    assert_eq!(frame.path, route);
    assert_eq!(frame.markers.len(), 2);
    assert_eq!(frame.markers[0].fill, MarkerFill::Filled);
    assert_eq!(frame.markers[1].fill, MarkerFill::Hollow);
    assert_eq!(frame.markers[0].diameter, 24.0);
}

#[test]
fn only_the_first_instruction_is_shown() {
    let route = five_point_route();
    let mut session = session_for(route, Vec::new());
    let mut map = RecordingMap::default();

    assert_eq!(session.current_instruction(), Some("Siga em frente"));
    while session.tick(&mut map) != TickOutcome::Finished {}
    assert_eq!(session.current_instruction(), Some("Siga em frente"));
    assert_eq!(session.instructions().len(), 2);
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn fetched_route_drives_a_full_run() {
    let stops = [CENTRO[0].coordinate(), BRAZ_CUBAS[0].coordinate(), BRAZ_CUBAS[1].coordinate()];
    let mut path = straight_path(BASE.coordinate(), stops[0], 10);
    path.extend(straight_path(stops[0], stops[1], 30).into_iter().skip(1));
    path.extend(straight_path(stops[1], stops[2], 10).into_iter().skip(1));

    let geocoder = ScriptedGeocoder::new()
        .answer(CENTRO[0].name, Answer::Found(stops[0]))
        .answer(BRAZ_CUBAS[0].name, Answer::Found(stops[1]))
        .answer(BRAZ_CUBAS[1].name, Answer::Found(stops[2]))
        .answer("Rua Inexistente, 0", Answer::NotFound);
    let directions = ScriptedDirections::route(&path, &["Siga pela <b>Av. Cândido Xavier</b>"]);
    let addresses = vec![
        CENTRO[0].address(1),
        fixtures::Location::new("Rua Inexistente, 0", 0.0, 0.0).address(2),
        BRAZ_CUBAS[0].address(3),
        BRAZ_CUBAS[1].address(4),
    ];
    let geocode = courier_route::config::GeocodeConfig {
        locality_suffix: None,
        latitude_offset: 0.00003,
    };

    let scope = ScreenScope::new();
    let route = fetch_route(&geocoder, &directions, BASE.coordinate(), &addresses, &geocode).unwrap();
    let route = scope.deliver(route).unwrap();
    assert_eq!(route.dropped, vec![2]);

    let mut session = RouteSession::simulated(route, ProximityMetric::default());
    assert_eq!(session.current_instruction(), Some("Siga pela Av. Cândido Xavier"));

    let mut map = RecordingMap::default();
    let end = run_simulation(&mut session, &mut map, &scope, Duration::ZERO, |_, _, _| ControlFlow::Continue(()));

    assert_eq!(end, SimulationEnd::Completed);
    assert!(session.is_ready_to_finish());
    let summary = session.finish().unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.visited, 3);
    assert!(summary.cancelled.is_empty());
    assert_eq!(session.tracker().progress_label(), "3/3");
}
