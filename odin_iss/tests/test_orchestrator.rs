#![allow(unused)]

/// tests for the feed polling loops
/// run with "cargo test --test test_orchestrator -- --nocapture"

mod common;

use std::sync::{Arc, atomic::AtomicUsize};
use odin_iss::{
    Coordinate, IssConfig, millis, secs, minutes,
    backend::PassResponse,
    errors::OdinIssError,
    geolocation::{LocationResolver,NoPrimaryService,PositionOptions},
    orchestrator::{self,PollingOrchestrator,PositionFeed,poll_crew,poll_position,show_orbit_path},
    scene::{NO_CREW_DATA,SceneUpdate},
    status::{Feed,StatusBoard,StatusState},
    trail::TrailBuffer,
};
use common::*;

fn position_feed (statuses: &StatusBoard)->PositionFeed {
    PositionFeed::new( TrailBuffer::new(90), statuses.position.clone())
}

#[tokio::test]
async fn test_position_poll () {
    println!("--- testing successful position polls");
    let backend = MockBackend::new( true, true, None);
    let view = RecordingView::default();
    let statuses = StatusBoard::new();
    let mut feed = position_feed( &statuses);

    poll_position( &backend, &view, &mut feed).await.unwrap();
    let calls = view.calls();
    println!("first poll: {calls:?}");
    assert_eq!( statuses.position.state(), StatusState::Ok);
    assert!( matches!( calls[0], ViewCall::Position(_)));
    assert_eq!( calls[4], ViewCall::Scene( SceneUpdate::Arcs( Vec::new()))); // baseline only, no segment yet

    poll_position( &backend, &view, &mut feed).await.unwrap();
    let calls = view.calls();
    match &calls[9] {
        ViewCall::Scene( SceneUpdate::Arcs(segments)) => assert_eq!( segments.len(), 1),
        other => panic!("unexpected view call {other:?}")
    }
    assert_eq!( feed.trail.len(), 1);
}

#[tokio::test]
async fn test_position_failure () {
    println!("--- testing failed position poll");
    let backend = MockBackend::new( false, true, None);
    let view = RecordingView::default();
    let statuses = StatusBoard::new();
    let mut feed = position_feed( &statuses);

    let res = poll_position( &backend, &view, &mut feed).await;
    println!("result: {res:?}, status: {}", statuses.position.status());

    assert!( res.is_err());
    assert_eq!( statuses.position.state(), StatusState::Error);
    assert_eq!( view.len(), 0); // renderer receives no call
    assert!( feed.trail.last_position().is_none());
}

#[tokio::test]
async fn test_crew_poll () {
    println!("--- testing crew polls");
    let view = RecordingView::default();
    let statuses = StatusBoard::new();

    poll_crew( &MockBackend::new( true, true, None), &view, &statuses.crew).await.unwrap();
    let status = statuses.crew.status();
    println!("crew status: {status}");
    assert_eq!( status.state, StatusState::Ok);
    assert!( status.message.starts_with("updated: "));
    match &view.calls()[0] {
        ViewCall::Crew(people,count) => { assert_eq!( people.len(), 2); assert_eq!( *count, 2); }
        other => panic!("unexpected view call {other:?}")
    }

    // failure keeps the previous list
    poll_crew( &MockBackend::new( true, false, None), &view, &statuses.crew).await.ok();
    assert_eq!( statuses.crew.status().message, orchestrator::CREW_ERROR);
    assert_eq!( view.len(), 1);
}

#[tokio::test]
async fn test_orbit_path () {
    let view = RecordingView::default();
    let n = show_orbit_path( &MockBackend::new( true, true, None), &view).await.unwrap();
    assert_eq!( n, 1);
    assert!( matches!( &view.calls()[0], ViewCall::Scene( SceneUpdate::OrbitPath(_))));
}

#[tokio::test(start_paused = true)]
async fn test_polling_loops () {
    println!("--- testing independent polling loops");
    let config = IssConfig { predict_passes: false, ..IssConfig::default() };
    let backend = Arc::new( MockBackend::new( true, false, None)); // crew feed keeps failing
    let view = Arc::new( RecordingView::default());

    let mut orchestrator = PollingOrchestrator::new( config, backend.clone(), view.clone(), None, StatusBoard::new());
    orchestrator.start().unwrap();
    assert!( orchestrator.is_running());

    tokio::time::sleep( millis(9500)).await;
    println!("position requests: {}, crew requests: {}", backend.position_requests(), backend.crew_requests());

    assert_eq!( backend.position_requests(), 4); // at 0,3,6,9 sec
    assert_eq!( backend.crew_requests(), 1);
    assert_eq!( orchestrator.statuses().position.state(), StatusState::Ok);
    assert_eq!( orchestrator.statuses().crew.state(), StatusState::Error);
    assert_eq!( orchestrator.statuses().pass.state(), StatusState::Waiting);

    orchestrator.terminate();
    assert!( !orchestrator.is_running());

    tokio::time::sleep( secs(30)).await;
    assert_eq!( backend.position_requests(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_failing_position_keeps_polling () {
    let config = IssConfig { predict_passes: false, ..IssConfig::default() };
    let backend = Arc::new( MockBackend::new( false, true, None));
    let view = Arc::new( RecordingView::default());

    let mut orchestrator = PollingOrchestrator::new( config, backend.clone(), view.clone(), None, StatusBoard::new());
    orchestrator.start().unwrap();
    tokio::time::sleep( minutes(5) + secs(1)).await;

    assert_eq!( backend.position_requests(), 101); // constant cadence, no backoff
    assert_eq!( backend.crew_requests(), 2);
    assert_eq!( orchestrator.statuses().crew.state(), StatusState::Ok);

    // only crew lists got rendered
    assert!( view.calls().iter().all( |c| matches!( c, ViewCall::Crew(..))));
}

#[tokio::test(start_paused = true)]
async fn test_startup_pass_prediction () {
    println!("--- testing pass prediction at startup");
    let passes: Vec<String> = vec!["A".into(), "B".into(), "C".into()];
    let config = IssConfig::default();
    let backend = Arc::new( MockBackend::new( true, true, Some( PassResponse::ok( passes.clone()))));
    let view = Arc::new( RecordingView::default());
    let device = MockDevice { result: Some( Coordinate::new( 37.4, -122.1)), hang: false, calls: Arc::new( AtomicUsize::new(0)) };
    let resolver = LocationResolver::new( Box::new( NoPrimaryService{}), Box::new(device), PositionOptions::default());

    let mut orchestrator = PollingOrchestrator::new( config, backend.clone(), view.clone(), Some(resolver), StatusBoard::new());
    orchestrator.start().unwrap();
    tokio::time::sleep( secs(10)).await;

    assert_eq!( backend.pass_requests(), 1); // one-shot
    assert_eq!( orchestrator.statuses().get( Feed::Pass).state(), StatusState::Ok);
    assert!( view.calls().contains( &ViewCall::Passes(passes)));
}

#[tokio::test]
async fn test_invalid_start () {
    let config = IssConfig { position_interval: secs(0), ..IssConfig::default() };
    let mut orchestrator = PollingOrchestrator::new( config, Arc::new( MockBackend::new( true, true, None)), Arc::new( RecordingView::default()), None, StatusBoard::new());
    assert!( matches!( orchestrator.start(), Err(OdinIssError::OpFailedError(_))));

    let mut orchestrator = PollingOrchestrator::new( IssConfig::default(), Arc::new( MockBackend::new( true, true, None)), Arc::new( RecordingView::default()), None, StatusBoard::new());
    orchestrator.start().unwrap();
    assert!( orchestrator.start().is_err()); // only once
}
