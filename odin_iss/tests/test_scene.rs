#![allow(unused)]

/// tests for scene updates and the JSON lines view
/// run with "cargo test --test test_scene -- --nocapture"

use serde_json::{Value,json};
use tokio::{io::{AsyncReadExt,duplex}, task::JoinHandle};
use odin_iss::{
    CrewMember, PositionSample,
    scene::{IssView,JsonLinesView,NO_CREW_DATA,VIEW_QUEUE_LEN,PositionReadout,SceneUpdate,position_updates},
    status::{Feed,StatusState,SubsystemStatus},
    trail::TrailBuffer,
};

async fn messages (view: JsonLinesView, writer_task: JoinHandle<Vec<u8>>)->Vec<Value> {
    drop(view); // ends the writer task
    let output = String::from_utf8( writer_task.await.unwrap()).unwrap();
    println!("{output}");
    output.lines().map( |line| serde_json::from_str(line).unwrap()).collect()
}

#[test]
fn test_position_updates () {
    let sample = PositionSample::new( 12.0, 34.0, 0.0659);
    let mut trail = TrailBuffer::new(90);
    trail.append( &PositionSample::new( 11.0, 33.0, 0.0659));
    trail.append( &sample);

    let updates = position_updates( &sample, trail.snapshot());
    let kinds: Vec<&str> = updates.iter().map( |u| u.kind()).collect();
    assert_eq!( kinds, vec!["points", "rings", "icons", "arcs"]);
    assert!( updates.iter().all( |u| u.len() == 1));
}

#[test]
fn test_position_readout () {
    let readout = PositionReadout::from( &PositionSample::new( 12.3456, -98.7654, 0.0659));
    assert!( (readout.alt_km - 419.8489).abs() < 1e-3); // 0.0659 * 6371 km
    assert_eq!( serde_json::to_value( &readout).unwrap(), json!({"lat": "12.35", "lng": "-98.77", "alt": "420"}));
}

#[tokio::test]
async fn test_json_lines () {
    println!("--- testing JSON lines view");
    let (view, writer_task) = JsonLinesView::spawn( Vec::<u8>::new());

    view.update_scene( SceneUpdate::Points( vec![ PositionSample::new( 1.0, 2.0, 0.06) ]));
    view.show_crew( &[], 0);
    view.show_crew( &[ CrewMember { name: "Jane Doe".into(), craft: "ISS".into(), photo_url: "jane.jpg".into() } ], 7);
    view.show_status( Feed::Position, &SubsystemStatus::new( StatusState::Ok, "connected"));
    view.clear_passes();

    let msgs = messages( view, writer_task).await;
    assert_eq!( msgs.len(), 5);
    assert_eq!( msgs[0], json!({"mod": "odin_iss/odin_iss.js", "points": [{"lat": 1.0, "lng": 2.0, "alt": 0.06}]}));
    assert_eq!( msgs[1]["crew"]["placeholder"], json!(NO_CREW_DATA));
    assert_eq!( msgs[2]["crew"]["count"], json!("7 people"));
    assert_eq!( msgs[2]["crew"]["people"][0]["photoUrl"], json!("jane.jpg"));
    assert!( msgs[2]["crew"].get("placeholder").is_none());
    assert_eq!( msgs[3], json!({"mod": "odin_iss/odin_iss.js", "status": {"feed": "position", "state": "ok", "message": "connected"}}));
    assert_eq!( msgs[4]["passes"], json!([]));
}

#[tokio::test]
async fn test_stalled_consumer () {
    println!("--- testing view with a consumer that does not read");
    let (mut consumer, producer) = duplex(64);
    let (view, writer_task) = JsonLinesView::spawn( producer);

    // nobody reads yet: view calls must not block, excess messages get dropped
    for i in 0..VIEW_QUEUE_LEN + 100 {
        view.show_location_source( &format!("location {i}"));
    }
    drop(view);

    let reader = tokio::spawn( async move {
        let mut output = String::new();
        consumer.read_to_string( &mut output).await.unwrap();
        output
    });
    drop( writer_task.await.unwrap()); // closes the pipe
    let output = reader.await.unwrap();

    let n_lines = output.lines().count();
    println!("received {n_lines} lines");
    assert_eq!( n_lines, VIEW_QUEUE_LEN);
    assert!( output.lines().last().unwrap().contains( &format!("location {}", VIEW_QUEUE_LEN-1)));
}
