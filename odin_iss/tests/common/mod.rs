#![allow(unused)]

/// test doubles shared by the integration tests

use std::sync::{Arc, Mutex, atomic::{AtomicUsize,Ordering}};
use async_trait::async_trait;
use odin_iss::{
    Coordinate, CrewMember, CrewRoster, OrbitPoint, PositionSample,
    backend::{IssBackend,PassResponse},
    errors::{OdinIssError,Result},
    geolocation::{DeviceLocator,PositionOptions,PrimaryLocationService},
    scene::{IssView,PositionReadout,SceneUpdate},
    status::{Feed,SubsystemStatus},
};

#[derive(Debug,Clone,PartialEq)]
pub enum ViewCall {
    Scene(SceneUpdate),
    Position(PositionReadout),
    Crew(Vec<CrewMember>, usize),
    LocationSource(String),
    ClearPasses,
    Passes(Vec<String>),
    Status(Feed, SubsystemStatus),
}

#[derive(Default)]
pub struct RecordingView {
    pub calls: Mutex<Vec<ViewCall>>,
}

impl RecordingView {
    pub fn calls (&self)->Vec<ViewCall> { self.calls.lock().unwrap().clone() }
    pub fn len (&self)->usize { self.calls.lock().unwrap().len() }

    fn push (&self, call: ViewCall) { self.calls.lock().unwrap().push(call) }
}

impl IssView for RecordingView {
    fn update_scene (&self, update: SceneUpdate) { self.push( ViewCall::Scene(update)) }
    fn show_position (&self, readout: &PositionReadout) { self.push( ViewCall::Position(*readout)) }
    fn show_crew (&self, people: &[CrewMember], count: usize) { self.push( ViewCall::Crew(people.to_vec(), count)) }
    fn show_location_source (&self, text: &str) { self.push( ViewCall::LocationSource(text.to_string())) }
    fn clear_passes (&self) { self.push( ViewCall::ClearPasses) }
    fn show_passes (&self, passes: &[String]) { self.push( ViewCall::Passes(passes.to_vec())) }
    fn show_status (&self, feed: Feed, status: &SubsystemStatus) { self.push( ViewCall::Status(feed, status.clone())) }
}

pub fn crew_member (name: &str)->CrewMember {
    CrewMember { name: name.to_string(), craft: "ISS".to_string(), photo_url: format!("https://example.com/{name}.jpg") }
}

/// a backend with canned responses that counts requests
pub struct MockBackend {
    pub position_ok: bool,
    pub crew_ok: bool,
    pub passes: Mutex<Option<PassResponse>>, // None means network failure
    pub position_requests: AtomicUsize,
    pub crew_requests: AtomicUsize,
    pub pass_requests: AtomicUsize,
    pub observers: Mutex<Vec<Coordinate>>,
}

impl MockBackend {
    pub fn new (position_ok: bool, crew_ok: bool, passes: Option<PassResponse>)->Self {
        MockBackend {
            position_ok, crew_ok,
            passes: Mutex::new(passes),
            position_requests: AtomicUsize::new(0),
            crew_requests: AtomicUsize::new(0),
            pass_requests: AtomicUsize::new(0),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub fn position_requests (&self)->usize { self.position_requests.load(Ordering::Relaxed) }
    pub fn crew_requests (&self)->usize { self.crew_requests.load(Ordering::Relaxed) }
    pub fn pass_requests (&self)->usize { self.pass_requests.load(Ordering::Relaxed) }
}

#[async_trait]
impl IssBackend for MockBackend {
    async fn current_position (&self)->Result<PositionSample> {
        let n = self.position_requests.fetch_add( 1, Ordering::Relaxed);
        if self.position_ok {
            Ok( PositionSample::new( 10.0 + n as f64 * 0.1, 20.0 + n as f64 * 0.5, 0.0659))
        } else {
            Err( OdinIssError::NetworkFailure("connection refused".to_string()))
        }
    }

    async fn crew (&self)->Result<CrewRoster> {
        self.crew_requests.fetch_add( 1, Ordering::Relaxed);
        if self.crew_ok {
            let people = vec![ crew_member("Jane Doe"), crew_member("John Roe") ];
            Ok( CrewRoster { people, count: None, updated_at: None })
        } else {
            Err( OdinIssError::MalformedResponse("missing people".to_string()))
        }
    }

    async fn predict_passes (&self, observer: Coordinate)->Result<PassResponse> {
        self.pass_requests.fetch_add( 1, Ordering::Relaxed);
        self.observers.lock().unwrap().push( observer);
        match self.passes.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err( OdinIssError::NetworkFailure("connection refused".to_string()))
        }
    }

    async fn orbit_path (&self)->Result<Vec<OrbitPoint>> {
        Ok( vec![ OrbitPoint { lat: 1.0, lng: 2.0, alt: 0.06, timestamp: None } ])
    }
}

/// primary location service with a fixed outcome
pub struct MockPrimary {
    pub credential: bool,
    pub result: Option<Coordinate>, // None means failure
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl PrimaryLocationService for MockPrimary {
    fn has_credential (&self)->bool { self.credential }

    async fn locate (&self)->Result<Coordinate> {
        self.calls.fetch_add( 1, Ordering::Relaxed);
        self.result.ok_or_else( || OdinIssError::NetworkFailure("geolocation service down".to_string()))
    }
}

/// device locator with a fixed outcome, optionally never responding
pub struct MockDevice {
    pub result: Option<Coordinate>, // None means permission denied
    pub hang: bool,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl DeviceLocator for MockDevice {
    async fn current_position (&self, _options: &PositionOptions)->Result<Coordinate> {
        self.calls.fetch_add( 1, Ordering::Relaxed);
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.result.ok_or_else( || OdinIssError::LocationUnavailable("permission denied".to_string()))
    }
}
