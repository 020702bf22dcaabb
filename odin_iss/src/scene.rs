/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use serde::{Serialize, ser::{Serializer,SerializeStruct}};
use tokio::{io::{AsyncWrite,AsyncWriteExt}, sync::mpsc, task::{self,JoinHandle}};
use uom::si::length::kilometer;
use tracing::warn;

use crate::{
    CrewMember, OrbitPoint, PositionSample,
    trail::TrailSegment,
    status::{Feed,SubsystemStatus}
};

pub const NO_CREW_DATA: &str = "no crew data available";

/// the renderable collections of the globe. Each update replaces the previous collection of the same kind
#[derive(Debug,Clone,PartialEq)]
pub enum SceneUpdate {
    Points(Vec<PositionSample>),
    Rings(Vec<PositionSample>),
    Icons(Vec<PositionSample>),
    Arcs(Vec<TrailSegment>),
    OrbitPath(Vec<OrbitPoint>),
}

impl SceneUpdate {
    pub fn kind (&self)->&'static str {
        match self {
            SceneUpdate::Points(_) => "points",
            SceneUpdate::Rings(_) => "rings",
            SceneUpdate::Icons(_) => "icons",
            SceneUpdate::Arcs(_) => "arcs",
            SceneUpdate::OrbitPath(_) => "orbitPath",
        }
    }

    pub fn len (&self)->usize {
        match self {
            SceneUpdate::Points(v) | SceneUpdate::Rings(v) | SceneUpdate::Icons(v) => v.len(),
            SceneUpdate::Arcs(v) => v.len(),
            SceneUpdate::OrbitPath(v) => v.len(),
        }
    }
}

/// the scene updates for a new position: the point itself, its ring pulse and icon marker, plus the whole trail
pub fn position_updates (sample: &PositionSample, trail: Vec<TrailSegment>)->[SceneUpdate;4] {
    [
        SceneUpdate::Points( vec![*sample]),
        SceneUpdate::Rings( vec![*sample]),
        SceneUpdate::Icons( vec![*sample]),
        SceneUpdate::Arcs( trail),
    ]
}

/// numeric position display (degrees and km)
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct PositionReadout {
    pub lat: f64,
    pub lng: f64,
    pub alt_km: f64,
}

impl From<&PositionSample> for PositionReadout {
    fn from (sample: &PositionSample)->Self {
        PositionReadout { lat: sample.lat, lng: sample.lng, alt_km: sample.altitude().get::<kilometer>() }
    }
}

impl Serialize for PositionReadout {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut state = serializer.serialize_struct("PositionReadout", 3)?;
        state.serialize_field("lat", &format!("{:.2}", self.lat))?;
        state.serialize_field("lng", &format!("{:.2}", self.lng))?;
        state.serialize_field("alt", &format!("{:.0}", self.alt_km))?;
        state.end()
    }
}

/// the external renderer. All methods replace what was shown before for the respective item.
/// Implementations are shared between feed tasks and hence have to use interior synchronization
pub trait IssView: Send + Sync {
    fn update_scene (&self, update: SceneUpdate);
    fn show_position (&self, readout: &PositionReadout);
    fn show_crew (&self, people: &[CrewMember], count: usize);
    fn show_location_source (&self, text: &str);
    fn clear_passes (&self);
    fn show_passes (&self, passes: &[String]);
    fn show_status (&self, feed: Feed, status: &SubsystemStatus);
}

/* #region JSON message view ****************************************************************************************/

/// serializes as `{"mod": "<crate>/<js_module>", "<payload_name>": <payload>}`, which is the
/// message layout used by our websocket clients
pub struct ViewMsg<T> where T: Serialize {
    pub js_module: &'static str,
    pub payload_name: &'static str,
    pub payload: T
}

impl <T> ViewMsg<T> where T: Serialize {
    pub fn new (payload_name: &'static str, payload: T)->Self {
        ViewMsg { js_module: "odin_iss.js", payload_name, payload }
    }

    pub fn to_json (&self)->serde_json::Result<String> {
        serde_json::to_string( &self)
    }
}

impl <T> Serialize for ViewMsg<T> where T: Serialize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let js_mod_path = format!("{}/{}", env!("CARGO_PKG_NAME"), self.js_module);

        let mut state = serializer.serialize_struct("ViewMsg", 2)?;
        state.serialize_field("mod", &js_mod_path)?;
        state.serialize_field( self.payload_name, &self.payload)?;
        state.end()
    }
}

#[derive(Serialize)]
struct CrewPayload<'a> {
    people: &'a [CrewMember],
    count: String,
    #[serde(skip_serializing_if="Option::is_none")]
    placeholder: Option<&'static str>,
}

#[derive(Serialize)]
struct StatusPayload<'a> {
    feed: Feed,
    #[serde(flatten)]
    status: &'a SubsystemStatus,
}

/// max number of serialized messages waiting for the writer task
pub const VIEW_QUEUE_LEN: usize = 1024;

/// an IssView that writes one JSON message per line, e.g. to stdout from where it can be piped into a renderer.
/// Writing happens in a separate task so that feed tasks never wait for the consumer. If the consumer falls
/// more than `VIEW_QUEUE_LEN` messages behind new messages are dropped
pub struct JsonLinesView {
    tx: mpsc::Sender<String>,
}

impl JsonLinesView {
    /// spawn the writer task. It ends once the view is dropped, returning the writer
    pub fn spawn<W> (writer: W)->(Self, JoinHandle<W>) where W: AsyncWrite + Unpin + Send + 'static {
        let (tx, rx) = mpsc::channel( VIEW_QUEUE_LEN);
        let jh = task::spawn( write_lines( writer, rx));
        (JsonLinesView { tx }, jh)
    }

    fn send_msg<T> (&self, payload_name: &'static str, payload: T) where T: Serialize {
        match ViewMsg::new( payload_name, payload).to_json() {
            Ok(json) => {
                if let Err(e) = self.tx.try_send( json) {
                    warn!("dropped {} message: {}", payload_name, e)
                }
            }
            Err(e) => warn!("failed to serialize {} message: {}", payload_name, e)
        }
    }
}

async fn write_lines<W> (mut writer: W, mut rx: mpsc::Receiver<String>)->W where W: AsyncWrite + Unpin {
    while let Some(line) = rx.recv().await {
        if let Err(e) = write_line( &mut writer, &line).await {
            warn!("failed to write view message: {}", e)
        }
    }
    writer
}

async fn write_line<W> (writer: &mut W, line: &str)->std::io::Result<()> where W: AsyncWrite + Unpin {
    writer.write_all( line.as_bytes()).await?;
    writer.write_all( b"\n").await?;
    writer.flush().await
}

impl IssView for JsonLinesView {
    fn update_scene (&self, update: SceneUpdate) {
        match &update {
            SceneUpdate::Points(v) | SceneUpdate::Rings(v) | SceneUpdate::Icons(v) => self.send_msg( update.kind(), v),
            SceneUpdate::Arcs(v) => self.send_msg( update.kind(), v),
            SceneUpdate::OrbitPath(v) => self.send_msg( update.kind(), v),
        }
    }

    fn show_position (&self, readout: &PositionReadout) {
        self.send_msg( "position", readout)
    }

    fn show_crew (&self, people: &[CrewMember], count: usize) {
        let placeholder = if people.is_empty() { Some(NO_CREW_DATA) } else { None };
        self.send_msg( "crew", CrewPayload { people, count: format!("{} people", count), placeholder })
    }

    fn show_location_source (&self, text: &str) {
        self.send_msg( "locationSource", text)
    }

    fn clear_passes (&self) {
        self.send_msg( "passes", Vec::<String>::new())
    }

    fn show_passes (&self, passes: &[String]) {
        self.send_msg( "passes", passes)
    }

    fn show_status (&self, feed: Feed, status: &SubsystemStatus) {
        self.send_msg( "status", StatusPayload { feed, status })
    }
}

/* #endregion JSON message view */
