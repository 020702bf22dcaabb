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

//! odin_iss is a live tracking client for the International Space Station. It polls a backend for the current
//! ISS position and crew roster, keeps a bounded trail of recent positions, resolves the observer location through
//! a fallback chain and requests the next overhead passes for it. Rendering is delegated to an external view
//! that receives declarative scene updates (see [scene::IssView]).

use std::{fmt, path::Path, time::Duration};
use serde::{Serialize,Deserialize,Deserializer};
use chrono::{DateTime,NaiveDateTime,Utc};
use tracing::debug;
use uom::si::{f64::Length, length::kilometer};

pub mod errors;
use errors::{Result,OdinIssError,malformed};

pub mod trail;
pub mod status;
pub mod geolocation;
pub mod backend;
pub mod scene;
pub mod orchestrator;
pub mod pass_flow;

/// mean earth radius in km. Backend altitudes are fractions of it
pub const MEAN_EARTH_RADIUS_KM: f64 = 6371.0;

/// max number of trail segments we keep (with 3sec polling this is the last 4.5 min of the orbit)
pub const MAX_TRAIL_SEGMENTS: usize = 90;

/// the backend is supposed to return the next 3 passes
pub const MAX_PASSES: usize = 3;

#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }

/* #region data model ***********************************************************************************************/

/// a geodetic position in degrees
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new (lat: f64, lng: f64)->Self { Coordinate { lat, lng } }

    pub fn is_valid (&self)->bool {
        self.lat.is_finite() && self.lng.is_finite() && (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// out of range coordinates are rejected, not clamped
    pub fn validated (self)->Result<Self> {
        if self.is_valid() { Ok(self) } else { Err( malformed!("coordinate out of range: {}", self)) }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "({:.4}°, {:.4}°)", self.lat, self.lng)
    }
}

/// what we get from each position poll. `alt` is normalized to the mean earth radius
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct PositionSample {
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
}

impl PositionSample {
    pub fn new (lat: f64, lng: f64, alt: f64)->Self { PositionSample { lat, lng, alt } }

    pub fn coordinate (&self)->Coordinate { Coordinate::new( self.lat, self.lng) }

    pub fn altitude (&self)->Length {
        Length::new::<kilometer>( self.alt * MEAN_EARTH_RADIUS_KM)
    }

    pub fn validated (self)->Result<Self> {
        self.coordinate().validated()?;
        if self.alt.is_finite() && self.alt >= 0.0 { Ok(self) } else { Err( malformed!("invalid altitude: {}", self.alt)) }
    }
}

impl fmt::Display for PositionSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "PositionSample( lat: {:.2}, lng: {:.2}, alt: {:.0}km )", self.lat, self.lng, self.altitude().get::<kilometer>())
    }
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct CrewMember {
    pub name: String,
    pub craft: String,
    #[serde(rename="photoUrl", alias="photo", default)]
    pub photo_url: String,
}

/// the full roster as returned by the backend. This always replaces the previous one
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct CrewRoster {
    #[serde(default)]
    pub people: Vec<CrewMember>,

    #[serde(default)]
    pub count: Option<usize>,

    #[serde(rename="updatedAt", alias="updated_at", default, deserialize_with="deserialize_lenient_datetime")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CrewRoster {
    pub fn count (&self)->usize { self.count.unwrap_or( self.people.len()) }
}

/// predicted sub-satellite point of the ISS
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct OrbitPoint {
    pub lat: f64,
    pub lng: f64,
    pub alt: f64,
    #[serde(default, deserialize_with="deserialize_lenient_datetime")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// parse backend timestamps. Besides RFC 3339 we accept the `..+00:00Z` form produced by appending a 'Z' to an
/// offset-aware isoformat, and ISO 8601 without offset (taken as UTC). Returns None for anything else
pub fn parse_lenient_datetime (s: &str)->Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some( dt.with_timezone(&Utc))
    }
    if let Some(s_offset) = s.strip_suffix('Z') && let Ok(dt) = DateTime::parse_from_rfc3339(s_offset) {
        return Some( dt.with_timezone(&Utc))
    }
    match NaiveDateTime::parse_from_str( s, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(ndt) => Some( ndt.and_utc()),
        Err(e) => {
            debug!("ignoring unparseable timestamp {:?}: {}", s, e);
            None
        }
    }
}

/// timestamps are informational only, a bad one must not invalidate the whole record
fn deserialize_lenient_datetime<'de,D> (deserializer: D)->std::result::Result<Option<DateTime<Utc>>,D::Error> where D: Deserializer<'de> {
    let s: Option<String> = Option::deserialize( deserializer)?;
    Ok( s.as_deref().and_then( parse_lenient_datetime))
}

/* #endregion data model */

/* #region configuration ********************************************************************************************/

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct IssConfig {
    pub backend: BackendConfig,
    pub position_interval: Duration, // position feed polling interval
    pub crew_interval: Duration, // crew roster polling interval
    pub max_trail: usize, // max number of trail segments to keep
    pub max_passes: usize, // max number of passes to show (0 means no limit)
    pub predict_passes: bool, // run the pass prediction on startup
    pub show_orbit_path: bool, // retrieve and show the predicted orbit on startup
    pub geolocation: GeolocationConfig,
}

impl Default for IssConfig {
    fn default()->Self {
        IssConfig {
            backend: BackendConfig::default(),
            position_interval: secs(3),
            crew_interval: minutes(5),
            max_trail: MAX_TRAIL_SEGMENTS,
            max_passes: MAX_PASSES,
            predict_passes: true,
            show_orbit_path: false,
            geolocation: GeolocationConfig::default(),
        }
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub position_path: String,
    pub crew_path: String,
    pub predict_path: String,
    pub orbit_path: String,
    pub request_timeout: Duration, // applies to each backend and geolocation request
}

impl Default for BackendConfig {
    fn default()->Self {
        BackendConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            position_path: "/current-position".to_string(),
            crew_path: "/crew".to_string(),
            predict_path: "/predict-pass".to_string(),
            orbit_path: "/orbit-path".to_string(),
            request_timeout: secs(10),
        }
    }
}

impl BackendConfig {
    pub fn url (&self, path: &str)->String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

#[derive(Deserialize,Serialize,Debug,Clone)]
#[serde(default)]
pub struct GeolocationConfig {
    pub service_url: String, // the primary (network) geolocation service
    pub api_key: String, // empty means we skip the primary service
    pub device: DeviceConfig,
    pub timeout: Duration, // max wait for a device position
    pub high_accuracy: bool,
}

impl Default for GeolocationConfig {
    fn default()->Self {
        GeolocationConfig {
            service_url: "https://www.googleapis.com/geolocation/v1/geolocate".to_string(),
            api_key: String::new(),
            device: DeviceConfig::Unavailable,
            timeout: secs(8),
            high_accuracy: true,
        }
    }
}

/// where the device position comes from
#[derive(Deserialize,Serialize,Debug,Clone,PartialEq)]
pub enum DeviceConfig {
    Unavailable,
    Gpsd { addr: String },
    Fixed { lat: f64, lng: f64 },
}

pub fn load_config (path: impl AsRef<Path>)->Result<IssConfig> {
    let input = std::fs::read_to_string( path)?;
    Ok( ron::from_str(&input)? )
}

/* #endregion configuration */
