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

//! observer location resolution. We first try the (optional) network geolocation service and then fall back
//! to the device location. Failures of the primary service are never propagated, whatever their cause.

use std::{fmt, time::Duration};
use async_trait::async_trait;
use chrono::{DateTime,Utc};
use reqwest::Client;
use serde::{Serialize,Deserialize};
use tokio::{io::{AsyncBufReadExt,AsyncWriteExt,BufReader}, net::TcpStream, time};
use tracing::{debug,info,warn};

use crate::{
    Coordinate, DeviceConfig, GeolocationConfig, secs,
    errors::{Result,OdinIssError,network_failure,malformed,location_unavailable,op_failed}
};

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum LocationSource {
    PrimaryService,
    DeviceSensor,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSource::PrimaryService => write!(f, "network"),
            LocationSource::DeviceSensor => write!(f, "device"),
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub source: LocationSource,
}

/// options for device position requests
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration, // zero means we don't accept any cached reading
}

impl Default for PositionOptions {
    fn default()->Self {
        PositionOptions { high_accuracy: true, timeout: secs(8), maximum_age: Duration::ZERO }
    }
}

impl From<&GeolocationConfig> for PositionOptions {
    fn from (config: &GeolocationConfig)->Self {
        PositionOptions { high_accuracy: config.high_accuracy, timeout: config.timeout, maximum_age: Duration::ZERO }
    }
}

/// the network geolocation service that is tried first
#[async_trait]
pub trait PrimaryLocationService: Send + Sync {
    /// without credential the service is skipped
    fn has_credential (&self)->bool;
    async fn locate (&self)->Result<Coordinate>;
}

/// the native location capability of the device we run on
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn current_position (&self, options: &PositionOptions)->Result<Coordinate>;
}

/* #region resolver chain *******************************************************************************************/

pub struct LocationResolver {
    primary: Box<dyn PrimaryLocationService>,
    device: Box<dyn DeviceLocator>,
    options: PositionOptions,
}

impl LocationResolver {
    pub fn new (primary: Box<dyn PrimaryLocationService>, device: Box<dyn DeviceLocator>, options: PositionOptions)->Self {
        LocationResolver { primary, device, options }
    }

    pub fn from_config (client: Client, config: &GeolocationConfig)->Self {
        let primary = Box::new( HttpGeolocationService::new( client, config.service_url.clone(), config.api_key.clone()));
        let device: Box<dyn DeviceLocator> = match &config.device {
            DeviceConfig::Unavailable => Box::new( NoDeviceLocator{}),
            DeviceConfig::Gpsd{addr} => Box::new( GpsdLocator::new( addr.clone())),
            DeviceConfig::Fixed{lat,lng} => Box::new( FixedLocator::new( Coordinate::new(*lat, *lng))),
        };
        LocationResolver::new( primary, device, PositionOptions::from(config))
    }


    /// resolve to exactly one location or fail with `LocationUnavailable`
    pub async fn resolve (&self)->Result<ResolvedLocation> {
        if self.primary.has_credential() {
            match self.primary.locate().await.and_then( |c| c.validated()) {
                Ok(coordinate) => {
                    info!("observer location {} from primary service", coordinate);
                    return Ok( ResolvedLocation{ coordinate, source: LocationSource::PrimaryService })
                }
                Err(e) => warn!("primary location service failed, falling back to device: {}", e)
            }
        } else {
            debug!("no primary location service credential, using device location");
        }

        match time::timeout( self.options.timeout, self.device.current_position( &self.options)).await {
            Ok(Ok(coordinate)) => {
                let coordinate = coordinate.validated().map_err( |e| location_unavailable!("invalid device position: {}", e))?;
                info!("observer location {} from device", coordinate);
                Ok( ResolvedLocation{ coordinate, source: LocationSource::DeviceSensor })
            }
            Ok(Err(e)) => {
                match e {
                    OdinIssError::LocationUnavailable(_) => Err(e),
                    other => Err( location_unavailable!("device location failed: {}", other))
                }
            }
            Err(_) => Err( location_unavailable!("no device position within {:?}", self.options.timeout))
        }
    }
}

/* #endregion resolver chain */

/* #region primary service ******************************************************************************************/

#[derive(Debug,Deserialize)]
struct GeolocateResponse {
    location: Option<Coordinate>,
    accuracy: Option<f64>, // in meters
}

/// a network geolocation service using the Google geolocate protocol: POST with an api key and an empty
/// json body, responding with `{"location": {"lat":..,"lng":..}, "accuracy":..}`
pub struct HttpGeolocationService {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpGeolocationService {
    pub fn new (client: Client, url: String, api_key: String)->Self {
        HttpGeolocationService { client, url, api_key }
    }
}

#[async_trait]
impl PrimaryLocationService for HttpGeolocationService {
    fn has_credential (&self)->bool { !self.api_key.is_empty() }

    async fn locate (&self)->Result<Coordinate> {
        if self.api_key.is_empty() { return Err( op_failed!("no geolocation api key")) }

        let response = self.client.post( &self.url)
            .query( &[("key", self.api_key.as_str())])
            .json( &serde_json::json!({}))
            .send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err( network_failure!("geolocation service response status {}", status))
        }

        let bytes = response.bytes().await?;
        let data: GeolocateResponse = serde_json::from_slice( &bytes)?;
        if let Some(accuracy) = data.accuracy { debug!("geolocation accuracy {:.0}m", accuracy) }

        data.location.ok_or_else( || malformed!("geolocation response without location"))
    }
}

/// for configurations that don't use a primary service
pub struct NoPrimaryService {}

#[async_trait]
impl PrimaryLocationService for NoPrimaryService {
    fn has_credential (&self)->bool { false }
    async fn locate (&self)->Result<Coordinate> { Err( op_failed!("no primary location service")) }
}

/* #endregion primary service */

/* #region device locators ******************************************************************************************/

/// used if we don't have any device location capability
pub struct NoDeviceLocator {}

#[async_trait]
impl DeviceLocator for NoDeviceLocator {
    async fn current_position (&self, _options: &PositionOptions)->Result<Coordinate> {
        Err( location_unavailable!("no device location capability"))
    }
}

/// a stationary observer with a configured position
pub struct FixedLocator {
    coordinate: Coordinate,
}

impl FixedLocator {
    pub fn new (coordinate: Coordinate)->Self { FixedLocator { coordinate } }
}

#[async_trait]
impl DeviceLocator for FixedLocator {
    async fn current_position (&self, _options: &PositionOptions)->Result<Coordinate> {
        Ok( self.coordinate )
    }
}

/// tolerance for the clock difference between GPS report time and our system clock
const GPSD_CLOCK_TOLERANCE: Duration = Duration::from_secs(2);

/// the subset of gpsd JSON reports we need. We only look at "TPV" reports
#[derive(Debug,Deserialize)]
pub struct GpsdReport {
    pub class: String,
    #[serde(default)]
    pub mode: u8, // 0: unknown, 1: no fix, 2: 2D, 3: 3D
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

impl GpsdReport {
    /// the position if this is a TPV report with a fix that satisfies the options
    pub fn position (&self, options: &PositionOptions, now: DateTime<Utc>)->Option<Coordinate> {
        if self.class != "TPV" { return None }

        let min_mode = if options.high_accuracy { 3 } else { 2 };
        if self.mode < min_mode { return None }

        if let Some(t) = self.time {
            let max_age = options.maximum_age + GPSD_CLOCK_TOLERANCE;
            if let Ok(age) = (now - t).to_std() && age > max_age { return None }
        }

        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some( Coordinate::new( lat, lon)),
            _ => None
        }
    }
}

/// device location from a gpsd daemon (see https://gpsd.gitlab.io/gpsd/gpsd_json.html).
/// Each request opens a new connection, enables JSON watch mode and waits for the first suitable TPV report
pub struct GpsdLocator {
    addr: String, // e.g. "127.0.0.1:2947"
}

impl GpsdLocator {
    pub fn new (addr: String)->Self { GpsdLocator { addr } }
}

#[async_trait]
impl DeviceLocator for GpsdLocator {
    async fn current_position (&self, options: &PositionOptions)->Result<Coordinate> {
        let stream = TcpStream::connect( &self.addr).await
            .map_err( |e| location_unavailable!("cannot connect to gpsd at {}: {}", self.addr, e))?;
        let (rx, mut tx) = stream.into_split();

        tx.write_all( b"?WATCH={\"enable\":true,\"json\":true};\n").await?;

        let mut reader = BufReader::new( rx);
        let mut line = String::with_capacity(1024);

        loop {
            line.clear();
            if reader.read_line( &mut line).await? == 0 {
                return Err( location_unavailable!("gpsd closed connection before fix"))
            }

            match serde_json::from_str::<GpsdReport>( line.trim()) {
                Ok(report) => {
                    if let Some(coordinate) = report.position( options, Utc::now()) {
                        return Ok(coordinate)
                    }
                }
                Err(e) => debug!("ignoring gpsd message: {}", e)
            }
        }
    }
}

/* #endregion device locators */
