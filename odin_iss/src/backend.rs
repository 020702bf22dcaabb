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

use async_trait::async_trait;
use reqwest::{Client, Response, header::{HeaderValue,CONTENT_TYPE}};
use serde::{Serialize,Deserialize,de::DeserializeOwned};
use tracing::debug;

use crate::{
    BackendConfig, Coordinate, CrewRoster, OrbitPoint, PositionSample,
    errors::{Result,network_failure}
};

/// what we get back from a pass prediction request. Non-ok responses are not errors at this level since
/// they can carry a server message that has to be shown
#[derive(Debug,Clone,PartialEq,Default)]
pub struct PassResponse {
    pub ok: bool,
    pub passes: Vec<String>,
    pub message: Option<String>,
}

impl PassResponse {
    pub fn ok (passes: Vec<String>)->Self { PassResponse { ok: true, passes, message: None } }
    pub fn failed (message: Option<String>)->Self { PassResponse { ok: false, passes: Vec::new(), message } }
}

#[derive(Debug,Deserialize,Default)]
struct PassBody {
    #[serde(default)]
    passes: Vec<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug,Deserialize)]
struct OrbitPathBody {
    #[serde(default)]
    points: Vec<OrbitPoint>,
}

/// the backend we poll. Implementations only report what they get - status handling is up to the caller
#[async_trait]
pub trait IssBackend: Send + Sync {
    async fn current_position (&self)->Result<PositionSample>;
    async fn crew (&self)->Result<CrewRoster>;
    async fn predict_passes (&self, observer: Coordinate)->Result<PassResponse>;
    async fn orbit_path (&self)->Result<Vec<OrbitPoint>>;
}

pub struct HttpIssBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpIssBackend {
    pub fn new (client: Client, config: BackendConfig)->Self {
        HttpIssBackend { client, config }
    }


    async fn get_json<T> (&self, path: &str)->Result<T> where T: DeserializeOwned {
        let url = self.config.url( path);
        let response = self.client.get( &url).send().await?;
        let status = response.status();
        if status.is_success() {
            from_json( response).await
        } else {
            Err( network_failure!("{} response status {}", url, status))
        }
    }
}

#[async_trait]
impl IssBackend for HttpIssBackend {
    async fn current_position (&self)->Result<PositionSample> {
        let sample: PositionSample = self.get_json( &self.config.position_path).await?;
        sample.validated()
    }

    async fn crew (&self)->Result<CrewRoster> {
        self.get_json( &self.config.crew_path).await
    }

    async fn predict_passes (&self, observer: Coordinate)->Result<PassResponse> {
        let url = self.config.url( &self.config.predict_path);
        let response = self.client.post( &url)
            .header( CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json( &observer)
            .send().await?;

        let status = response.status();
        if status.is_success() {
            let body: PassBody = from_json( response).await?;
            Ok( PassResponse { ok: true, passes: body.passes, message: body.message })

        } else {
            // error responses might not be JSON at all, in which case there is just no server message
            let bytes = response.bytes().await?;
            let body: PassBody = serde_json::from_slice( &bytes).unwrap_or_default();
            debug!("pass prediction response status {}", status);
            Ok( PassResponse::failed( body.message))
        }
    }

    async fn orbit_path (&self)->Result<Vec<OrbitPoint>> {
        let body: OrbitPathBody = self.get_json( &self.config.orbit_path).await?;
        Ok( body.points )
    }
}

pub async fn from_json<T> (response: Response)->Result<T> where T: DeserializeOwned {
    let bytes = response.bytes().await?;
    Ok( serde_json::from_slice( &bytes)? )
}
