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

//! the one-shot pass prediction sequence: resolve the observer location, request the next passes
//! for it and show them. Nothing in here is retried.

use tracing::{info,warn};

use crate::{
    Coordinate,
    backend::{IssBackend,PassResponse},
    errors::{Result,OdinIssError},
    geolocation::LocationResolver,
    scene::IssView,
    status::StatusTracker,
};

pub const WAITING_FOR_LOCATION: &str = "waiting for location...";
pub const COMPUTING_PASSES: &str = "computing nearby passes...";
pub const LOCATION_DENIED: &str = "location access denied";
pub const LOCATION_UNAVAILABLE: &str = "location unavailable";
pub const NO_PASSES_FOUND: &str = "no passes found";
pub const SERVER_UNREACHABLE: &str = "server unreachable";

pub fn passes_ready_message (n: usize)->String {
    format!("next {} passes ready", n)
}

/// run the whole sequence. The status tracker always ends in `Ok` or `Error` state, the returned
/// error is only for diagnostics
pub async fn run_pass_prediction (resolver: &LocationResolver, backend: &dyn IssBackend, view: &dyn IssView,
                                  status: &StatusTracker, max_passes: usize)->Result<Vec<String>> {
    status.set_waiting( WAITING_FOR_LOCATION);

    match resolver.resolve().await {
        Ok(location) => {
            view.show_location_source( &format!("{} location", location.source));
            request_passes( location.coordinate, backend, view, status, max_passes).await
        }
        Err(e) => {
            warn!("no observer location: {}", e);
            view.show_location_source( LOCATION_UNAVAILABLE);
            status.set_error( LOCATION_DENIED);
            Err(e)
        }
    }
}

/// request and show the passes for a known observer location
pub async fn request_passes (observer: Coordinate, backend: &dyn IssBackend, view: &dyn IssView,
                             status: &StatusTracker, max_passes: usize)->Result<Vec<String>> {
    status.set_waiting( COMPUTING_PASSES);
    view.clear_passes();

    let result = backend.predict_passes( observer).await.and_then( |response| evaluate_pass_response( response, max_passes));
    match result {
        Ok(passes) => {
            info!("{} passes for observer {}", passes.len(), observer);
            view.show_passes( &passes);
            status.set_ok( passes_ready_message( passes.len()));
            Ok(passes)
        }
        Err(e) => {
            warn!("pass prediction failed: {}", e);
            match &e {
                OdinIssError::NoPassesFound(msg) => status.set_error( msg.as_str()),
                _ => status.set_error( SERVER_UNREACHABLE)
            }
            Err(e)
        }
    }
}

/// turn a backend response into the list of passes to show, or a `NoPassesFound` error with the message
/// to display. A `max_passes` of 0 means no limit
pub fn evaluate_pass_response (response: PassResponse, max_passes: usize)->Result<Vec<String>> {
    if response.ok && !response.passes.is_empty() {
        let mut passes = response.passes;
        if max_passes > 0 && passes.len() > max_passes {
            warn!("backend returned {} passes, showing first {}", passes.len(), max_passes);
            passes.truncate( max_passes);
        }
        Ok(passes)

    } else {
        let msg = response.message
            .filter( |m| !m.trim().is_empty())
            .unwrap_or_else( || NO_PASSES_FOUND.to_string());
        Err( OdinIssError::NoPassesFound(msg))
    }
}
