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

use thiserror::Error;
use reqwest;
use serde_json;
use ron;

pub type Result<T> = std::result::Result<T,OdinIssError>;


#[derive(Error,Debug)]
pub enum OdinIssError {

    /// request could not be sent or got a non-ok status
    #[error("network failure {0}")]
    NetworkFailure(String),

    /// response payload is missing expected fields or has out-of-range values
    #[error("malformed response {0}")]
    MalformedResponse(String),

    /// all location sources are exhausted
    #[error("location unavailable {0}")]
    LocationUnavailable(String),

    /// server responded ok but did not predict any passes
    #[error("no passes found {0}")]
    NoPassesFound(String),

    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config RON error {0}")]
    RonError( #[from] ron::error::SpannedError),

    #[error("operation failed {0}")]
    OpFailedError(String)
}

impl From<reqwest::Error> for OdinIssError {
    fn from (e: reqwest::Error)->Self {
        if e.is_decode() {
            OdinIssError::MalformedResponse( e.to_string())
        } else {
            OdinIssError::NetworkFailure( e.to_string())
        }
    }
}

impl From<serde_json::Error> for OdinIssError {
    fn from (e: serde_json::Error)->Self {
        OdinIssError::MalformedResponse( e.to_string())
    }
}

macro_rules! network_failure {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinIssError::NetworkFailure( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use network_failure;

macro_rules! malformed {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinIssError::MalformedResponse( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use malformed;

macro_rules! location_unavailable {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinIssError::LocationUnavailable( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use location_unavailable;

macro_rules! op_failed {
    ($fmt:literal $(, $arg:expr )* ) => {
        crate::errors::OdinIssError::OpFailedError( format!( $fmt $(, $arg)* ))
    };
}
pub (crate) use op_failed;
