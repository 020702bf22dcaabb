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

use std::{fmt, sync::Arc};
use serde::{Serialize,Deserialize};
use tokio::sync::watch;
use crate::pass_flow::WAITING_FOR_LOCATION;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[serde(rename_all="lowercase")]
pub enum StatusState {
    Waiting,
    Ok,
    Error,
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusState::Waiting => write!(f, "waiting"),
            StatusState::Ok => write!(f, "ok"),
            StatusState::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug,Clone,PartialEq,Eq,Serialize,Deserialize)]
pub struct SubsystemStatus {
    pub state: StatusState,
    pub message: String,
}

impl SubsystemStatus {
    pub fn new (state: StatusState, message: impl Into<String>)->Self {
        SubsystemStatus { state, message: message.into() }
    }
}

impl fmt::Display for SubsystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{}: {}", self.state, self.message)
    }
}

/// the independently polled data sources
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[serde(rename_all="lowercase")]
pub enum Feed {
    Position,
    Crew,
    Pass,
}

impl Feed {
    pub const ALL: [Feed;3] = [Feed::Position, Feed::Crew, Feed::Pass];

    pub fn name (&self)->&'static str {
        match self {
            Feed::Position => "position",
            Feed::Crew => "crew",
            Feed::Pass => "pass",
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!( f, "{}", self.name()) }
}

/// status indicator of a single feed. There are no transition rules - any state can follow any other.
/// Consumers get notified through `subscribe()` receivers; setting an identical status is not a change
#[derive(Debug)]
pub struct StatusTracker {
    feed: Feed,
    tx: watch::Sender<SubsystemStatus>,
}

impl StatusTracker {
    pub fn new (feed: Feed, message: impl Into<String>)->Self {
        let (tx,_) = watch::channel( SubsystemStatus::new( StatusState::Waiting, message));
        StatusTracker { feed, tx }
    }

    pub fn feed (&self)->Feed { self.feed }

    pub fn set_status (&self, state: StatusState, message: impl Into<String>) {
        let status = SubsystemStatus::new( state, message);
        self.tx.send_if_modified( |current| {
            if *current != status {
                *current = status;
                true
            } else {
                false
            }
        });
    }

    pub fn set_waiting (&self, message: impl Into<String>) { self.set_status( StatusState::Waiting, message) }
    pub fn set_ok (&self, message: impl Into<String>) { self.set_status( StatusState::Ok, message) }
    pub fn set_error (&self, message: impl Into<String>) { self.set_status( StatusState::Error, message) }

    pub fn status (&self)->SubsystemStatus { self.tx.borrow().clone() }
    pub fn state (&self)->StatusState { self.tx.borrow().state }

    pub fn subscribe (&self)->watch::Receiver<SubsystemStatus> { self.tx.subscribe() }
}

/// the status trackers for all feeds. Trackers are shared with the tasks that update them
#[derive(Debug,Clone)]
pub struct StatusBoard {
    pub position: Arc<StatusTracker>,
    pub crew: Arc<StatusTracker>,
    pub pass: Arc<StatusTracker>,
}

impl StatusBoard {
    pub fn new ()->Self {
        StatusBoard {
            position: Arc::new( StatusTracker::new( Feed::Position, "connecting...")),
            crew: Arc::new( StatusTracker::new( Feed::Crew, "loading crew...")),
            pass: Arc::new( StatusTracker::new( Feed::Pass, WAITING_FOR_LOCATION)),
        }
    }

    pub fn get (&self, feed: Feed)->&Arc<StatusTracker> {
        match feed {
            Feed::Position => &self.position,
            Feed::Crew => &self.crew,
            Feed::Pass => &self.pass,
        }
    }
}

impl Default for StatusBoard {
    fn default()->Self { StatusBoard::new() }
}
