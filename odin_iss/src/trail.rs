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

use std::collections::VecDeque;
use serde::ser::{Serialize,Serializer,SerializeStruct};
use crate::{Coordinate, PositionSample, MAX_TRAIL_SEGMENTS};

/// the great circle segment between two consecutive position samples
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct TrailSegment {
    pub start: Coordinate,
    pub end: Coordinate,
}

impl TrailSegment {
    pub fn new (start: Coordinate, end: Coordinate)->Self { TrailSegment { start, end } }
}

// this is the flat arc format the globe renderer expects
impl Serialize for TrailSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let mut state = serializer.serialize_struct("TrailSegment", 4)?;
        state.serialize_field("startLat", &self.start.lat)?;
        state.serialize_field("startLng", &self.start.lng)?;
        state.serialize_field("endLat", &self.end.lat)?;
        state.serialize_field("endLng", &self.end.lng)?;
        state.end()
    }
}

/// bounded, temporally ordered trail of the most recent position segments.
/// The first sample only sets the baseline, each subsequent one adds a segment from the previous sample.
/// Once we exceed `max_segments` the oldest segments get dropped. There is no reset - the trail only grows and evicts
#[derive(Debug)]
pub struct TrailBuffer {
    segments: VecDeque<TrailSegment>, // used as a ringbuffer
    last: Option<Coordinate>,
    max_segments: usize,
}

impl TrailBuffer {
    pub fn new (max_segments: usize)->Self {
        TrailBuffer { segments: VecDeque::with_capacity(max_segments+1), last: None, max_segments }
    }

    /// returns the new segment if there was a previous sample
    pub fn append (&mut self, sample: &PositionSample)->Option<TrailSegment> {
        let p = sample.coordinate();

        let segment = self.last.map( |p_last| {
            let segment = TrailSegment::new( p_last, p);
            self.segments.push_back( segment);
            while self.segments.len() > self.max_segments {
                self.segments.pop_front();
            }
            segment
        });

        self.last = Some(p);
        segment
    }

    /// a new Vec with the current segments (oldest first). Subsequent appends never change a returned snapshot
    pub fn snapshot (&self)->Vec<TrailSegment> {
        self.segments.iter().copied().collect()
    }

    pub fn len (&self)->usize { self.segments.len() }
    pub fn is_empty (&self)->bool { self.segments.is_empty() }
    pub fn last_position (&self)->Option<Coordinate> { self.last }
}

impl Default for TrailBuffer {
    fn default()->Self { TrailBuffer::new( MAX_TRAIL_SEGMENTS) }
}
