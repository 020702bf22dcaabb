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

use std::{sync::Arc, time::Duration};
use chrono::{DateTime,Local,Utc};
use tokio::{task::{self,AbortHandle}, time::{self,MissedTickBehavior}};
use tracing::{debug,info,warn,error};

use crate::{
    IssConfig,
    backend::IssBackend,
    errors::{Result,op_failed},
    geolocation::LocationResolver,
    pass_flow::run_pass_prediction,
    scene::{self,IssView,PositionReadout,SceneUpdate},
    status::{StatusBoard,StatusTracker},
    trail::TrailBuffer,
};

pub const POSITION_OK: &str = "connected";
pub const POSITION_ERROR: &str = "error";
pub const CREW_ERROR: &str = "no crew data";

/// state owned by the position loop
pub struct PositionFeed {
    pub trail: TrailBuffer,
    pub status: Arc<StatusTracker>,
}

impl PositionFeed {
    pub fn new (trail: TrailBuffer, status: Arc<StatusTracker>)->Self { PositionFeed { trail, status } }
}

/// one position poll cycle. On failure we only set the status - trail and rendered scene stay as they are
pub async fn poll_position (backend: &dyn IssBackend, view: &dyn IssView, feed: &mut PositionFeed)->Result<()> {
    match backend.current_position().await {
        Ok(sample) => {
            feed.status.set_ok( POSITION_OK);
            view.show_position( &PositionReadout::from( &sample));

            feed.trail.append( &sample);
            for update in scene::position_updates( &sample, feed.trail.snapshot()) {
                view.update_scene( update);
            }
            Ok(())
        }
        Err(e) => {
            warn!("failed to retrieve ISS position: {}", e);
            feed.status.set_error( POSITION_ERROR);
            Err(e)
        }
    }
}

/// one crew poll cycle. The rendered list is replaced as a whole, and only on success
pub async fn poll_crew (backend: &dyn IssBackend, view: &dyn IssView, status: &StatusTracker)->Result<()> {
    match backend.crew().await {
        Ok(roster) => {
            view.show_crew( &roster.people, roster.count());
            let updated_at = roster.updated_at.unwrap_or_else( Utc::now);
            status.set_ok( crew_updated_message( &updated_at));
            Ok(())
        }
        Err(e) => {
            warn!("failed to retrieve crew: {}", e);
            status.set_error( CREW_ERROR);
            Err(e)
        }
    }
}

pub fn crew_updated_message (updated_at: &DateTime<Utc>)->String {
    format!("updated: {}", updated_at.with_timezone( &Local).format("%H:%M:%S"))
}

/// one-shot retrieval of the predicted orbit. This is decoration so failures are only logged
pub async fn show_orbit_path (backend: &dyn IssBackend, view: &dyn IssView)->Result<usize> {
    let points = backend.orbit_path().await?;
    let len = points.len();
    view.update_scene( SceneUpdate::OrbitPath(points));
    Ok(len)
}

/// owns the feed tasks. Each task is independent - a failing feed never affects the others, and
/// tasks only end when the orchestrator is terminated (or dropped)
pub struct PollingOrchestrator {
    config: Arc<IssConfig>,
    backend: Arc<dyn IssBackend>,
    view: Arc<dyn IssView>,
    statuses: StatusBoard,

    // these are moved into their tasks on start
    trail: Option<TrailBuffer>,
    resolver: Option<LocationResolver>,

    tasks: Vec<AbortHandle>,
}

impl PollingOrchestrator {
    pub fn new (config: IssConfig, backend: Arc<dyn IssBackend>, view: Arc<dyn IssView>, resolver: Option<LocationResolver>, statuses: StatusBoard)->Self {
        let trail = Some( TrailBuffer::new( config.max_trail));
        PollingOrchestrator { config: Arc::new(config), backend, view, statuses, trail, resolver, tasks: Vec::new() }
    }

    pub fn statuses (&self)->&StatusBoard { &self.statuses }
    pub fn is_running (&self)->bool { !self.tasks.is_empty() }

    /// spawn the feed tasks. This can only be called once
    pub fn start (&mut self)->Result<()> {
        if self.config.position_interval.is_zero() || self.config.crew_interval.is_zero() {
            return Err( op_failed!("polling intervals have to be > 0"))
        }
        let Some(trail) = self.trail.take() else {
            return Err( op_failed!("orchestrator already started"))
        };

        let feed = PositionFeed::new( trail, self.statuses.position.clone());
        self.tasks.push( self.spawn_position_loop( feed));
        self.tasks.push( self.spawn_crew_loop());

        if self.config.predict_passes {
            if let Some(resolver) = self.resolver.take() {
                self.tasks.push( self.spawn_pass_prediction( resolver));
            } else {
                warn!("no location resolver, skipping pass prediction");
            }
        }

        if self.config.show_orbit_path {
            self.tasks.push( self.spawn_orbit_path());
        }

        info!("started {} feed tasks", self.tasks.len());
        Ok(())
    }

    pub fn terminate (&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    fn spawn_position_loop (&self, mut feed: PositionFeed)->AbortHandle {
        let backend = self.backend.clone();
        let view = self.view.clone();
        let interval = self.config.position_interval;

        task::spawn( async move {
            let mut ticker = time::interval( interval);
            ticker.set_missed_tick_behavior( MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poll_position( backend.as_ref(), view.as_ref(), &mut feed).await.ok(); // already reported
            }
        }).abort_handle()
    }

    fn spawn_crew_loop (&self)->AbortHandle {
        let backend = self.backend.clone();
        let view = self.view.clone();
        let status = self.statuses.crew.clone();
        let interval = self.config.crew_interval;

        task::spawn( async move {
            let mut ticker = time::interval( interval);
            ticker.set_missed_tick_behavior( MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poll_crew( backend.as_ref(), view.as_ref(), &status).await.ok();
            }
        }).abort_handle()
    }

    fn spawn_pass_prediction (&self, resolver: LocationResolver)->AbortHandle {
        let backend = self.backend.clone();
        let view = self.view.clone();
        let status = self.statuses.pass.clone();
        let max_passes = self.config.max_passes;

        task::spawn( async move {
            if let Err(e) = run_pass_prediction( &resolver, backend.as_ref(), view.as_ref(), &status, max_passes).await {
                info!("pass prediction ended without result: {}", e);
            }
        }).abort_handle()
    }

    fn spawn_orbit_path (&self)->AbortHandle {
        let backend = self.backend.clone();
        let view = self.view.clone();

        task::spawn( async move {
            match show_orbit_path( backend.as_ref(), view.as_ref()).await {
                Ok(len) => debug!("orbit path with {} points", len),
                Err(e) => warn!("failed to retrieve orbit path: {}", e)
            }
        }).abort_handle()
    }
}

impl Drop for PollingOrchestrator {
    fn drop (&mut self) {
        self.terminate();
    }
}
