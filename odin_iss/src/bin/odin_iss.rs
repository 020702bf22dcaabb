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

use std::sync::Arc;
use anyhow::{anyhow,Result};
use clap::Parser;
use lazy_static::lazy_static;
use reqwest::Client;
use tokio::task::{self,AbortHandle};
use tracing::{info,warn};
use tracing_subscriber::EnvFilter;

use odin_iss::{
    Coordinate, DeviceConfig, IssConfig, load_config,
    backend::HttpIssBackend,
    geolocation::LocationResolver,
    orchestrator::PollingOrchestrator,
    scene::{IssView,JsonLinesView},
    status::{Feed,StatusBoard,StatusState,StatusTracker},
};

/// env var that overrides the configured geolocation api key
const GEO_API_KEY_VAR: &str = "GOOGLE_GEO_API_KEY";

#[derive(Parser)]
#[command(about="live ISS tracking client that writes JSON scene messages to stdout")]
struct CliOpts {
    #[arg(help="RON config file (defaults are used if not specified)", long, short)]
    config: Option<String>,

    #[arg(help="base URL of the ISS backend", long, short)]
    base_url: Option<String>,

    #[arg(help="address of gpsd for device location, e.g. 127.0.0.1:2947", long)]
    gpsd: Option<String>,

    #[arg(help="fixed observer latitude in degrees", long, requires="lng", allow_negative_numbers=true)]
    lat: Option<f64>,

    #[arg(help="fixed observer longitude in degrees", long, requires="lat", allow_negative_numbers=true)]
    lng: Option<f64>,

    #[arg(help="don't run pass prediction", long)]
    no_passes: bool,

    #[arg(help="retrieve and show the predicted orbit path", long)]
    orbit_path: bool,
}

lazy_static! { static ref ARGS: CliOpts = CliOpts::parse(); }

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info"))) // RUST_LOG overrides
        .with_writer( std::io::stderr) // stdout is for view messages
        .init();

    let config = get_config()?;
    info!("using ISS backend {}", config.backend.base_url);

    let client = Client::builder().timeout( config.backend.request_timeout).build()?;
    let backend = Arc::new( HttpIssBackend::new( client.clone(), config.backend.clone()));
    let (view, _writer_task) = JsonLinesView::spawn( tokio::io::stdout());
    let view: Arc<dyn IssView> = Arc::new( view);
    let resolver = LocationResolver::from_config( client, &config.geolocation);
    let statuses = StatusBoard::new();

    let monitors: Vec<AbortHandle> = Feed::ALL.iter()
        .map( |feed| spawn_status_monitor( statuses.get(*feed).clone(), view.clone()))
        .collect();

    let mut orchestrator = PollingOrchestrator::new( config, backend, view, Some(resolver), statuses);
    orchestrator.start()?;

    tokio::signal::ctrl_c().await?;
    info!("terminating..");

    orchestrator.terminate();
    for m in monitors { m.abort() }

    Ok(())
}

fn get_config()->Result<IssConfig> {
    let mut config = if let Some(path) = &ARGS.config { load_config( path)? } else { IssConfig::default() };

    if let Some(base_url) = &ARGS.base_url {
        config.backend.base_url = base_url.clone();
    }

    if let Some(addr) = &ARGS.gpsd {
        config.geolocation.device = DeviceConfig::Gpsd { addr: addr.clone() };
    } else if let (Some(lat), Some(lng)) = (ARGS.lat, ARGS.lng) {
        if !Coordinate::new(lat,lng).is_valid() { return Err( anyhow!("invalid observer position {lat},{lng}")) }
        config.geolocation.device = DeviceConfig::Fixed { lat, lng };
    }

    if let Ok(key) = std::env::var( GEO_API_KEY_VAR) {
        config.geolocation.api_key = key;
    }

    if ARGS.no_passes { config.predict_passes = false }
    if ARGS.orbit_path { config.show_orbit_path = true }

    Ok(config)
}

/// log status transitions of a feed and pass them on to the view
fn spawn_status_monitor (tracker: Arc<StatusTracker>, view: Arc<dyn IssView>)->AbortHandle {
    let feed = tracker.feed();
    let mut rx = tracker.subscribe();

    task::spawn( async move {
        let status = rx.borrow_and_update().clone();
        view.show_status( feed, &status);

        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().clone();
            match status.state {
                StatusState::Error => warn!("{} feed: {}", feed, status),
                _ => info!("{} feed: {}", feed, status)
            }
            view.show_status( feed, &status);
        }
    }).abort_handle()
}
