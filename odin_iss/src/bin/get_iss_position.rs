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

use anyhow::Result;
use clap::Parser;
use lazy_static::lazy_static;
use reqwest::Client;

use odin_iss::{
    BackendConfig, Coordinate,
    backend::{HttpIssBackend,IssBackend},
    pass_flow::evaluate_pass_response,
};

#[derive(Parser)]
#[command(about="retrieve current ISS position, crew and optionally passes from backend")]
struct CliOpts {
    #[arg(help="base URL of the ISS backend", long, short, default_value="http://127.0.0.1:8000")]
    base_url: String,

    #[arg(help="observer latitude for pass prediction", long, requires="lng", allow_negative_numbers=true)]
    lat: Option<f64>,

    #[arg(help="observer longitude for pass prediction", long, requires="lat", allow_negative_numbers=true)]
    lng: Option<f64>,
}

lazy_static! { static ref ARGS: CliOpts = CliOpts::parse(); }

#[tokio::main]
async fn main()->Result<()> {
    let config = BackendConfig { base_url: ARGS.base_url.clone(), ..BackendConfig::default() };
    let client = Client::builder().timeout( config.request_timeout).build()?;
    let backend = HttpIssBackend::new( client, config);

    let sample = backend.current_position().await?;
    println!("{sample}");

    let roster = backend.crew().await?;
    println!("{} people:", roster.count());
    for p in &roster.people {
        println!("  {:30} {}", p.name, p.craft);
    }

    if let (Some(lat), Some(lng)) = (ARGS.lat, ARGS.lng) {
        let observer = Coordinate::new( lat, lng).validated()?;
        let passes = evaluate_pass_response( backend.predict_passes( observer).await?, 0)?;
        println!("passes for {observer}:");
        for p in &passes { println!("  {p}") }
    }

    println!("ok.");
    Ok(())
}
