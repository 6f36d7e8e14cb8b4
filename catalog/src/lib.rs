// Catalog
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! REST service to manage a catalog of products.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use catalog_core::db::sqlite::{self, SqliteOptions};
use catalog_core::db::Db;
use log::{info, warn};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub(crate) mod db;
pub(crate) mod driver;
use driver::Driver;
pub(crate) mod model;
mod rest;
use rest::app;

/// Waits until the user asks the server to stop.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => warn!("Cannot wait for Ctrl-C; shutting down: {}", e),
    }
}

/// Prepares `db` for use and serves the application on `bind_addr` until shutdown.
async fn run(db: Arc<dyn Db + Send + Sync>, bind_addr: SocketAddr) -> Result<(), Box<dyn Error>> {
    db::init_schema(&mut db.ex().await?).await?;
    let driver = Driver::new(db);
    let app = app(driver);

    let listener = TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db_opts: SqliteOptions,
) -> Result<(), Box<dyn Error>> {
    info!("Opening database {}", db_opts.uri);
    let db: Arc<dyn Db + Send + Sync> = Arc::new(sqlite::connect(db_opts).await?);
    let result = run(db.clone(), bind_addr.into()).await;
    db.close().await;
    result
}
