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

//! Entry point to the catalog service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use catalog::serve;
use catalog_core::db::sqlite::SqliteOptions;
use catalog_core::env::get_optional_var;
use log::error;
use std::error::Error;
use std::net::Ipv4Addr;
use std::process;

/// Port to listen on when `CATALOG_PORT` is not set.
const DEFAULT_PORT: u16 = 8000;

/// Gathers the configuration from the environment and runs the server.
async fn run() -> Result<(), Box<dyn Error>> {
    let port = get_optional_var::<u16>("CATALOG", "PORT")?.unwrap_or(DEFAULT_PORT);
    let addr = (Ipv4Addr::LOCALHOST, port);

    let db_opts = SqliteOptions::from_env("CATALOG_DB")?;

    serve(addr, db_opts).await
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        error!("{}", e);
        eprintln!("catalog: {}", e);
        process::exit(1);
    }
}
