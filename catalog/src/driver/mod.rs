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

//! Business logic for the service.

use catalog_core::db::Db;
use catalog_core::driver::DriverError;
use std::sync::Arc;

mod product;
mod products;
#[cfg(test)]
mod testutils;

/// Builds the error returned when an operation references a product that does not exist.
fn product_not_found() -> DriverError {
    DriverError::NotFound("Product not found".to_owned())
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": each acquires a database
/// connection for its own use and releases it before returning, so it's incorrect for the caller
/// to use two separate calls.  For this reason, these operations consume the driver in an attempt
/// to minimize the possibility of executing two operations.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>) -> Self {
        Self { db }
    }
}
