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

//! API to list a window of the existing products.

use crate::driver::Driver;
use crate::model::{PageWindow, DEFAULT_PAGE_LIMIT};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::rest::{QueryParams, RestError};
use serde::Deserialize;

/// Default value for the `limit` query parameter.
fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

/// Query parameters for this API.
#[derive(Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
pub(crate) struct ListQuery {
    /// Number of products to skip.
    #[serde(default)]
    skip: i64,

    /// Maximum number of products to return.
    #[serde(default = "default_limit")]
    limit: i64,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<impl IntoResponse, RestError> {
    let window = PageWindow::new(query.skip, query.limit)?;
    let products = driver.get_products(window).await?;
    Ok(Json(products))
}
