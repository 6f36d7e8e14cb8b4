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

//! API to delete a product.

use crate::driver::Driver;
use crate::model::ProductId;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::rest::{PathParam, RestError};
use serde::Serialize;

/// Message returned by this API on success.
#[derive(Serialize)]
#[cfg_attr(test, derive(serde::Deserialize, Debug, PartialEq))]
pub(crate) struct DeleteResponse {
    /// Always true.
    ok: bool,
}

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    PathParam(id): PathParam<ProductId>,
) -> Result<impl IntoResponse, RestError> {
    driver.delete_product(id).await?;
    Ok(Json(DeleteResponse { ok: true }))
}
