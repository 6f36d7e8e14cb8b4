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

//! API to replace the contents of a product.

use crate::driver::Driver;
use crate::model::{ProductFields, ProductId};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::rest::{JsonBody, PathParam, RestError};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    PathParam(id): PathParam<ProductId>,
    JsonBody(fields): JsonBody<ProductFields>,
) -> Result<impl IntoResponse, RestError> {
    let product = driver.update_product(id, fields).await?;
    Ok(Json(product))
}
