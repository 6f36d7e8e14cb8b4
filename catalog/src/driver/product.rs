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

//! Operations on one product.

use crate::db;
use crate::driver::{product_not_found, Driver};
use crate::model::*;
use catalog_core::driver::DriverResult;
use log::info;

impl Driver {
    /// Deletes the product identified by `id`.
    pub(crate) async fn delete_product(self, id: ProductId) -> DriverResult<()> {
        if !db::delete_product(&mut self.db.ex().await?, id).await? {
            return Err(product_not_found());
        }
        info!("Deleted product {}", id);
        Ok(())
    }

    /// Gets the product identified by `id`.
    pub(crate) async fn get_product(self, id: ProductId) -> DriverResult<Product> {
        db::get_product(&mut self.db.ex().await?, id).await?.ok_or_else(product_not_found)
    }

    /// Replaces all the contents of the product identified by `id` with `fields`.
    pub(crate) async fn update_product(
        self,
        id: ProductId,
        fields: ProductFields,
    ) -> DriverResult<Product> {
        let product = db::update_product(&mut self.db.ex().await?, id, &fields)
            .await?
            .ok_or_else(product_not_found)?;
        info!("Updated product {}", id);
        Ok(product)
    }
}
