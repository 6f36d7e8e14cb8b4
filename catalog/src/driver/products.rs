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

//! Operations on the collection of products.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use catalog_core::driver::DriverResult;
use log::{debug, info};

impl Driver {
    /// Creates a new product with the given `fields` and returns it with its assigned identifier.
    pub(crate) async fn create_product(self, fields: ProductFields) -> DriverResult<Product> {
        let product = db::create_product(&mut self.db.ex().await?, &fields).await?;
        info!("Created product {}", product.id());
        Ok(product)
    }

    /// Gets the products that fall within `window`, in creation order.
    pub(crate) async fn get_products(self, window: PageWindow) -> DriverResult<Vec<Product>> {
        let products = db::get_products(&mut self.db.ex().await?, window).await?;
        debug!(
            "Listed {} products (skip={}, limit={})",
            products.len(),
            window.skip(),
            window.limit()
        );
        Ok(products)
    }
}
