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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use crate::rest::app;
use axum::Router;
use catalog_core::db::sqlite::{self, SqliteOptions};
use catalog_core::db::Db;
use std::path::Path;
use std::sync::Arc;

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    app: Router,
}

impl TestContext {
    /// Initializes the application against `db`, which must not have a schema yet.
    async fn attach(db: Arc<dyn Db + Send + Sync>) -> Self {
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone());
        let app = app(driver);
        Self { db, app }
    }

    pub(crate) async fn setup() -> Self {
        Self::attach(Arc::new(sqlite::testutils::setup().await)).await
    }

    /// Same as `setup` but backs the database with a file at `path`.
    pub(crate) async fn setup_file<P: AsRef<Path>>(path: P) -> Self {
        let opts = SqliteOptions {
            uri: path.as_ref().to_str().unwrap().to_owned(),
            max_connections: 4,
        };
        Self::attach(Arc::new(sqlite::connect(opts).await.unwrap())).await
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    pub(crate) async fn close(self) {
        self.db.close().await;
    }

    pub(crate) async fn create_product(&self, fields: &ProductFields) -> Product {
        db::create_product(&mut self.db.ex().await.unwrap(), fields).await.unwrap()
    }

    pub(crate) async fn get_product(&self, id: ProductId) -> Option<Product> {
        db::get_product(&mut self.db.ex().await.unwrap(), id).await.unwrap()
    }

    pub(crate) async fn count_products(&self) -> usize {
        let window = PageWindow::new(0, i64::MAX).unwrap();
        db::get_products(&mut self.db.ex().await.unwrap(), window).await.unwrap().len()
    }
}
