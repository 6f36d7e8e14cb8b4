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

//! Entry point to the REST server.

use crate::driver::Driver;
use axum::Router;

mod product_delete;
mod product_get;
mod product_put;
mod products_get;
mod products_post;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/products", get(products_get::handler).post(products_post::handler))
        .route("/products/", get(products_get::handler).post(products_post::handler))
        .route(
            "/products/:id",
            get(product_get::handler).put(product_put::handler).delete(product_delete::handler),
        )
        .with_state(driver)
}

#[cfg(test)]
mod tests {
    use crate::db::tests::product_fields;
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use catalog_core::rest::testutils::*;
    use futures::future;

    #[tokio::test]
    async fn test_lifecycle() {
        let context = TestContext::setup().await;

        let fields = product_fields("Test Product", 9.99, 5);
        let created = OneShotBuilder::new(context.app(), (http::Method::POST, "/products/"))
            .send_json(&fields)
            .await
            .expect_json::<Product>()
            .await;
        assert_eq!(fields, created.fields());

        let uri = format!("/products/{}", created.id());
        let fetched = OneShotBuilder::new(context.app(), (http::Method::GET, &uri))
            .send_empty()
            .await
            .expect_json::<Product>()
            .await;
        assert_eq!(created, fetched);

        let new_fields = product_fields("Renamed", 1.25, 0);
        let updated = OneShotBuilder::new(context.app(), (http::Method::PUT, &uri))
            .send_json(&new_fields)
            .await
            .expect_json::<Product>()
            .await;
        assert_eq!(Product::new(*created.id(), new_fields), updated);

        OneShotBuilder::new(context.app(), (http::Method::DELETE, &uri))
            .send_empty()
            .await
            .verify();

        OneShotBuilder::new(context.app(), (http::Method::GET, &uri))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Product not found$")
            .await;

        context.close().await;
    }

    #[tokio::test]
    async fn test_concurrent_creates_and_reads() {
        let dir = tempfile::tempdir().unwrap();
        let context = TestContext::setup_file(dir.path().join("products.db")).await;

        let requests = (0..20).map(|i| {
            let app = context.app();
            async move {
                let fields = product_fields(&format!("product {}", i), 1.0, i);
                let created = OneShotBuilder::new(app.clone(), (http::Method::POST, "/products"))
                    .send_json(&fields)
                    .await
                    .expect_json::<Product>()
                    .await;
                let fetched = OneShotBuilder::new(
                    app,
                    (http::Method::GET, format!("/products/{}", created.id())),
                )
                .send_empty()
                .await
                .expect_json::<Product>()
                .await;
                assert_eq!(created, fetched);
                created
            }
        });
        let created = future::join_all(requests).await;

        let mut ids = created.iter().map(|p| *p.id()).collect::<Vec<ProductId>>();
        ids.sort();
        ids.dedup();
        assert_eq!(20, ids.len());
        assert_eq!(20, context.count_products().await);

        context.close().await;
    }
}
