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

//! Database abstraction in terms of the operations needed by the server.
//!
//! Every operation issues exactly one statement, which SQLite runs atomically, so none of them
//! needs an explicit transaction.

use crate::model::*;
use catalog_core::db::sqlite::{map_sqlx_error, run_schema};
use catalog_core::db::{DbError, DbResult, Executor};
use futures::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;


/// Initializes the database schema.  This is idempotent.
pub(crate) async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Sqlite(ex) => run_schema(ex, include_str!("sqlite.sql")).await,
    }
}

impl TryFrom<SqliteRow> for Product {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let name: String = row.try_get("name").map_err(map_sqlx_error)?;
        let description: String = row.try_get("description").map_err(map_sqlx_error)?;
        let price: f64 = row.try_get("price").map_err(map_sqlx_error)?;
        let quantity: i64 = row.try_get("quantity").map_err(map_sqlx_error)?;

        let fields =
            ProductFields::new(name, description, Price::new(price)?, Quantity::new(quantity)?);
        Ok(Product::new(ProductId::new(id), fields))
    }
}

/// Checks that the statement described by `what` touched exactly one row.
fn expect_one_row(what: &str, rows_affected: u64) -> DbResult<()> {
    if rows_affected != 1 {
        return Err(DbError::BackendError(format!("{} affected {} rows", what, rows_affected)));
    }
    Ok(())
}

/// Stores a new product with the given `fields` and returns it with its newly-assigned
/// identifier.
pub(crate) async fn create_product(ex: &mut Executor, fields: &ProductFields) -> DbResult<Product> {
    let id = match ex {
        Executor::Sqlite(ex) => {
            let query_str =
                "INSERT INTO products (name, description, price, quantity) VALUES (?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(fields.name().as_str())
                .bind(fields.description().as_str())
                .bind(fields.price().as_f64())
                .bind(fields.quantity().as_i64())
                .execute(&mut **ex)
                .await
                .map_err(map_sqlx_error)?;
            expect_one_row("Insertion", done.rows_affected())?;
            done.last_insert_rowid()
        }
    };

    Ok(Product::new(ProductId::new(id), fields.clone()))
}

/// Gets the product identified by `id`, or `None` if it does not exist.
pub(crate) async fn get_product(ex: &mut Executor, id: ProductId) -> DbResult<Option<Product>> {
    match ex {
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT id, name, description, price, quantity
                FROM products
                WHERE id = ?
            ";
            let maybe_row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(&mut **ex)
                .await
                .map_err(map_sqlx_error)?;
            maybe_row.map(Product::try_from).transpose()
        }
    }
}

/// Gets the products that fall within `window`, in the order in which they were created.
pub(crate) async fn get_products(ex: &mut Executor, window: PageWindow) -> DbResult<Vec<Product>> {
    match ex {
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT id, name, description, price, quantity
                FROM products
                ORDER BY id
                LIMIT ? OFFSET ?
            ";
            let mut rows = sqlx::query(query_str)
                .bind(window.limit())
                .bind(window.skip())
                .fetch(&mut **ex);

            let mut products = vec![];
            while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
                products.push(Product::try_from(row)?);
            }
            Ok(products)
        }
    }
}

/// Replaces all `fields` of the product identified by `id`.
///
/// Returns the updated product, or `None` if it does not exist.
pub(crate) async fn update_product(
    ex: &mut Executor,
    id: ProductId,
    fields: &ProductFields,
) -> DbResult<Option<Product>> {
    let rows_affected = match ex {
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE products
                SET name = ?, description = ?, price = ?, quantity = ?
                WHERE id = ?
            ";
            let done = sqlx::query(query_str)
                .bind(fields.name().as_str())
                .bind(fields.description().as_str())
                .bind(fields.price().as_f64())
                .bind(fields.quantity().as_i64())
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Ok(None),
        1 => Ok(Some(Product::new(id, fields.clone()))),
        _ => Err(DbError::BackendError("Update affected more than one row".to_owned())),
    }
}

/// Deletes the product identified by `id`.
///
/// Returns true if the product existed and false otherwise.
pub(crate) async fn delete_product(ex: &mut Executor, id: ProductId) -> DbResult<bool> {
    let rows_affected = match ex {
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM products WHERE id = ?";
            let done = sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(map_sqlx_error)?;
            done.rows_affected()
        }
    };

    match rows_affected {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DbError::BackendError("Deletion affected more than one row".to_owned())),
    }
}
