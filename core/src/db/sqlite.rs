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

//! Common utilities to interact with an SQLite database.

use crate::db::{Db, DbError, DbResult, Executor};
use crate::env::get_optional_var;
use async_trait::async_trait;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// Default value for the `URI` setting when not specified.
const DEFAULT_URI: &str = "products.db";

/// Default value for the `MAX_CONNECTIONS` setting when not specified.
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => DbError::Unavailable,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Options to establish a connection to an SQLite database.
#[derive(Clone, Debug, PartialEq)]
pub struct SqliteOptions {
    /// Path to the database file, or `:memory:` for a private in-memory database.
    pub uri: String,

    /// Maximum number of connections to keep open in the pool.
    pub max_connections: u32,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self { uri: DEFAULT_URI.to_owned(), max_connections: DEFAULT_MAX_CONNECTIONS }
    }
}

impl SqliteOptions {
    /// Creates a new set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_URI` and `<prefix>_MAX_CONNECTIONS`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let max_connections =
            get_optional_var::<u32>(prefix, "MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        if max_connections == 0 {
            return Err(format!("{}_MAX_CONNECTIONS must be positive", prefix));
        }
        Ok(Self {
            uri: get_optional_var::<String>(prefix, "URI")?
                .unwrap_or_else(|| DEFAULT_URI.to_owned()),
            max_connections,
        })
    }
}

/// Opens the database described by `opts`, creating the backing file if it does not exist yet.
pub async fn connect(opts: SqliteOptions) -> DbResult<SqliteDb> {
    let conn_opts = SqliteConnectOptions::from_str(&opts.uri)
        .map_err(map_sqlx_error)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(opts.max_connections)
        .connect_with(conn_opts)
        .await
        .map_err(map_sqlx_error)?;
    Ok(SqliteDb { pool })
}

/// A database executor for SQLite backed by a connection taken from the pool.
///
/// The executor dereferences to the underlying `SqliteConnection`, so queries run on `&mut **ex`.
/// The connection returns to the pool when the executor is dropped.
#[derive(Debug)]
pub struct SqliteExecutor(PoolConnection<Sqlite>);

impl Deref for SqliteExecutor {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SqliteExecutor {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// A database instance backed by an SQLite database.
pub struct SqliteDb {
    /// Shared SQLite connection pool.  Every executor handed out by this database borrows one
    /// connection from here.
    pool: SqlitePool,
}

impl Drop for SqliteDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

#[async_trait]
impl Db for SqliteDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        Ok(Executor::Sqlite(SqliteExecutor(conn)))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Helper function to initialize the database with a schema.
///
/// The `schema` may contain more than one statement.
pub async fn run_schema(e: &mut SqliteExecutor, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(&mut **e).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// Test utilities for the SQLite connection.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Initializes the test database.
    ///
    /// The database lives in memory and is private to the returned instance.
    pub async fn setup() -> SqliteDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        connect(SqliteOptions { uri: ":memory:".to_owned(), max_connections: 2 }).await.unwrap()
    }
}
