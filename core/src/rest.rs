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

//! Generic code for REST handlers.
//!
//! All services should implement an `app` function in their `rest` module that returns the
//! `Router` for the application.
//!
//! Every API should be put in its own `.rs` file, using a name like `<entity>_<method>.rs`.  This
//! may seem overkill, but putting every API in its own file makes it easy to ensure all the
//! integration tests for the given API truly belong to that API.
//!
//! More specifically, the `tests` module within an API should define a `route` method that
//! returns the HTTP method and the API path under test.  All integration tests within the module
//! then rely on `route` to obtain this information, ensuring that they all test the desired API.
//!
//! Handlers should extract their inputs with `JsonBody`, `PathParam` and `QueryParams` instead of
//! the raw axum extractors.  These funnel all malformed input through `RestError` so that clients
//! always get the same error shape.

use crate::driver::DriverError;
use crate::model::ModelError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// Catch-all error type for all unexpected errors.
    #[error("{0}")]
    InternalError(String),

    /// Indicates an error in the contents of the request.
    #[error("{0}")]
    InvalidRequest(String),

    /// Indicates that a requested entity does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::BackendError(_) => RestError::InternalError(e.to_string()),
            DriverError::NotFound(_) => RestError::NotFound(e.to_string()),
        }
    }
}

impl From<ModelError> for RestError {
    fn from(e: ModelError) -> Self {
        RestError::InvalidRequest(e.to_string())
    }
}

impl From<JsonRejection> for RestError {
    fn from(e: JsonRejection) -> Self {
        RestError::InvalidRequest(e.body_text())
    }
}

impl From<PathRejection> for RestError {
    fn from(e: PathRejection) -> Self {
        RestError::InvalidRequest(e.body_text())
    }
}

impl From<QueryRejection> for RestError {
    fn from(e: QueryRejection) -> Self {
        RestError::InvalidRequest(e.body_text())
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            RestError::InternalError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => http::StatusCode::UNPROCESSABLE_ENTITY,
            RestError::NotFound(_) => http::StatusCode::NOT_FOUND,
        };

        if status.is_server_error() {
            log::warn!("Request failed: {}", self);
        }

        let response = ErrorResponse { detail: self.to_string() };

        (status, Json(response)).into_response()
    }
}

/// Result type for this module.
pub type RestResult<T> = Result<T, RestError>;

/// Representation of the details of an error response.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ErrorResponse {
    /// Textual representation of the error message.
    pub(crate) detail: String,
}

/// A JSON request body extractor that reports malformed payloads as a `RestError`.
///
/// Fields present in the payload but unknown to `T` are ignored.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(RestError))]
pub struct JsonBody<T>(pub T);

/// A path parameters extractor that reports unparseable segments as a `RestError`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(RestError))]
pub struct PathParam<T>(pub T);

/// A query string extractor that reports malformed queries as a `RestError`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(RestError))]
pub struct QueryParams<T>(pub T);

/// Common test code for the REST server.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use axum::Router;
    use serde::de::DeserializeOwned;
    use tower::util::ServiceExt;

    /// Maximum body size for testing purposes.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// Builder for a single request to the API server.
    #[must_use]
    pub struct OneShotBuilder {
        /// The router for the app being tested.
        app: Router,

        /// Builder for the request that will be sent to the app.
        builder: http::request::Builder,
    }

    impl OneShotBuilder {
        /// Creates a new request against a given `method`/`uri` pair served by an `app` router.
        pub fn new<U: AsRef<str>>(app: Router, (method, uri): (http::Method, U)) -> Self {
            let builder = http::Request::builder().method(method).uri(uri.as_ref());
            Self { app, builder }
        }

        /// Extends the URI in the request with a `query`.
        pub fn with_query<Q: Serialize>(mut self, query: Q) -> Self {
            let uri = self.builder.uri_ref().unwrap().to_string();
            assert!(!uri.contains('?'), "URI already contains a query: {}", uri);
            self.builder = self.builder.uri(format!(
                "{}?{}",
                uri,
                serde_urlencoded::to_string(query).unwrap()
            ));
            self
        }

        /// Sets the header `name` to `value` in the outgoing request.
        pub fn with_header<K, V>(mut self, name: K, value: V) -> Self
        where
            HeaderName: TryFrom<K>,
            <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
            HeaderValue: TryFrom<V>,
            <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
        {
            self.builder = self.builder.header(name, value);
            self
        }

        /// Finishes building the request and sends it with an empty payload.
        pub async fn send_empty(self) -> ResponseChecker {
            let request = self.builder.body(axum::body::Body::empty()).unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a text payload.
        pub async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::TEXT_PLAIN.as_ref())
                .body(axum::body::Body::from(text.into()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }

        /// Finishes building the request and sends it with a JSON payload.
        pub async fn send_json<T: Serialize>(self, request: T) -> ResponseChecker {
            let request = self
                .builder
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(axum::body::Body::from(serde_json::to_vec(&request).unwrap()))
                .unwrap();
            ResponseChecker::from(self.app.oneshot(request).await.unwrap())
        }
    }

    /// Type alias for the complex type returned by the `oneshot` function.
    type HttpResponse = axum::response::Response;

    /// Validator for the outcome of a request sent by a `OneShotBuilder`.
    #[must_use]
    pub struct ResponseChecker {
        /// Actual response that we received from the app.
        response: HttpResponse,

        /// Expected HTTP status code in the response above.
        exp_status: http::StatusCode,
    }

    impl From<HttpResponse> for ResponseChecker {
        fn from(response: HttpResponse) -> Self {
            Self { response, exp_status: http::StatusCode::OK }
        }
    }

    impl ResponseChecker {
        /// Sets the expected exit HTTP status to `status`.
        pub fn expect_status(mut self, status: http::StatusCode) -> Self {
            self.exp_status = status;
            self
        }

        /// Performs common validation operations on the response.
        pub fn verify(&self) {
            assert_eq!(self.exp_status, self.response.status());
        }

        /// Finishes checking the response and expects its body to be an `ErrorResponse` whose
        /// detail matches `exp_re`.
        pub async fn expect_error(self, exp_re: &str) {
            self.verify();

            let body =
                axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            let response: ErrorResponse = match serde_json::from_slice(&body) {
                Ok(response) => response,
                Err(e) => {
                    let body = String::from_utf8(body.to_vec()).unwrap();
                    panic!("Invalid error response due to {}; content was {}", e, body);
                }
            };
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(
                re.is_match(&response.detail),
                "Response content '{:?}' does not match re '{}'",
                response,
                exp_re
            );
        }

        /// Finishes checking the response and expects it to contain a valid JSON object of
        /// type `T`.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            self.verify();

            let body =
                axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await.unwrap();
            match serde_json::from_slice::<T>(&body) {
                Ok(value) => value,
                Err(e) => {
                    let body = String::from_utf8(body.to_vec()).unwrap();
                    panic!("Invalid JSON response due to {}; content was {}", e, body);
                }
            }
        }
    }

    /// Generates a test to verify that an API that expects JSON fails when it gets something else.
    #[macro_export]
    macro_rules! test_payload_must_be_json {
        ( $app:expr, $route:expr $(, $query:expr)? ) => {
            #[tokio::test]
            async fn test_payload_must_be_json() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY)
                    .expect_error("Content-Type")
                    .await;

                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    $( .with_query($query) )?
                    .with_header(axum::http::header::CONTENT_TYPE, "application/json")
                    .send_text("this is not json")
                    .await
                    .expect_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY)
                    .expect_error("expected ident")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_json;
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use axum::routing::{get, post};
    use axum::Router;

    /// Payload accepted by the test router.
    #[derive(Deserialize, Serialize)]
    struct Sample {
        /// A required numeric field.
        value: u32,
    }

    /// Query accepted by the test router.
    #[derive(Deserialize, Serialize)]
    struct SampleQuery {
        /// A required numeric parameter.
        count: u32,
    }

    /// Echoes the validated body back to the caller.
    async fn echo_body(JsonBody(sample): JsonBody<Sample>) -> Json<Sample> {
        Json(sample)
    }

    /// Echoes the validated path parameter back to the caller.
    async fn echo_path(PathParam(id): PathParam<i64>) -> Json<i64> {
        Json(id)
    }

    /// Echoes the validated query back to the caller.
    async fn echo_query(QueryParams(query): QueryParams<SampleQuery>) -> Json<u32> {
        Json(query.count)
    }

    /// Always fails with the error named in the path.
    async fn fail(PathParam(kind): PathParam<String>) -> RestResult<()> {
        match kind.as_str() {
            "internal" => Err(DriverError::BackendError("disk on fire".to_owned()).into()),
            "invalid" => Err(ModelError("bad value".to_owned()).into()),
            _ => Err(DriverError::NotFound("Thing not found".to_owned()).into()),
        }
    }

    fn app() -> Router {
        Router::new()
            .route("/body", post(echo_body))
            .route("/path/:id", get(echo_path))
            .route("/query", get(echo_query))
            .route("/fail/:kind", get(fail))
    }

    #[tokio::test]
    async fn test_json_body_ok() {
        let response = OneShotBuilder::new(app(), (http::Method::POST, "/body"))
            .send_json(serde_json::json!({"value": 5, "ignored": true}))
            .await
            .expect_json::<serde_json::Value>()
            .await;
        assert_eq!(serde_json::json!({"value": 5}), response);
    }

    #[tokio::test]
    async fn test_json_body_missing_field() {
        OneShotBuilder::new(app(), (http::Method::POST, "/body"))
            .send_json(serde_json::json!({}))
            .await
            .expect_status(http::StatusCode::UNPROCESSABLE_ENTITY)
            .expect_error("missing field `value`")
            .await;
    }

    test_payload_must_be_json!(app(), (http::Method::POST, "/body"));

    #[tokio::test]
    async fn test_path_param_ok() {
        let response = OneShotBuilder::new(app(), (http::Method::GET, "/path/42"))
            .send_empty()
            .await
            .expect_json::<i64>()
            .await;
        assert_eq!(42, response);
    }

    #[tokio::test]
    async fn test_path_param_not_a_number() {
        OneShotBuilder::new(app(), (http::Method::GET, "/path/abc"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNPROCESSABLE_ENTITY)
            .expect_error("Cannot parse")
            .await;
    }

    #[tokio::test]
    async fn test_query_params_ok() {
        let response = OneShotBuilder::new(app(), (http::Method::GET, "/query"))
            .with_query(SampleQuery { count: 7 })
            .send_empty()
            .await
            .expect_json::<u32>()
            .await;
        assert_eq!(7, response);
    }

    #[tokio::test]
    async fn test_query_params_invalid() {
        OneShotBuilder::new(app(), (http::Method::GET, "/query?count=-1"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNPROCESSABLE_ENTITY)
            .expect_error("Failed to deserialize query string")
            .await;
    }

    #[tokio::test]
    async fn test_error_responses() {
        OneShotBuilder::new(app(), (http::Method::GET, "/fail/internal"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("^disk on fire$")
            .await;

        OneShotBuilder::new(app(), (http::Method::GET, "/fail/invalid"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::UNPROCESSABLE_ENTITY)
            .expect_error("^bad value$")
            .await;

        OneShotBuilder::new(app(), (http::Method::GET, "/fail/missing"))
            .send_empty()
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("^Thing not found$")
            .await;
    }
}
