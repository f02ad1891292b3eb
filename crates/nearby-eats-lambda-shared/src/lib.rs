//! Shared infrastructure for the Nearby Eats AWS Lambda function.
//!
//! This crate provides the plumbing around the lookup library:
//!
//! - [`LambdaRuntime`]: configuration and HTTP clients built once at cold start
//! - [`init_tracing`]: JSON-formatted tracing for CloudWatch Logs
//! - [`HttpEvent`]: function URL / API Gateway proxy event decoding
//! - [`HttpResponse`]: proxy response envelope with cross-origin headers
//! - [`ErrorBody`]: uniform `{ message, error }` failure payload
//!
//! # Testing Support
//!
//! The `test_utils` module provides event builders and mock request IDs for
//! handler testing. Enable the `test-utils` feature to access it from dependent
//! crates.

#![deny(warnings)]

mod error_body;
mod event;
mod response;
mod runtime;
mod tracing_init;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error_body::{ErrorBody, INTERNAL_SERVER_ERROR_MESSAGE};
pub use event::{HttpDescription, HttpEvent, RequestContext};
pub use response::{
    HttpResponse, ALLOWED_HEADERS, ALLOWED_METHODS, HEADER_ALLOW_HEADERS, HEADER_ALLOW_METHODS,
    HEADER_ALLOW_ORIGIN, HEADER_CONTENT_TYPE,
};
pub use runtime::{get_runtime, init_runtime, init_runtime_with, InitError, LambdaRuntime};
pub use tracing_init::init_tracing;
