//! HTTP request handlers.

pub mod applications;
pub mod form;
pub mod http;
pub mod jobs;

pub use http::*;
