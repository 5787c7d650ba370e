//! Taiwan Weather Dashboard Library
//!
//! Region lookup, feed normalization and presentation for the `twweather`
//! terminal dashboard, exposed for the binary and integration tests.

pub mod app;
pub mod cli;
pub mod data;
pub mod geo;
pub mod locate;
pub mod logging;
pub mod presentation;
pub mod ui;
