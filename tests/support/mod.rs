//! Shared test helpers.
//!
//! - `stub_http`: loopback HTTP server with canned responses
//! - `osrm_dataset`: OSRM extract preparation for container tests

#![allow(dead_code)]

pub mod osrm_dataset;
pub mod stub_http;
