//! route-optimizer core
//!
//! Fixed-origin visiting order search plus road route and geocoding
//! adapters with bounded retry.

pub mod error;
pub mod point;
pub mod traits;
pub mod solver;
pub mod retry;
pub mod osrm;
pub mod polyline;
pub mod nominatim;
pub mod resolver;
pub mod store;
pub mod planner;

pub use error::{Error, Result};
pub use point::{Point, PointSequence};
