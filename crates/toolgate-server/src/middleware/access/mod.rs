//! Access-control middleware.

pub mod layer;

pub use layer::{decide, AccessControlLayer, AccessControlMiddleware};
