//! HTTP surface of the registry: router, handlers, error mapping and startup.

pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::run;
