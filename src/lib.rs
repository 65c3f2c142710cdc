#![doc = "The `taskflow` library crate."]
#![doc = ""]
#![doc = "Domain models, form validation, the listing/dashboard query engine, persistence"]
#![doc = "backends, the session gate and the HTTP routes of the workgroup task tracker."]
#![doc = "The binary (`main.rs`) only wires these together from the environment."]

pub mod auth;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod query;
pub mod routes;
pub mod store;

pub use crate::error::AppError;
pub use crate::routes::AppState;
