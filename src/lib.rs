#![doc = "The `taskforge_auth` library crate."]
#![doc = ""]
#![doc = "Credential hashing, bearer-token issuance and verification, and identity"]
#![doc = "resolution, together with the task-management routes they protect."]
#![doc = "The binary (`main.rs`) only wires configuration, storage and the HTTP server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
