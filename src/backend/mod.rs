//! Backend server: friendship service, storage, auth, and HTTP surface.

pub mod auth;
pub mod error;
pub mod friendship;
pub mod routes;
pub mod server;
