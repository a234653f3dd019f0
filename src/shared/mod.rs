//! Types shared between the backend and API clients.

pub mod error;
pub mod friendship;

pub use error::SharedError;
