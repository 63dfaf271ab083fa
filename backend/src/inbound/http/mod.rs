//! HTTP inbound adapter exposing REST endpoints.

pub mod books;
pub mod cache_control;
pub mod error;
pub mod health;
pub mod on_call;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;

pub use error::ApiResult;
