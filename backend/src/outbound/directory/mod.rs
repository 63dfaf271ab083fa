//! On-call directory outbound adapters.
//!
//! A thin reqwest implementation of the `OnCallSource` port.

mod dto;
mod http_source;

pub use http_source::{DirectoryHttpIdentity, HttpOnCallDirectory};
