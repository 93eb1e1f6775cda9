//! coach-remote: clients for the three services that own data joined onto a
//! coach (services, reviews, users).
//!
//! - [`HttpServiceDirectory`], [`HttpReviewDirectory`], [`HttpUserDirectory`]
//!   talk JSON over HTTP with `reqwest`
//! - [`MemoryDirectory`] implements all three traits in-process for tests and
//!   local runs

mod http;
mod memory;
mod wire;

pub use http::{HttpReviewDirectory, HttpServiceDirectory, HttpUserDirectory, RemoteEndpoint};
pub use memory::MemoryDirectory;

pub use coach_core::{ReviewDirectory, ServiceDirectory, UserDirectory};
