//! Shared types, error taxonomy, and XML/SOAP plumbing.
//!
//! This module provides the caller-facing request types for the WSFE
//! services, the crate-wide error enum, and the small event-based XML
//! layer both clients serialize and parse with.

mod error;
pub(crate) mod soap;
mod types;
pub(crate) mod xml;

pub use error::*;
pub use types::*;
