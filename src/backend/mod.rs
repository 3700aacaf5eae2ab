//! Backend collaborator contract
//!
//! The REST API owns subscription state and invoice records. This module
//! exposes it through the [`BackendApi`] trait so orchestration logic can be
//! tested without a server.

pub mod client;
pub mod errors;
pub mod types;

pub use client::{BackendApi, HttpBackend};
pub use errors::BackendError;
pub use types::{
    GenerateInvoiceRequest, GeneratedInvoice, ProjectRef, SubscriptionAction, TransitionResponse,
};

#[cfg(test)]
pub use client::MockBackendApi;
