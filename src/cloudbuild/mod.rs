//! Unity Cloud Build API client
//!
//! Thin blocking wrappers over the credential and project endpoints. No retry
//! or backoff is attempted; failures surface to the calling command.

pub mod client;
pub mod credentials;
pub mod projects;

pub use client::{ApiConnector, ApiError, HttpClient, ReqwestConnector};
pub use credentials::{CredentialUpload, CredentialsService};
pub use projects::ProjectsService;

#[cfg(test)]
pub use client::{MockConnector, MockHttpClient};
