//! HTTP plumbing shared by the Gogs and Drone clients

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::RemoteError;
