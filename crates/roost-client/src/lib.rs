//! Remote API client for the Twitter v1.1 REST endpoints.
//!
//! [`RemoteApi`] is the seam the orchestrators depend on; [`TwitterClient`] is the
//! production implementation backed by `reqwest`.

pub mod api;
pub mod client;
pub mod oauth;
pub mod upload;

pub use api::{params, Params, RemoteApi};
pub use client::TwitterClient;
pub use oauth::OAuthSigner;
