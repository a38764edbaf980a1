//! Client code for the Stellar Photos relay.
//!
//! This crate provides the outbound side: the shared HTTP fetch pipeline
//! (including image fetch & encode), the Unsplash API client, OAuth token
//! exchange and the storage provider uploads.

pub mod fetch;
pub mod oauth;
pub mod unsplash;
pub mod upload;

pub use fetch::{EncodedImage, FetchClient, FetchConfig, ImageMime};
pub use oauth::{OAuthClient, Provider, TokenResponse};
pub use unsplash::{Photo, Resolution, SearchResults, UnsplashClient, UnsplashConfig};
pub use upload::{StorageClient, StorageEndpoints};
