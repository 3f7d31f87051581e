// passweave-api: Async Rust client for NodePass-style tunnel management APIs

pub mod client;
pub mod error;

pub use client::{CreateInstanceRequest, CreatedInstance, ProvisionClient};
pub use error::Error;
