//! Transaction relay client

pub mod client;
pub mod error;

pub use client::RelayClient;
pub use error::{RelayError, Result};
