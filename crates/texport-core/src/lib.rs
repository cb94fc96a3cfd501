//! TEXPORT core: a blocking client engine for bulk, asynchronous,
//! chunked data-export APIs.
//!
//! The interesting machinery is the retrying transport ([`retry`]), the
//! bounded polling primitive ([`poll`]), the shared export workflow
//! ([`export`]) and the lazy pagination engine ([`pagination`]); the
//! [`resources`] modules are thin endpoint maps over those.

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod pagination;
pub mod poll;
pub mod resources;
pub mod retry;
pub mod time;
pub mod transport;

pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
