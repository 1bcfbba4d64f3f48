//! forge
//!
//! Abstraction for the remote hosting service the vocabularies are
//! published to.
//!
//! # Architecture
//!
//! The [`Integration`] trait is the entry point: it enumerates the
//! installations of the app and the repositories each one exposes, and
//! opens a [`RemoteRepository`] for per-repository operations. The
//! publication workflow only ever talks to these traits.
//!
//! # Modules
//!
//! - `traits`: Core traits and request/response types
//! - [`github`]: GitHub App implementation using the REST API
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use vocab_publisher::forge::{Integration, RemoteRepository};
//!
//! for installation in integration.list_installations().await? {
//!     for handle in integration.list_repositories(&installation).await? {
//!         println!("{} via installation {}", handle.full_name, installation.id);
//!     }
//! }
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
