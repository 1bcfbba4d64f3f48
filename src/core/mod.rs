//! core
//!
//! Core domain types and configuration for vocab-publisher.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, RepoFullName
//! - [`naming`] - Branch, commit and pull request templates
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing rejects malformed requests before any remote call
//! - Schemas are strict and self-describing
//! - Template rendering is deterministic

pub mod config;
pub mod naming;
pub mod types;
