//! vocab-publisher - Publish vocabulary documents to GitHub as pull requests
//!
//! An uploaded vocabulary (an RDF/XML document) is committed to a new
//! branch of a repository the GitHub App is installed on, and a pull
//! request into the default branch is opened for review.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface (`serve`, `publish`, `render`)
//! - [`server`] - HTTP upload endpoint
//! - [`publish`] - Repository lookup and the branch → commit → PR workflow
//! - [`core`] - Configuration, naming templates and validated types
//! - [`forge`] - Remote host abstraction with GitHub and in-memory backends
//! - [`auth`] - GitHub App JWTs and installation tokens
//!
//! # Guarantees
//!
//! 1. A result is only returned once the pull request is open
//! 2. Every failure names the step, repository, branch and file involved
//! 3. Branch and file writes rely on the remote for conflict detection

pub mod auth;
pub mod cli;
pub mod core;
pub mod forge;
pub mod publish;
pub mod server;
