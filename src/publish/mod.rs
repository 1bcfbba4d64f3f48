//! publish
//!
//! Publication of an uploaded vocabulary as a pull request.
//!
//! # Modules
//!
//! - [`request`] - Validated [`PublicationRequest`]
//! - [`locator`] - Repository lookup across installations
//! - [`orchestrator`] - The [`Publisher`] workflow
//! - [`result`] - [`PublicationResult`]
//! - [`errors`] - [`PublishError`] taxonomy
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use vocab_publisher::core::naming::TemplateSet;
//! use vocab_publisher::forge::mock::MockIntegration;
//! use vocab_publisher::publish::{PublicationRequest, Publisher};
//!
//! # tokio_test::block_on(async {
//! let integration = MockIntegration::new().with_installation(1, "org", &["org/vocabs"]);
//! let publisher = Publisher::new(Arc::new(integration), TemplateSet::default(), "main");
//!
//! let time = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 0).unwrap();
//! let request = PublicationRequest::new("animals", "org/vocabs", "animals.rdf", b"<rdf/>".to_vec(), time).unwrap();
//!
//! let result = publisher.publish(&request).await.unwrap();
//! assert_eq!(result.branch_name, "202401020304_animals");
//! # });
//! ```

pub mod errors;
pub mod locator;
pub mod orchestrator;
pub mod request;
pub mod result;

pub use errors::{PublishError, PublishStep};
pub use locator::{locate, LocateError};
pub use orchestrator::Publisher;
pub use request::PublicationRequest;
pub use result::PublicationResult;
