//! publish::request
//!
//! A validated publication request.

use chrono::NaiveDateTime;

use super::PublishError;
use crate::core::types::RepoFullName;

/// One upload to publish. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicationRequest {
    vocabulary_name: String,
    repository: RepoFullName,
    file_name: String,
    content: Vec<u8>,
    request_time: NaiveDateTime,
}

// Content is summarized rather than dumped
impl std::fmt::Debug for PublicationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicationRequest")
            .field("vocabulary_name", &self.vocabulary_name)
            .field("repository", &self.repository)
            .field("file_name", &self.file_name)
            .field("content_len", &self.content.len())
            .field("request_time", &self.request_time)
            .finish()
    }
}

impl PublicationRequest {
    /// Build a request, rejecting missing or malformed fields.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Validation` if the vocabulary name is blank,
    /// the repository is not `owner/name`, the file name is blank or
    /// absolute, or the content is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use vocab_publisher::publish::PublicationRequest;
    ///
    /// let time = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 0).unwrap();
    /// let request = PublicationRequest::new("animals", "org/vocabs", "animals.rdf", b"<rdf/>".to_vec(), time).unwrap();
    /// assert_eq!(request.repository().owner(), "org");
    ///
    /// assert!(PublicationRequest::new("", "org/vocabs", "animals.rdf", b"<rdf/>".to_vec(), time).is_err());
    /// ```
    pub fn new(
        vocabulary_name: impl Into<String>,
        repository_full_name: &str,
        file_name: impl Into<String>,
        content: Vec<u8>,
        request_time: NaiveDateTime,
    ) -> Result<Self, PublishError> {
        let vocabulary_name = vocabulary_name.into();
        if vocabulary_name.trim().is_empty() {
            return Err(PublishError::Validation(
                "vocabulary name is required".into(),
            ));
        }

        let repository = RepoFullName::new(repository_full_name)
            .map_err(|e| PublishError::Validation(e.to_string()))?;

        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(PublishError::Validation("file name is required".into()));
        }
        if file_name.starts_with('/') {
            return Err(PublishError::Validation(format!(
                "file name '{}' must be relative to the repository root",
                file_name
            )));
        }

        if content.is_empty() {
            return Err(PublishError::Validation("file content is empty".into()));
        }

        Ok(Self {
            vocabulary_name,
            repository,
            file_name,
            content,
            request_time,
        })
    }

    pub fn vocabulary_name(&self) -> &str {
        &self.vocabulary_name
    }

    pub fn repository(&self) -> &RepoFullName {
        &self.repository
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn request_time(&self) -> NaiveDateTime {
        self.request_time
    }
}
