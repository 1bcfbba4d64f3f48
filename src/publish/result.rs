//! publish::result

use serde::Serialize;

/// Outcome of a publication that opened a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicationResult {
    pub repository_full_name: String,
    pub pushed_file_name: String,
    pub branch_name: String,
    pub pull_request_url: String,
}

impl PublicationResult {
    /// Human-readable summary for the uploader.
    ///
    /// ```
    /// use vocab_publisher::publish::PublicationResult;
    ///
    /// let result = PublicationResult {
    ///     repository_full_name: "org/vocabs".into(),
    ///     pushed_file_name: "animals.rdf".into(),
    ///     branch_name: "202401020304_animals".into(),
    ///     pull_request_url: "https://github.com/org/vocabs/pull/7".into(),
    /// };
    /// assert_eq!(
    ///     result.summary("upload.rdf"),
    ///     "upload.rdf is correctly committed as animals.rdf to github repository on branch \
    ///      202401020304_animals. See PR at https://github.com/org/vocabs/pull/7"
    /// );
    /// ```
    pub fn summary(&self, original_filename: &str) -> String {
        format!(
            "{} is correctly committed as {} to github repository on branch {}. See PR at {}",
            original_filename, self.pushed_file_name, self.branch_name, self.pull_request_url
        )
    }
}
