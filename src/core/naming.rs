//! core::naming
//!
//! Placeholder substitution for the configured branch, commit and pull
//! request templates.
//!
//! # Placeholders
//!
//! | token               | value                                  |
//! |---------------------|----------------------------------------|
//! | `%vocabulary_name%` | the vocabulary being published         |
//! | `%timestamp%`       | `YYYYMMDDhhmm`, e.g. `202401020304`    |
//! | `%datetime%`        | `DD/MM/YYYY hh:mm`, e.g. `02/01/2024 03:04` |
//! | `%date%`            | `DD/MM/YYYY`, e.g. `02/01/2024`        |
//!
//! Anything else, including unknown `%...%` tokens, is copied verbatim.
//!
//! All four templates of one publication are rendered from the same
//! [`TemplateValues`], so they agree on the request time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Default branch name template.
pub const DEFAULT_BRANCH_TEMPLATE: &str = "%timestamp%_%vocabulary_name%";
/// Default commit message template.
pub const DEFAULT_COMMIT_MESSAGE_TEMPLATE: &str = "Commit into %vocabulary_name% vocabulary";
/// Default pull request title template.
pub const DEFAULT_PR_TITLE_TEMPLATE: &str = "Release: %date% - %vocabulary_name%";
/// Default pull request description template.
pub const DEFAULT_PR_DESCRIPTION_TEMPLATE: &str = "Description of the release";

/// Per-request values substituted into templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValues {
    pub vocabulary_name: String,
    pub timestamp: String,
    pub datetime: String,
    pub date: String,
}

impl TemplateValues {
    /// Snapshot the values for `vocabulary_name` published at `time`.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use vocab_publisher::core::naming::TemplateValues;
    ///
    /// let time = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 0).unwrap();
    /// let values = TemplateValues::new("animals", time);
    /// assert_eq!(values.timestamp, "202401020304");
    /// assert_eq!(values.datetime, "02/01/2024 03:04");
    /// assert_eq!(values.date, "02/01/2024");
    /// ```
    pub fn new(vocabulary_name: &str, time: NaiveDateTime) -> Self {
        Self {
            vocabulary_name: vocabulary_name.to_string(),
            timestamp: time.format("%Y%m%d%H%M").to_string(),
            datetime: time.format("%d/%m/%Y %H:%M").to_string(),
            date: time.format("%d/%m/%Y").to_string(),
        }
    }
}

/// Substitute recognized placeholders in `template`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use vocab_publisher::core::naming::{render, TemplateValues};
///
/// let time = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 0).unwrap();
/// let values = TemplateValues::new("animals", time);
/// assert_eq!(render("%timestamp%_%vocabulary_name%", &values), "202401020304_animals");
/// assert_eq!(render("%unknown%", &values), "%unknown%");
/// ```
pub fn render(template: &str, values: &TemplateValues) -> String {
    template
        .replace("%vocabulary_name%", &values.vocabulary_name)
        .replace("%timestamp%", &values.timestamp)
        .replace("%datetime%", &values.datetime)
        .replace("%date%", &values.date)
}

/// The four configured templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateSet {
    pub branch_name: String,
    pub commit_message: String,
    pub pull_request_title: String,
    pub pull_request_description: String,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            branch_name: DEFAULT_BRANCH_TEMPLATE.to_string(),
            commit_message: DEFAULT_COMMIT_MESSAGE_TEMPLATE.to_string(),
            pull_request_title: DEFAULT_PR_TITLE_TEMPLATE.to_string(),
            pull_request_description: DEFAULT_PR_DESCRIPTION_TEMPLATE.to_string(),
        }
    }
}

impl TemplateSet {
    /// Render every template from one set of values.
    pub fn render(&self, values: &TemplateValues) -> RenderedNames {
        RenderedNames {
            branch: render(&self.branch_name, values),
            commit_message: render(&self.commit_message, values),
            pr_title: render(&self.pull_request_title, values),
            pr_description: render(&self.pull_request_description, values),
        }
    }
}

/// Templates after substitution for one publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNames {
    pub branch: String,
    pub commit_message: String,
    pub pr_title: String,
    pub pr_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 0)
            .unwrap()
    }

    #[test]
    fn default_templates_render() {
        let names = TemplateSet::default().render(&TemplateValues::new("animals", time()));

        assert_eq!(names.branch, "202401020304_animals");
        assert_eq!(names.commit_message, "Commit into animals vocabulary");
        assert_eq!(names.pr_title, "Release: 02/01/2024 - animals");
        assert_eq!(names.pr_description, "Description of the release");
    }

    #[test]
    fn datetime_is_not_clobbered_by_date() {
        let values = TemplateValues::new("animals", time());
        assert_eq!(render("at %datetime%", &values), "at 02/01/2024 03:04");
    }

    #[test]
    fn repeated_placeholders_all_replaced() {
        let values = TemplateValues::new("animals", time());
        assert_eq!(
            render("%vocabulary_name%-%vocabulary_name%", &values),
            "animals-animals"
        );
    }

    #[test]
    fn unknown_placeholders_pass_through() {
        let values = TemplateValues::new("animals", time());
        assert_eq!(
            render("%author% %vocabulary_name% 100%", &values),
            "%author% animals 100%"
        );
    }

    #[test]
    fn single_digit_fields_are_zero_padded() {
        let time = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 9, 0)
            .unwrap();
        let values = TemplateValues::new("v", time);
        assert_eq!(values.timestamp, "202403050709");
        assert_eq!(values.datetime, "05/03/2024 07:09");
    }

    #[test]
    fn template_set_deserializes_partial_toml() {
        let set: TemplateSet = toml::from_str("branch_name = \"vocab/%vocabulary_name%\"").unwrap();
        assert_eq!(set.branch_name, "vocab/%vocabulary_name%");
        assert_eq!(set.commit_message, DEFAULT_COMMIT_MESSAGE_TEMPLATE);
    }
}
