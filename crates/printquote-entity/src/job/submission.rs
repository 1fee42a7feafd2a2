//! Raw submission body as received from clients.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A quote submission before admission policy is applied.
///
/// Every field is optional at the type level so that a missing required
/// field is reported as a validation error rather than a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct JobSubmission {
    /// Input model URL (required).
    #[validate(
        required(message = "download_url is required"),
        url(message = "download_url must be a valid URL")
    )]
    pub download_url: Option<String>,
    /// Material name.
    #[validate(length(min = 1, max = 32, message = "material must not be empty"))]
    pub material: Option<String>,
    /// Layer height in millimetres.
    pub layer_height: Option<f64>,
    /// Infill percentage (required).
    #[validate(
        required(message = "infill is required"),
        range(min = 0, max = 100, message = "infill must be between 0 and 100")
    )]
    pub infill: Option<i64>,
    /// Rush order flag.
    pub rush: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> JobSubmission {
        JobSubmission {
            download_url: Some("https://x/model.stl".to_string()),
            infill: Some(15),
            ..JobSubmission::default()
        }
    }

    #[test]
    fn test_minimal_submission_is_valid() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_missing_infill_rejected() {
        let submission = JobSubmission {
            infill: None,
            ..valid()
        };
        let errors = submission.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("infill"));
    }

    #[test]
    fn test_infill_out_of_range_rejected() {
        let submission = JobSubmission {
            infill: Some(101),
            ..valid()
        };
        assert!(submission.validate().is_err());
    }

    #[test]
    fn test_malformed_url_rejected() {
        let submission = JobSubmission {
            download_url: Some("not a url".to_string()),
            ..valid()
        };
        let errors = submission.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("download_url"));
    }
}
