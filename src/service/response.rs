//! Verification service response decoding and validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format the service uses for `dob`.
pub const DOB_FORMAT: &str = "%d/%m/%Y";

/// Generic message when a failed response carries no `error` field.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// Response body exactly as received; every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVerifyResponse {
    /// Date of birth as `DD/MM/YYYY`.
    #[serde(default)]
    pub dob: Option<String>,
    /// Age in whole years.
    #[serde(default)]
    pub age: Option<u32>,
    /// Adult flag.
    #[serde(default, rename = "is18Plus")]
    pub is_18_plus: Option<bool>,
    /// Face match verdict.
    #[serde(default, rename = "isMatch")]
    pub is_match: Option<bool>,
    /// Face match confidence, 0-100.
    #[serde(default, rename = "matchScore")]
    pub match_score: Option<f64>,
    /// Per-image quality descriptors.
    #[serde(default)]
    pub quality: Option<QualityReport>,
}

/// Body of a non-success response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    /// Server-provided message.
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// The server's message, or the generic fallback.
    pub fn message(&self) -> String {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_SERVER_ERROR)
            .to_string()
    }
}

/// Server-side quality descriptors for each image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Quality of the document image.
    #[serde(default)]
    pub id_quality: Option<String>,
    /// Quality of the selfie.
    #[serde(default)]
    pub selfie_quality: Option<String>,
}

/// A validated verification outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    /// Date of birth as `DD/MM/YYYY`.
    pub dob: String,
    /// Age in whole years.
    pub age: u32,
    /// Adult flag.
    #[serde(rename = "is18Plus")]
    pub is_18_plus: bool,
    /// Face match verdict, if the service reported one.
    #[serde(rename = "isMatch")]
    pub is_match: Option<bool>,
    /// Face match confidence on a 0-100 scale.
    #[serde(rename = "matchScore")]
    pub match_score: Option<f64>,
    /// Per-image quality descriptors.
    pub quality: QualityReport,
}

impl VerificationResult {
    /// Parses `dob` as a calendar date, if it is in the service's format.
    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.dob.trim(), DOB_FORMAT).ok()
    }
}

impl TryFrom<RawVerifyResponse> for VerificationResult {
    type Error = &'static str;

    /// Fails with the name of the first missing required field.
    fn try_from(raw: RawVerifyResponse) -> Result<Self, Self::Error> {
        let dob = raw.dob.filter(|d| !d.trim().is_empty()).ok_or("dob")?;
        let age = raw.age.ok_or("age")?;
        let is_18_plus = raw.is_18_plus.ok_or("is18Plus")?;

        Ok(Self {
            dob,
            age,
            is_18_plus,
            is_match: raw.is_match,
            match_score: raw.match_score,
            quality: raw.quality.unwrap_or_default(),
        })
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NA: &str = "N/A";

        writeln!(f, "Age: {} years", self.age)?;
        writeln!(f, "18+: {}", if self.is_18_plus { "Yes" } else { "No" })?;
        match self.is_match {
            Some(true) => writeln!(f, "Face Match: Match")?,
            Some(false) => writeln!(f, "Face Match: No Match")?,
            None => writeln!(f, "Face Match: {NA}")?,
        }
        match self.match_score {
            Some(score) => writeln!(f, "Match Score: {score:.2}%")?,
            None => writeln!(f, "Match Score: {NA}")?,
        }
        let or_na = |v: &Option<String>| {
            v.as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(NA)
                .to_string()
        };
        writeln!(f, "ID Quality: {}", or_na(&self.quality.id_quality))?;
        write!(f, "Selfie Quality: {}", or_na(&self.quality.selfie_quality))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RawVerifyResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_complete_response() {
        let raw = parse(
            r#"{"dob":"15/08/2001","age":23,"is18Plus":true,"isMatch":true,
                "matchScore":87.456,"quality":{"id_quality":"good","selfie_quality":"fair"}}"#,
        );
        let result = VerificationResult::try_from(raw).unwrap();

        assert_eq!(result.age, 23);
        assert!(result.is_18_plus);
        assert_eq!(result.is_match, Some(true));
        assert_eq!(result.quality.selfie_quality.as_deref(), Some("fair"));
        assert_eq!(
            result.date_of_birth(),
            NaiveDate::from_ymd_opt(2001, 8, 15)
        );
    }

    #[test]
    fn test_optional_fields_absent() {
        let raw = parse(r#"{"dob":"01/01/1990","age":35,"is18Plus":true,"quality":{}}"#);
        let result = VerificationResult::try_from(raw).unwrap();

        assert_eq!(result.is_match, None);
        assert_eq!(result.match_score, None);
        assert_eq!(result.quality, QualityReport::default());
    }

    #[test]
    fn test_missing_required_fields() {
        let missing_age = parse(r#"{"dob":"01/01/1990","is18Plus":true}"#);
        assert_eq!(VerificationResult::try_from(missing_age), Err("age"));

        let missing_flag = parse(r#"{"dob":"01/01/1990","age":35}"#);
        assert_eq!(VerificationResult::try_from(missing_flag), Err("is18Plus"));

        let blank_dob = parse(r#"{"dob":"","age":35,"is18Plus":true}"#);
        assert_eq!(VerificationResult::try_from(blank_dob), Err("dob"));
    }

    #[test]
    fn test_unparseable_dob_is_still_valid() {
        let raw = parse(r#"{"dob":"DOB not found","age":0,"is18Plus":false}"#);
        let result = VerificationResult::try_from(raw).unwrap();
        assert_eq!(result.date_of_birth(), None);
    }

    #[test]
    fn test_error_body_fallback() {
        assert_eq!(parse_error(r#"{"error":"Invalid file format"}"#), "Invalid file format");
        assert_eq!(parse_error(r#"{"details":"boom"}"#), GENERIC_SERVER_ERROR);
        assert_eq!(parse_error(r#"{"error":"  "}"#), GENERIC_SERVER_ERROR);
    }

    fn parse_error(json: &str) -> String {
        serde_json::from_str::<ErrorBody>(json).unwrap().message()
    }

    #[test]
    fn test_display_layout() {
        let result = VerificationResult {
            dob: "01/01/2000".to_string(),
            age: 25,
            is_18_plus: true,
            is_match: None,
            match_score: Some(91.0),
            quality: QualityReport {
                id_quality: Some("good".to_string()),
                selfie_quality: None,
            },
        };
        let text = result.to_string();

        assert!(text.contains("Age: 25 years"));
        assert!(text.contains("18+: Yes"));
        assert!(text.contains("Face Match: N/A"));
        assert!(text.contains("Match Score: 91.00%"));
        assert!(text.contains("ID Quality: good"));
        assert!(text.ends_with("Selfie Quality: N/A"));
    }
}
