//! Evaluation result types.

use serde::{Deserialize, Serialize};

use crate::ticket::RootCause;

/// How sure the model says it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

/// The model's structured answer for one ticket run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub root_cause: RootCause,
    pub confidence: Confidence,
    pub reasoning: String,
    pub recommended_next_action: String,
    pub similar_incidents: Vec<String>,
}

/// Recorded in place of a [`DiagnosticResult`] when the model's text could
/// not be turned into one.
///
/// Serialized as `{"parse_error": true, "raw_output": ..., "error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ParseFailureRepr", try_from = "ParseFailureRepr")]
pub struct ParseFailure {
    /// The verbatim model text.
    pub raw_output: String,
    /// Why extraction failed, when known.
    pub error: Option<String>,
}

impl ParseFailure {
    pub fn new(raw_output: impl Into<String>, error: Option<String>) -> Self {
        Self {
            raw_output: raw_output.into(),
            error,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ParseFailureRepr {
    #[serde(alias = "_parse_error")]
    parse_error: bool,
    raw_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ParseFailure> for ParseFailureRepr {
    fn from(failure: ParseFailure) -> Self {
        Self {
            parse_error: true,
            raw_output: failure.raw_output,
            error: failure.error,
        }
    }
}

impl TryFrom<ParseFailureRepr> for ParseFailure {
    type Error = String;

    fn try_from(repr: ParseFailureRepr) -> Result<Self, Self::Error> {
        if !repr.parse_error {
            return Err("parse failure record must have parse_error = true".to_string());
        }
        Ok(ParseFailure {
            raw_output: repr.raw_output,
            error: repr.error,
        })
    }
}

/// What one evaluation run produced.
///
/// Consumers must match on the variant before reading typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelOutput {
    Diagnostic(DiagnosticResult),
    ParseFailure(ParseFailure),
}

impl ModelOutput {
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, ModelOutput::ParseFailure(_))
    }

    pub fn diagnostic(&self) -> Option<&DiagnosticResult> {
        match self {
            ModelOutput::Diagnostic(result) => Some(result),
            ModelOutput::ParseFailure(_) => None,
        }
    }

    /// Label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            ModelOutput::Diagnostic(_) => "diagnostic",
            ModelOutput::ParseFailure(_) => "parse_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_diagnostic_round_trip() {
        let output = ModelOutput::Diagnostic(DiagnosticResult {
            root_cause: RootCause::CodeRegression,
            confidence: Confidence::High,
            reasoning: "Started right after the 14:00 release".to_string(),
            recommended_next_action: "Roll back build 4.2.1".to_string(),
            similar_incidents: vec!["INC-77".to_string()],
        });

        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["root_cause"], "Code Regression");
        assert_eq!(value["confidence"], "High");
        assert!(value.get("parse_error").is_none());

        let back: ModelOutput = serde_json::from_value(value).unwrap();
        assert_eq!(back, output);
    }

    #[test]
    fn test_parse_failure_shape() {
        let output = ModelOutput::ParseFailure(ParseFailure::new("not json", None));
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value, json!({"parse_error": true, "raw_output": "not json"}));

        let back: ModelOutput = serde_json::from_value(value).unwrap();
        assert!(back.is_parse_failure());
    }

    #[test]
    fn test_legacy_underscore_marker_accepted() {
        let value = json!({"_parse_error": true, "raw_output": "oops"});
        let output: ModelOutput = serde_json::from_value(value).unwrap();
        match output {
            ModelOutput::ParseFailure(failure) => assert_eq!(failure.raw_output, "oops"),
            ModelOutput::Diagnostic(_) => panic!("expected parse failure"),
        }
    }

    #[test]
    fn test_false_marker_rejected() {
        let value = json!({"parse_error": false, "raw_output": "oops"});
        assert!(serde_json::from_value::<ModelOutput>(value).is_err());
    }

    #[test]
    fn test_confidence_accepts_lowercase() {
        let c: Confidence = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(c, Confidence::Medium);
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"Medium\"");
    }

    #[test]
    fn test_partial_diagnostic_rejected() {
        let value = json!({"root_cause": "Code Regression", "confidence": "High"});
        assert!(serde_json::from_value::<DiagnosticResult>(value).is_err());
    }
}
