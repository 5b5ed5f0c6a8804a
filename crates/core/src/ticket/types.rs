//! Incident ticket data types.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Root Cause Categories
// ============================================================================

/// The closed set of incident classifications shared by generation and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RootCause {
    #[serde(rename = "Configuration Error")]
    ConfigurationError,
    #[serde(rename = "Capacity / Load Issue")]
    CapacityLoad,
    #[serde(rename = "Code Regression")]
    CodeRegression,
    #[serde(rename = "Upstream Dependency Failure")]
    UpstreamDependency,
    #[serde(rename = "Data Quality / Inconsistency")]
    DataQuality,
    #[serde(rename = "Environmental / Infrastructure Issue")]
    Environmental,
    #[serde(rename = "Unknown / Insufficient Data")]
    Unknown,
}

impl RootCause {
    /// Every category, in the order prompts list them.
    pub const ALL: [RootCause; 7] = [
        RootCause::ConfigurationError,
        RootCause::CapacityLoad,
        RootCause::CodeRegression,
        RootCause::UpstreamDependency,
        RootCause::DataQuality,
        RootCause::Environmental,
        RootCause::Unknown,
    ];

    /// The label used in prompts and serialized records.
    pub fn as_str(&self) -> &'static str {
        match self {
            RootCause::ConfigurationError => "Configuration Error",
            RootCause::CapacityLoad => "Capacity / Load Issue",
            RootCause::CodeRegression => "Code Regression",
            RootCause::UpstreamDependency => "Upstream Dependency Failure",
            RootCause::DataQuality => "Data Quality / Inconsistency",
            RootCause::Environmental => "Environmental / Infrastructure Issue",
            RootCause::Unknown => "Unknown / Insufficient Data",
        }
    }
}

impl fmt::Display for RootCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Ticket
// ============================================================================

/// How diagnosable a generated ticket is meant to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityLevel {
    Low,
    Medium,
    High,
}

impl AmbiguityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmbiguityLevel::Low => "low",
            AmbiguityLevel::Medium => "medium",
            AmbiguityLevel::High => "high",
        }
    }
}

/// Ticket severity, 1 (most severe) through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(value: u8) -> Result<Self, String> {
        Self::try_from(value)
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Severity(value))
        } else {
            Err(format!(
                "severity must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            ))
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A synthetic incident ticket.
///
/// `true_root_cause` and `ambiguity_level` are ground truth for later
/// analysis and are never shown to the model under evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub short_description: String,
    pub detailed_notes: String,
    pub severity: Severity,
    pub true_root_cause: RootCause,
    pub ambiguity_level: AmbiguityLevel,
}
