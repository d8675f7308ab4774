//! Wire types shared by the page, background and popup contexts.
//!
//! Field names match the JSON the analysis service speaks. Required fields
//! (`verdict.label`, `verdict.score`) fail deserialization when missing;
//! everything else degrades to an empty or unknown value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One read of a page: where it is, what it is called, what it says.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub text: String,
}

/// Overall credibility verdict for a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: String,
    pub score: f64,
}

/// Evidentiary status of a single claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClaimLabel {
    Core,
    Partial,
    Disputed,
    #[default]
    Unknown,
}

impl ClaimLabel {
    pub fn all() -> &'static [ClaimLabel] {
        &[Self::Core, Self::Partial, Self::Disputed, Self::Unknown]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::Partial => "Partial",
            Self::Disputed => "Disputed",
            Self::Unknown => "Unknown",
        }
    }

    /// Lowercase form used as the badge css class.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Partial => "partial",
            Self::Disputed => "disputed",
            Self::Unknown => "unknown",
        }
    }

    /// Exact-match lookup; anything else is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Core" => Self::Core,
            "Partial" => Self::Partial,
            "Disputed" => Self::Disputed,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ClaimLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for ClaimLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ClaimLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw
            .as_str()
            .map(ClaimLabel::from_label)
            .unwrap_or_default())
    }
}

/// A link backing or contradicting a claim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stance: String,
}

/// A claim found in the page, with its label and evidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default)]
    pub label: ClaimLabel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidence: Vec<Evidence>,
}

/// Response body of the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub verdict: Verdict,
    #[serde(default, deserialize_with = "null_as_default")]
    pub claims: Vec<Claim>,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
