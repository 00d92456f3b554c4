use crate::error::{ModelError, Result};
use std::fmt;

/// Label attached to a skip interval.
///
/// `Opening` and `Ending` drive the skip affordances; anything else is kept
/// verbatim and only shows up as cue text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SkipLabel {
    Opening,
    Ending,
    Other(String),
}

impl SkipLabel {
    pub fn as_str(&self) -> &str {
        match self {
            SkipLabel::Opening => "Opening",
            SkipLabel::Ending => "Ending",
            SkipLabel::Other(text) => text,
        }
    }
}

impl From<&str> for SkipLabel {
    fn from(value: &str) -> Self {
        match value {
            "Opening" => SkipLabel::Opening,
            "Ending" => SkipLabel::Ending,
            other => SkipLabel::Other(other.to_string()),
        }
    }
}

impl From<String> for SkipLabel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Opening" => SkipLabel::Opening,
            "Ending" => SkipLabel::Ending,
            _ => SkipLabel::Other(value),
        }
    }
}

impl fmt::Display for SkipLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SkipLabel {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SkipLabel {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(SkipLabel::from(raw))
    }
}

/// Labeled time range of an episode, in seconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SkipInterval {
    pub start_time: f64,
    pub end_time: f64,
    #[cfg_attr(feature = "serde", serde(alias = "text"))]
    pub label: SkipLabel,
}

impl SkipInterval {
    /// Build a validated interval (`0 <= start < end`).
    pub fn new(
        start_time: f64,
        end_time: f64,
        label: impl Into<SkipLabel>,
    ) -> Result<Self> {
        if !(start_time >= 0.0 && end_time > start_time) {
            return Err(ModelError::InvalidInterval {
                start_time,
                end_time,
            });
        }
        Ok(Self {
            start_time,
            end_time,
            label: label.into(),
        })
    }

    /// Open-range containment: both boundaries are excluded.
    pub fn strictly_contains(&self, t: f64) -> bool {
        t > self.start_time && t < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_strings() {
        assert_eq!(SkipLabel::from("Opening"), SkipLabel::Opening);
        assert_eq!(SkipLabel::from("Ending"), SkipLabel::Ending);
        assert_eq!(
            SkipLabel::from("Recap"),
            SkipLabel::Other("Recap".to_string())
        );
        assert_eq!(SkipLabel::Other("Recap".into()).to_string(), "Recap");
    }

    #[test]
    fn interval_rejects_inverted_ranges() {
        assert!(SkipInterval::new(90.0, 10.0, "Opening").is_err());
        assert!(SkipInterval::new(-1.0, 10.0, "Opening").is_err());
        assert!(SkipInterval::new(5.0, 5.0, "Opening").is_err());
        assert!(SkipInterval::new(0.0, 90.0, "Opening").is_ok());
    }

    #[test]
    fn containment_excludes_both_boundaries() {
        let op = SkipInterval::new(0.0, 90.0, "Opening").unwrap();
        assert!(!op.strictly_contains(0.0));
        assert!(op.strictly_contains(0.5));
        assert!(op.strictly_contains(89.9));
        assert!(!op.strictly_contains(90.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn interval_accepts_legacy_text_field() {
        let parsed: SkipInterval = serde_json::from_str(
            r#"{"startTime": 1310, "endTime": 1400, "text": "Ending"}"#,
        )
        .unwrap();
        assert_eq!(parsed.label, SkipLabel::Ending);
        assert_eq!(parsed.start_time, 1310.0);
    }
}
