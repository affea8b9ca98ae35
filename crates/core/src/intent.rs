//! Intent classification result.
//!
//! The oracle's free-text reply is decoded into this tagged variant at the
//! untrusted-text boundary; downstream code never dispatches on raw strings.

use serde::{Deserialize, Serialize};

/// The outcome of classifying an utterance against the closed topic set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    /// The utterance belongs to one of the configured topics.
    Topic { label: String },

    /// No topic matched; the fallback answer path is taken.
    Unmatched,
}

impl Intent {
    pub fn topic(label: impl Into<String>) -> Self {
        Self::Topic {
            label: label.into(),
        }
    }

    pub fn is_unmatched(&self) -> bool {
        matches!(self, Intent::Unmatched)
    }

    /// The matched topic label, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Intent::Topic { label } => Some(label),
            Intent::Unmatched => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_intent_exposes_label() {
        let intent = Intent::topic("kakao_sink");
        assert!(!intent.is_unmatched());
        assert_eq!(intent.label(), Some("kakao_sink"));
    }

    #[test]
    fn unmatched_has_no_label() {
        assert!(Intent::Unmatched.is_unmatched());
        assert_eq!(Intent::Unmatched.label(), None);
    }
}
