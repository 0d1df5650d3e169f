//! Status badges for block and payment rows.
//!
//! Blocks and payments report status as free-form strings. Each gets its own
//! closed type so a payment status can never be classified with the block
//! table or vice versa. Unknown strings are kept verbatim for display and
//! classify as [`Badge::Neutral`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Presentation category used to pick a badge style.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Badge {
    Success,
    Warning,
    #[default]
    Neutral,
}

/// Status of a found block.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum BlockStatus {
    #[strum(serialize = "confirmed")]
    Confirmed,
    #[strum(serialize = "pending")]
    Pending,
    #[strum(default)]
    Other(String),
}

impl BlockStatus {
    pub fn badge(&self) -> Badge {
        match self {
            BlockStatus::Confirmed => Badge::Success,
            BlockStatus::Pending => Badge::Warning,
            BlockStatus::Other(_) => Badge::Neutral,
        }
    }

    /// The status as the API reported it.
    pub fn as_str(&self) -> &str {
        match self {
            BlockStatus::Confirmed => "confirmed",
            BlockStatus::Pending => "pending",
            BlockStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for BlockStatus {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or(BlockStatus::Other(raw))
    }
}

impl From<BlockStatus> for String {
    fn from(status: BlockStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Default for BlockStatus {
    fn default() -> Self {
        BlockStatus::Other(String::new())
    }
}

/// Status of a payout.
#[derive(Debug, Clone, PartialEq, Eq, EnumString, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    #[strum(serialize = "completed")]
    Completed,
    #[strum(serialize = "pending")]
    Pending,
    #[strum(default)]
    Other(String),
}

impl PaymentStatus {
    pub fn badge(&self) -> Badge {
        match self {
            PaymentStatus::Completed => Badge::Success,
            PaymentStatus::Pending => Badge::Warning,
            PaymentStatus::Other(_) => Badge::Neutral,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or(PaymentStatus::Other(raw))
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Other(String::new())
    }
}

/// Classify a raw block status string.
pub fn classify_block_status(raw: &str) -> Badge {
    BlockStatus::from(raw.to_string()).badge()
}

/// Classify a raw payment status string.
pub fn classify_payment_status(raw: &str) -> Badge {
    PaymentStatus::from(raw.to_string()).badge()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("confirmed", Badge::Success; "confirmed")]
    #[test_case("pending", Badge::Warning; "pending")]
    #[test_case("orphaned", Badge::Neutral; "orphaned")]
    #[test_case("", Badge::Neutral; "empty")]
    #[test_case("Confirmed", Badge::Neutral; "case_sensitive")]
    #[test_case("completed", Badge::Neutral; "payment_word_is_not_a_block_status")]
    fn block_status_badges(raw: &str, expected: Badge) {
        assert_eq!(classify_block_status(raw), expected);
    }

    #[test_case("completed", Badge::Success; "completed")]
    #[test_case("pending", Badge::Warning; "pending")]
    #[test_case("failed", Badge::Neutral; "failed")]
    #[test_case("", Badge::Neutral; "empty")]
    #[test_case("confirmed", Badge::Neutral; "block_word_is_not_a_payment_status")]
    fn payment_status_badges(raw: &str, expected: Badge) {
        assert_eq!(classify_payment_status(raw), expected);
    }

    #[test]
    fn unknown_status_keeps_its_label() {
        let status = BlockStatus::from("orphaned".to_string());
        assert_eq!(status, BlockStatus::Other("orphaned".to_string()));
        assert_eq!(status.as_str(), "orphaned");
    }

    #[test]
    fn deserializes_from_wire_string() {
        let status: PaymentStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, PaymentStatus::Completed);

        let status: BlockStatus = serde_json::from_str("\"stale\"").unwrap();
        assert_eq!(status.badge(), Badge::Neutral);
    }

    #[test]
    fn badge_names_are_lowercase() {
        assert_eq!(Badge::Success.to_string(), "success");
        assert_eq!(Badge::Neutral.as_ref(), "neutral");
        assert_eq!(Badge::default(), Badge::Neutral);
    }
}
