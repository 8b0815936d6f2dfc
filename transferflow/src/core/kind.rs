//! Operation kinds.

use crate::errors::BuildError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of step kinds a folder mapping can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Enables content inspection for later Copy/Verify steps.
    Inspect,
    /// Transfers origin files to the destination.
    Copy,
    /// Checks that every origin file reached the destination.
    Verify,
    /// Moves origin files to the success folder.
    Move,
    /// Deletes origin files.
    Delete,
    /// Hands the execution report to the notifier.
    Notify,
}

impl OperationKind {
    /// All kinds, in pipeline order.
    pub const ALL: [Self; 6] = [
        Self::Inspect,
        Self::Copy,
        Self::Verify,
        Self::Move,
        Self::Delete,
        Self::Notify,
    ];

    /// Returns the label used for this kind in execution reports.
    #[must_use]
    pub fn report_label(&self) -> &'static str {
        match self {
            Self::Inspect => "Content inspection",
            Self::Copy => "Copy to destination",
            Self::Verify => "Destination verification",
            Self::Move => "Move to success folder",
            Self::Delete => "Delete origin files",
            Self::Notify => "Notification",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inspect => write!(f, "inspect"),
            Self::Copy => write!(f, "copy"),
            Self::Verify => write!(f, "verify"),
            Self::Move => write!(f, "move"),
            Self::Delete => write!(f, "delete"),
            Self::Notify => write!(f, "notify"),
        }
    }
}

impl FromStr for OperationKind {
    type Err = BuildError;

    /// Parses a kind, ignoring ASCII case. `check` is accepted for Verify.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(BuildError::EmptySpec);
        }
        match token.to_ascii_lowercase().as_str() {
            "inspect" => Ok(Self::Inspect),
            "copy" => Ok(Self::Copy),
            "verify" | "check" => Ok(Self::Verify),
            "move" => Ok(Self::Move),
            "delete" => Ok(Self::Delete),
            "notify" => Ok(Self::Notify),
            _ => Err(BuildError::UnknownKind(token.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("COPY".parse::<OperationKind>(), Ok(OperationKind::Copy));
        assert_eq!("Inspect".parse::<OperationKind>(), Ok(OperationKind::Inspect));
        assert_eq!(" delete ".parse::<OperationKind>(), Ok(OperationKind::Delete));
    }

    #[test]
    fn test_check_alias() {
        assert_eq!("check".parse::<OperationKind>(), Ok(OperationKind::Verify));
        assert_eq!("verify".parse::<OperationKind>(), Ok(OperationKind::Verify));
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            "upload".parse::<OperationKind>(),
            Err(BuildError::UnknownKind("upload".to_string()))
        );
        assert_eq!("".parse::<OperationKind>(), Err(BuildError::EmptySpec));
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.to_string().parse::<OperationKind>(), Ok(kind));
        }
    }
}
