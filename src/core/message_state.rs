//! Position of a fragment within a logical message

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tags each fragment delivered to an appender.
///
/// | state      | prefix | line terminator |
/// |------------|--------|-----------------|
/// | `Complete` | yes    | yes             |
/// | `Begin`    | yes    | no              |
/// | `Continue` | no     | no              |
/// | `End`      | no     | yes             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MessageState {
    #[default]
    Complete,
    Begin,
    Continue,
    End,
}

impl MessageState {
    /// Whether the configured prefix is rendered in front of this fragment.
    #[inline]
    pub fn has_prefix(&self) -> bool {
        matches!(self, MessageState::Complete | MessageState::Begin)
    }

    /// Whether a line terminator follows this fragment.
    #[inline]
    pub fn has_terminator(&self) -> bool {
        matches!(self, MessageState::Complete | MessageState::End)
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            MessageState::Complete => "complete",
            MessageState::Begin => "begin",
            MessageState::Continue => "continue",
            MessageState::End => "end",
        }
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}
