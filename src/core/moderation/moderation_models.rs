// Moderation domain models - data structures for the message rule chain.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer converts these into Discord-specific actions.

use std::time::Duration;

/// What should happen to a message (and its author) after evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum ModAction {
    /// Message is fine - let it through.
    None,
    /// Delete the message and time the author out.
    Silence {
        /// How long the author stays muted.
        duration: Duration,
        /// Human-readable reason, also attached to the audit log.
        reason: String,
    },
}

impl ModAction {
    /// Shorthand for building a silence decision.
    pub fn silence(duration: Duration, reason: impl Into<String>) -> Self {
        Self::Silence {
            duration,
            reason: reason.into(),
        }
    }
}

/// Outcome of adding a user to the exempt list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// User was added and the list was persisted.
    Added,
    /// User was already on the list; nothing changed, nothing was saved.
    AlreadyExempt,
}

/// Outcome of removing a user from the exempt list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// User was removed and the list was persisted.
    Removed,
    /// User was not on the list; nothing changed, nothing was saved.
    NotExempt,
}
