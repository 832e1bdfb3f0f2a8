// Moderation service - core business logic for the message rule chain.
//
// Three hard-coded rules, checked in priority order (first match wins):
// 1. Oversized message (> 100 characters) -> 10 minute timeout
// 2. @everyone + link                     -> 24 hour timeout
// 3. @everyone                            -> 12 hour timeout
//
// Exempt authors skip the whole chain.
// NO Discord dependencies here - just pure domain logic.

use super::moderation_models::{AddOutcome, ModAction, RemoveOutcome};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ExemptError {
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting the exempt set.
///
/// Implementations persist after every mutation; a no-op mutation (adding a
/// present user, removing an absent one) must not touch storage.
#[async_trait]
pub trait ExemptStore: Send + Sync {
    /// Membership test - the only query moderation itself needs.
    async fn is_exempt(&self, user_id: u64) -> Result<bool, ExemptError>;

    /// Add a user. Returns `false` if the user was already present.
    async fn add(&self, user_id: u64) -> Result<bool, ExemptError>;

    /// Remove a user. Returns `false` if the user was not present.
    async fn remove(&self, user_id: u64) -> Result<bool, ExemptError>;

    /// Snapshot of the current members, sorted ascending.
    async fn all(&self) -> Result<Vec<u64>, ExemptError>;
}

// ============================================================================
// RULE CHAIN
// ============================================================================

/// Longest message allowed before the length rule fires, in characters.
const MAX_MESSAGE_CHARS: usize = 100;

/// The broadcast mention token that pings every member of a channel.
const BROADCAST_MENTION: &str = "@everyone";

/// Substring that marks a link. Catches both http:// and https://.
const LINK_MARKER: &str = "http";

const OVERSIZE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const MENTION_WITH_LINK_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
const MENTION_TIMEOUT: Duration = Duration::from_secs(12 * 60 * 60);

/// Evaluate message content against the rule chain.
///
/// Callers are expected to have consulted the exempt list already. Matching
/// is case-sensitive substring search with no normalization; length is
/// counted in characters of the raw text. The order of the checks is the
/// rule priority - keep it when adding rules.
pub fn evaluate_content(content: &str) -> ModAction {
    if content.chars().count() > MAX_MESSAGE_CHARS {
        ModAction::silence(OVERSIZE_TIMEOUT, "message exceeds 100 characters")
    } else if content.contains(BROADCAST_MENTION) && content.contains(LINK_MARKER) {
        ModAction::silence(MENTION_WITH_LINK_TIMEOUT, "@everyone + link")
    } else if content.contains(BROADCAST_MENTION) {
        ModAction::silence(MENTION_TIMEOUT, "@everyone mention")
    } else {
        ModAction::None
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Moderation service - ties the rule chain to the exempt list.
pub struct ModerationService<S: ExemptStore> {
    store: S,
}

impl<S: ExemptStore> ModerationService<S> {
    /// Create a new moderation service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Decide what to do with a message.
    ///
    /// Exemption is checked first and unconditionally short-circuits every
    /// rule.
    pub async fn check_message(
        &self,
        author_id: u64,
        content: &str,
    ) -> Result<ModAction, ExemptError> {
        if self.store.is_exempt(author_id).await? {
            return Ok(ModAction::None);
        }

        Ok(evaluate_content(content))
    }

    /// Add a user to the exempt list.
    pub async fn add_exempt(&self, user_id: u64) -> Result<AddOutcome, ExemptError> {
        if self.store.add(user_id).await? {
            Ok(AddOutcome::Added)
        } else {
            Ok(AddOutcome::AlreadyExempt)
        }
    }

    /// Remove a user from the exempt list.
    pub async fn remove_exempt(&self, user_id: u64) -> Result<RemoveOutcome, ExemptError> {
        if self.store.remove(user_id).await? {
            Ok(RemoveOutcome::Removed)
        } else {
            Ok(RemoveOutcome::NotExempt)
        }
    }

    /// Current exempt members, for the list command.
    pub async fn exempt_users(&self) -> Result<Vec<u64>, ExemptError> {
        self.store.all().await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::exemptions::InMemoryExemptStore;

    fn service() -> ModerationService<InMemoryExemptStore> {
        ModerationService::new(InMemoryExemptStore::new())
    }

    fn silence_parts(action: ModAction) -> (Duration, String) {
        match action {
            ModAction::Silence { duration, reason } => (duration, reason),
            ModAction::None => panic!("expected a silence decision"),
        }
    }

    #[test]
    fn normal_message_is_no_action() {
        assert_eq!(evaluate_content("hello there"), ModAction::None);
    }

    #[test]
    fn empty_content_is_no_action() {
        assert_eq!(evaluate_content(""), ModAction::None);
    }

    #[test]
    fn oversized_message_gets_ten_minutes() {
        let content = "a".repeat(101);

        let (duration, reason) = silence_parts(evaluate_content(&content));
        assert_eq!(duration, Duration::from_secs(600));
        assert_eq!(reason, "message exceeds 100 characters");
    }

    #[test]
    fn exactly_100_chars_is_allowed() {
        let content = "a".repeat(100);
        assert_eq!(evaluate_content(&content), ModAction::None);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 100 two-byte characters: 200 bytes, but still within the limit.
        let content = "é".repeat(100);
        assert_eq!(evaluate_content(&content), ModAction::None);

        let (duration, _) = silence_parts(evaluate_content(&"é".repeat(101)));
        assert_eq!(duration, Duration::from_secs(600));
    }

    #[test]
    fn length_rule_outranks_mention_rules() {
        let mut content = "@everyone visit http://spam.example ".to_string();
        content.push_str(&"!".repeat(100));

        let (duration, reason) = silence_parts(evaluate_content(&content));
        assert_eq!(duration, Duration::from_secs(600));
        assert_eq!(reason, "message exceeds 100 characters");
    }

    #[test]
    fn mention_with_link_gets_a_day() {
        let (duration, reason) = silence_parts(evaluate_content("@everyone check http://x"));
        assert_eq!(duration, Duration::from_secs(24 * 60 * 60));
        assert_eq!(reason, "@everyone + link");
    }

    #[test]
    fn mention_alone_gets_twelve_hours() {
        let (duration, reason) = silence_parts(evaluate_content("@everyone big announcement"));
        assert_eq!(duration, Duration::from_secs(12 * 60 * 60));
        assert_eq!(reason, "@everyone mention");
    }

    #[test]
    fn link_marker_is_case_sensitive() {
        // "HTTP" does not match the link marker, so only the plain mention
        // rule fires.
        let (duration, _) = silence_parts(evaluate_content("@everyone check HTTP://x"));
        assert_eq!(duration, Duration::from_secs(12 * 60 * 60));
    }

    #[tokio::test]
    async fn exempt_author_skips_every_rule() {
        let svc = service();
        svc.add_exempt(9).await.unwrap();

        let oversized = "a".repeat(300);
        for content in [oversized.as_str(), "@everyone http://spam.example", "@everyone"] {
            let action = svc.check_message(9, content).await.unwrap();
            assert_eq!(action, ModAction::None, "exempt author was moderated for {content:?}");
        }
    }

    #[tokio::test]
    async fn non_exempt_author_is_moderated() {
        let svc = service();
        svc.add_exempt(9).await.unwrap();

        let action = svc.check_message(10, "@everyone").await.unwrap();
        assert!(matches!(action, ModAction::Silence { .. }));
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let svc = service();

        assert_eq!(svc.add_exempt(5).await.unwrap(), AddOutcome::Added);
        assert_eq!(svc.add_exempt(5).await.unwrap(), AddOutcome::AlreadyExempt);
        assert_eq!(svc.exempt_users().await.unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn remove_of_missing_user_reports_not_exempt() {
        let svc = service();

        assert_eq!(svc.remove_exempt(5).await.unwrap(), RemoveOutcome::NotExempt);
        assert!(svc.exempt_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_then_remove_round_trips() {
        let svc = service();

        svc.add_exempt(1).await.unwrap();
        svc.add_exempt(2).await.unwrap();
        assert_eq!(svc.remove_exempt(1).await.unwrap(), RemoveOutcome::Removed);
        assert_eq!(svc.exempt_users().await.unwrap(), vec![2]);
    }
}
