// In-memory implementation of ExemptStore.
//
// No persistence. Used by the core unit tests, and handy when running the
// bot somewhere the filesystem is throwaway anyway.

use crate::core::moderation::{ExemptError, ExemptStore};
use async_trait::async_trait;
use dashmap::DashSet;

#[derive(Default)]
pub struct InMemoryExemptStore {
    users: DashSet<u64>,
}

impl InMemoryExemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExemptStore for InMemoryExemptStore {
    async fn is_exempt(&self, user_id: u64) -> Result<bool, ExemptError> {
        Ok(self.users.contains(&user_id))
    }

    async fn add(&self, user_id: u64) -> Result<bool, ExemptError> {
        Ok(self.users.insert(user_id))
    }

    async fn remove(&self, user_id: u64) -> Result<bool, ExemptError> {
        Ok(self.users.remove(&user_id).is_some())
    }

    async fn all(&self) -> Result<Vec<u64>, ExemptError> {
        let mut users: Vec<u64> = self.users.iter().map(|u| *u).collect();
        users.sort_unstable();
        Ok(users)
    }
}
