// The infra module contains implementations of core traits plus the
// hosting-platform plumbing. Each feature implementation goes in its own
// submodule.

#[path = "exemptions/exempt_store.rs"]
pub mod exemptions;

#[path = "web/mod.rs"]
pub mod web;
