// Core moderation module - the rule chain and the exempt-list port.

pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
