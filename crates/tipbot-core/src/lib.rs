//! Foundational types shared across tipbot crates.
//!
//! Provides the chat-side domain handles (actors, conversations, inbound
//! messages), the narrow collaborator contracts the command engine consumes
//! (ledger, chat transport, user directory, analytics, external apps), and the
//! ephemeral keyed store used for challenge tokens, quotas and pending prompts.

pub mod collaborators;
pub mod domain;
pub mod ephemeral_store;
pub mod time_utils;

pub use collaborators::*;
pub use domain::*;
pub use ephemeral_store::{EphemeralStore, MemoryStore, RedbStore, StoreError};
pub use time_utils::{current_unix_timestamp_ms, is_expired_unix_ms, unix_deadline_ms};
