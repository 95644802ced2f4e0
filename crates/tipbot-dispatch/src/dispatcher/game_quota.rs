use std::sync::Arc;
use std::time::Duration;

use tipbot_core::{EphemeralStore, StoreError, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Giveaway,
    Giveflip,
    Coinflip,
}

impl GameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Giveaway => "giveaway",
            Self::Giveflip => "giveflip",
            Self::Coinflip => "coinflip",
        }
    }

    fn has_cooldown(self) -> bool {
        !matches!(self, Self::Giveaway)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCheck {
    Allowed,
    RateLimited,
    OverQuota,
}

#[derive(Debug, Clone, Copy)]
pub struct GameQuotaConfig {
    pub cooldown: Duration,
    pub join_quota: u64,
    pub window: Duration,
}

impl Default for GameQuotaConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(30 * 60),
            join_quota: 10,
            window: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Creation cooldowns and daily creation quotas for group games.
pub struct GameQuota {
    store: Arc<dyn EphemeralStore>,
    config: GameQuotaConfig,
}

fn cooldown_key(kind: GameKind, user: UserId) -> String {
    format!("recent{}:{user}", kind.as_str())
}

fn quota_key(kind: GameKind, user: UserId) -> String {
    format!("{}quota:{user}", kind.as_str())
}

impl GameQuota {
    pub fn new(store: Arc<dyn EphemeralStore>, config: GameQuotaConfig) -> Self {
        Self { store, config }
    }

    /// Rate check first, then the quota counter. Read-only: nothing is
    /// counted until `record_creation`.
    pub fn check_creation(&self, kind: GameKind, user: UserId) -> Result<GameCheck, StoreError> {
        if kind.has_cooldown() && self.store.exists(&cooldown_key(kind, user))? {
            return Ok(GameCheck::RateLimited);
        }
        let created = self
            .store
            .get(&quota_key(kind, user))?
            .and_then(|count| count.trim().parse::<u64>().ok())
            .unwrap_or(0);
        if created >= self.config.join_quota {
            return Ok(GameCheck::OverQuota);
        }
        Ok(GameCheck::Allowed)
    }

    /// Counts a posted game and starts its cooldown.
    pub fn record_creation(&self, kind: GameKind, user: UserId) -> Result<(), StoreError> {
        self.store.increment(&quota_key(kind, user), self.config.window)?;
        if !kind.has_cooldown() {
            return Ok(());
        }
        self.store
            .set(&cooldown_key(kind, user), "t", Some(self.config.cooldown))
    }
}
