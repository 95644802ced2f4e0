use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tipbot_core::{EphemeralStore, MemoryStore, RedbStore};
use tipbot_dispatch::{AnalyticsQueueConfig, DispatchSettings, GameQuotaConfig};
use tipbot_lnurl::WithdrawIssuerConfig;

use crate::cli_args::{Cli, CliStoreKind};

const REDB_FILE_NAME: &str = "tipbot.redb";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Redb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Runtime settings resolved from flags and `TIPBOT_*` variables.
pub struct BotSettings {
    pub service_id: String,
    pub service_url: String,
    pub bind: String,
    pub invoice_timeout: Duration,
    pub hidden_message_timeout: Duration,
    pub withdraw_margin_threshold_msat: u64,
    pub withdraw_margin_percent: u64,
    pub analytics_queue_capacity: usize,
    pub analytics_timeout_ms: u64,
    pub lnurl_timeout_ms: u64,
    pub coinflip_cooldown: Duration,
    pub game_join_quota: u64,
    pub game_quota_window: Duration,
    pub store: StoreKind,
    pub store_sweep_interval: Duration,
    pub state_dir: PathBuf,
    pub default_locale: String,
    pub log_filter: Option<String>,
}

impl BotSettings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            service_id: cli.service_id.trim().trim_start_matches('@').to_string(),
            service_url: cli.service_url.trim().trim_end_matches('/').to_string(),
            bind: cli.bind.clone(),
            invoice_timeout: Duration::from_secs(cli.invoice_timeout_seconds),
            hidden_message_timeout: Duration::from_secs(cli.hidden_message_timeout_seconds),
            withdraw_margin_threshold_msat: cli.withdraw_margin_threshold_msat,
            withdraw_margin_percent: cli.withdraw_margin_percent,
            analytics_queue_capacity: cli.analytics_queue_capacity,
            analytics_timeout_ms: cli.analytics_timeout_ms,
            lnurl_timeout_ms: cli.lnurl_timeout_ms,
            coinflip_cooldown: Duration::from_secs(cli.coinflip_cooldown_seconds),
            game_join_quota: cli.game_join_quota,
            game_quota_window: Duration::from_secs(cli.game_quota_window_seconds),
            store: match cli.store {
                CliStoreKind::Memory => StoreKind::Memory,
                CliStoreKind::Redb => StoreKind::Redb,
            },
            store_sweep_interval: Duration::from_secs(cli.store_sweep_interval_seconds),
            state_dir: cli.state_dir.clone(),
            default_locale: cli.default_locale.trim().to_lowercase(),
            log_filter: cli.log_filter.clone(),
        }
    }

    pub fn issuer_config(&self) -> WithdrawIssuerConfig {
        WithdrawIssuerConfig {
            service_url: self.service_url.clone(),
            challenge_ttl: self.invoice_timeout,
            margin_threshold_msat: self.withdraw_margin_threshold_msat,
            margin_percent: self.withdraw_margin_percent,
        }
    }

    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            service_id: self.service_id.clone(),
            hidden_message_ttl: self.hidden_message_timeout,
            quota: GameQuotaConfig {
                cooldown: self.coinflip_cooldown,
                join_quota: self.game_join_quota,
                window: self.game_quota_window,
            },
            ..DispatchSettings::default()
        }
    }

    pub fn analytics_config(&self) -> AnalyticsQueueConfig {
        AnalyticsQueueConfig {
            capacity: self.analytics_queue_capacity,
            timeout_ms: self.analytics_timeout_ms,
        }
    }

    pub fn redb_path(&self) -> PathBuf {
        self.state_dir.join(REDB_FILE_NAME)
    }
}

/// Opens the store selected by `settings`, creating the state directory for redb.
pub fn open_store(settings: &BotSettings) -> Result<Arc<dyn EphemeralStore>> {
    match settings.store {
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreKind::Redb => {
            std::fs::create_dir_all(&settings.state_dir).with_context(|| {
                format!(
                    "failed to create state directory {}",
                    settings.state_dir.display()
                )
            })?;
            let path = settings.redb_path();
            let store = RedbStore::open(&path)
                .with_context(|| format!("failed to open store {}", path.display()))?;
            tracing::debug!(path = %path.display(), "opened redb store");
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["tipbot"];
        argv.extend_from_slice(args);
        argv.push("usage");
        Cli::try_parse_from(argv).expect("parse cli")
    }

    #[test]
    fn unit_defaults_match_documented_settings() {
        let settings = BotSettings::from_cli(&parse(&[]));
        assert_eq!(settings.service_id, "tipbot");
        assert_eq!(settings.bind, "127.0.0.1:8787");
        assert_eq!(settings.invoice_timeout, Duration::from_secs(3_600));
        assert_eq!(
            settings.hidden_message_timeout,
            Duration::from_secs(432_000)
        );
        assert_eq!(settings.withdraw_margin_threshold_msat, 5_000_000);
        assert_eq!(settings.withdraw_margin_percent, 1);
        assert_eq!(settings.analytics_queue_capacity, 256);
        assert_eq!(settings.game_join_quota, 10);
        assert_eq!(settings.store, StoreKind::Memory);
        assert_eq!(settings.store_sweep_interval, Duration::from_secs(300));
        assert_eq!(settings.default_locale, "en");
    }

    #[test]
    fn functional_flags_flow_into_component_configs() {
        let settings = BotSettings::from_cli(&parse(&[
            "--service-id",
            "@SatsBot",
            "--service-url",
            "https://bot.example.com/",
            "--coinflip-cooldown-seconds",
            "60",
            "--withdraw-margin-percent",
            "2",
        ]));

        let issuer = settings.issuer_config();
        assert_eq!(issuer.service_url, "https://bot.example.com");
        assert_eq!(issuer.margin_percent, 2);
        let dispatch = settings.dispatch_settings();
        assert_eq!(dispatch.service_id, "SatsBot");
        assert_eq!(dispatch.quota.cooldown, Duration::from_secs(60));
        assert_eq!(dispatch.prompt_ttl, DispatchSettings::default().prompt_ttl);
    }

    #[test]
    fn regression_zero_and_out_of_range_values_are_rejected() {
        assert!(Cli::try_parse_from(["tipbot", "--invoice-timeout-seconds", "0", "usage"]).is_err());
        assert!(Cli::try_parse_from(["tipbot", "--withdraw-margin-percent", "101", "usage"]).is_err());
        assert!(Cli::try_parse_from(["tipbot", "--store", "sqlite", "usage"]).is_err());
    }

    #[test]
    fn integration_redb_store_is_created_under_state_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let state_dir = temp.path().join("nested").join("state");
        let mut settings = BotSettings::from_cli(&parse(&["--store", "redb"]));
        settings.state_dir = state_dir.clone();

        let store = open_store(&settings).expect("open redb store");
        store.set("k", "v", None).expect("set");

        assert_eq!(store.get("k").expect("get").as_deref(), Some("v"));
        assert!(state_dir.join(REDB_FILE_NAME).exists());
    }
}
