use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tipbot_commands::{CommandRegistry, RegistryBuilder};
use tipbot_core::{AnalyticsSink, AppGateway, ChatTransport, EphemeralStore, Ledger, UserDirectory};
use tipbot_dispatch::{AnalyticsQueue, Dispatcher, DispatcherParts};
use tipbot_i18n::TranslationBundle;
use tipbot_lnurl::{run_voucher_server, VoucherConsumer, VoucherServerState, WithdrawIssuer};
use tokio::task::JoinHandle;

use crate::bot_settings::{open_store, BotSettings};

/// Services the host process provides; the engine never talks to them directly.
pub struct Collaborators {
    pub ledger: Arc<dyn Ledger>,
    pub chat: Arc<dyn ChatTransport>,
    pub directory: Arc<dyn UserDirectory>,
    pub apps: Arc<dyn AppGateway>,
    pub analytics: Arc<dyn AnalyticsSink>,
}

/// Fully wired command engine plus the voucher server state sharing it.
pub struct BotRuntime {
    settings: BotSettings,
    dispatcher: Arc<Dispatcher>,
    issuer: Arc<WithdrawIssuer>,
    analytics: AnalyticsQueue,
    store_sweeper: JoinHandle<()>,
}

pub fn build_registry(service_id: &str) -> Result<CommandRegistry> {
    RegistryBuilder::new(service_id)
        .with_default_table()
        .build()
        .context("failed to compile command grammar")
}

pub fn build_bundle(default_locale: &str) -> Result<TranslationBundle> {
    TranslationBundle::builtin(default_locale)
        .with_context(|| format!("failed to load translations (default locale '{default_locale}')"))
}

/// Purges expired store entries every `interval` until aborted.
pub fn spawn_store_sweeper(store: Arc<dyn EphemeralStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let store = Arc::clone(&store);
            match tokio::task::spawn_blocking(move || store.purge_expired()).await {
                Ok(Ok(purged)) => tracing::debug!(purged, "store sweep finished"),
                Ok(Err(error)) => tracing::warn!(%error, "store sweep failed"),
                Err(error) => tracing::warn!(%error, "store sweep task panicked"),
            }
        }
    })
}

impl BotRuntime {
    /// Opens the configured store and assembles every component. Must run
    /// inside a tokio runtime: the analytics worker and store sweeper are
    /// spawned here.
    pub fn assemble(settings: BotSettings, collaborators: Collaborators) -> Result<Self> {
        let store = open_store(&settings)?;
        Self::assemble_with_store(settings, collaborators, store)
    }

    pub fn assemble_with_store(
        settings: BotSettings,
        collaborators: Collaborators,
        store: Arc<dyn EphemeralStore>,
    ) -> Result<Self> {
        let registry = build_registry(&settings.service_id)?;
        let bundle = build_bundle(&settings.default_locale)?;
        let consumer = VoucherConsumer::new(collaborators.ledger.clone(), settings.lnurl_timeout_ms)?;
        let issuer = Arc::new(WithdrawIssuer::new(
            settings.issuer_config(),
            store.clone(),
            collaborators.ledger.clone(),
            collaborators.directory.clone(),
        ));
        let analytics = AnalyticsQueue::spawn(collaborators.analytics, settings.analytics_config());
        let store_sweeper = spawn_store_sweeper(store.clone(), settings.store_sweep_interval);

        let dispatcher = Arc::new(Dispatcher::new(DispatcherParts {
            ledger: collaborators.ledger,
            chat: collaborators.chat,
            directory: collaborators.directory,
            apps: collaborators.apps,
            store,
            analytics: analytics.clone(),
            consumer: Arc::new(consumer),
            issuer: issuer.clone(),
            registry: Arc::new(registry),
            bundle: Arc::new(bundle),
            settings: settings.dispatch_settings(),
        }));
        tracing::info!(
            service_id = %settings.service_id,
            store = ?settings.store,
            "tipbot runtime assembled"
        );
        Ok(Self {
            settings,
            dispatcher,
            issuer,
            analytics,
            store_sweeper,
        })
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn analytics(&self) -> &AnalyticsQueue {
        &self.analytics
    }

    /// Voucher endpoints settle accepted invoices through the dispatcher.
    pub fn voucher_state(&self) -> VoucherServerState {
        VoucherServerState {
            issuer: Arc::clone(&self.issuer),
            settlement: self.dispatcher.clone(),
        }
    }

    pub async fn serve_vouchers(&self) -> Result<()> {
        run_voucher_server(&self.settings.bind, self.voucher_state()).await
    }
}

impl Drop for BotRuntime {
    fn drop(&mut self) {
        self.store_sweeper.abort();
    }
}
