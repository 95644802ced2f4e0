//! Runtime settings, tracing bootstrap and wiring for the tip bot engine.
//!
//! [`Cli`] reads every setting from flags or `TIPBOT_*` variables.
//! [`BotRuntime`] assembles the dispatcher and the voucher server state from
//! the collaborators a host process provides.

pub mod bot_runtime;
pub mod bot_settings;
pub mod cli_args;
pub mod tool_commands;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub use bot_runtime::{build_bundle, build_registry, BotRuntime, Collaborators};
pub use bot_settings::{open_store, BotSettings, StoreKind};
pub use cli_args::{Cli, CliCommand, CliStoreKind};
pub use tool_commands::execute_tool_command;

/// `filter` wins over `RUST_LOG`; both fall back to `warn`.
pub fn init_tracing(filter: Option<&str>) {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::WARN.into());
    let env_filter = match filter.map(str::trim).filter(|filter| !filter.is_empty()) {
        Some(filter) => builder.parse_lossy(filter),
        None => builder.from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
