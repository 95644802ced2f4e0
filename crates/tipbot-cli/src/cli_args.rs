use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_percent(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse percent: {error}"))?;
    if parsed > 100 {
        return Err("value must be in range 0..=100".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliStoreKind {
    Memory,
    Redb,
}

#[derive(Debug, Parser)]
#[command(
    name = "tipbot",
    about = "Lightning tip bot command engine and LNURL-withdraw voucher server",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[arg(
        long = "service-id",
        env = "TIPBOT_SERVICE_ID",
        default_value = "tipbot",
        help = "Bot username without '@'; mentions of it are stripped from commands"
    )]
    pub service_id: String,

    #[arg(
        long = "service-url",
        env = "TIPBOT_SERVICE_URL",
        default_value = "http://127.0.0.1:8787",
        help = "Public base URL wallets use to reach the voucher endpoints"
    )]
    pub service_url: String,

    #[arg(
        long,
        env = "TIPBOT_BIND",
        default_value = "127.0.0.1:8787",
        help = "Socket address the voucher HTTP server listens on"
    )]
    pub bind: String,

    #[arg(
        long = "invoice-timeout-seconds",
        env = "TIPBOT_INVOICE_TIMEOUT_SECONDS",
        default_value_t = 3_600,
        value_parser = parse_positive_u64,
        help = "Lifetime of one-time voucher challenges"
    )]
    pub invoice_timeout_seconds: u64,

    #[arg(
        long = "hidden-message-timeout-seconds",
        env = "TIPBOT_HIDDEN_MESSAGE_TIMEOUT_SECONDS",
        default_value_t = 5 * 24 * 60 * 60,
        value_parser = parse_positive_u64,
        help = "How long hidden messages can be revealed"
    )]
    pub hidden_message_timeout_seconds: u64,

    #[arg(
        long = "withdraw-margin-threshold-msat",
        env = "TIPBOT_WITHDRAW_MARGIN_THRESHOLD_MSAT",
        default_value_t = 5_000_000,
        help = "Balances above this keep a fee margin when a voucher has no cap"
    )]
    pub withdraw_margin_threshold_msat: u64,

    #[arg(
        long = "withdraw-margin-percent",
        env = "TIPBOT_WITHDRAW_MARGIN_PERCENT",
        default_value_t = 1,
        value_parser = parse_percent,
        help = "Share of the balance held back as fee margin"
    )]
    pub withdraw_margin_percent: u64,

    #[arg(
        long = "analytics-queue-capacity",
        env = "TIPBOT_ANALYTICS_QUEUE_CAPACITY",
        default_value_t = 256,
        value_parser = parse_positive_usize,
        help = "Analytics events buffered before new ones are dropped"
    )]
    pub analytics_queue_capacity: usize,

    #[arg(
        long = "analytics-timeout-ms",
        env = "TIPBOT_ANALYTICS_TIMEOUT_MS",
        default_value_t = 2_000,
        value_parser = parse_positive_u64,
        help = "Per-event analytics delivery timeout"
    )]
    pub analytics_timeout_ms: u64,

    #[arg(
        long = "lnurl-timeout-ms",
        env = "TIPBOT_LNURL_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "HTTP timeout when redeeming third-party vouchers"
    )]
    pub lnurl_timeout_ms: u64,

    #[arg(
        long = "coinflip-cooldown-seconds",
        env = "TIPBOT_COINFLIP_COOLDOWN_SECONDS",
        default_value_t = 1_800,
        value_parser = parse_positive_u64,
        help = "Wait between two games created by the same user"
    )]
    pub coinflip_cooldown_seconds: u64,

    #[arg(
        long = "game-join-quota",
        env = "TIPBOT_GAME_JOIN_QUOTA",
        default_value_t = 10,
        value_parser = parse_positive_u64,
        help = "Games a user may create per quota window"
    )]
    pub game_join_quota: u64,

    #[arg(
        long = "game-quota-window-seconds",
        env = "TIPBOT_GAME_QUOTA_WINDOW_SECONDS",
        default_value_t = 86_400,
        value_parser = parse_positive_u64
    )]
    pub game_quota_window_seconds: u64,

    #[arg(
        long = "store-sweep-interval-seconds",
        env = "TIPBOT_STORE_SWEEP_INTERVAL_SECONDS",
        default_value_t = 300,
        value_parser = parse_positive_u64,
        help = "How often expired store entries are purged"
    )]
    pub store_sweep_interval_seconds: u64,

    #[arg(long, env = "TIPBOT_STORE", value_enum, default_value = "memory")]
    pub store: CliStoreKind,

    #[arg(
        long = "state-dir",
        env = "TIPBOT_STATE_DIR",
        default_value = ".tipbot",
        help = "Directory holding the redb store when --store redb"
    )]
    pub state_dir: PathBuf,

    #[arg(long = "default-locale", env = "TIPBOT_DEFAULT_LOCALE", default_value = "en")]
    pub default_locale: String,

    #[arg(
        long = "log-filter",
        env = "TIPBOT_LOG_FILTER",
        help = "tracing filter directive; RUST_LOG is used when unset"
    )]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Print the compiled command grammar.
    Usage,
    /// Parse a chat message the way the dispatcher would.
    Parse { text: String },
    /// Render `/help` for a command, or the overview.
    Help {
        #[arg(long, default_value = "")]
        locale: String,
        topic: Vec<String>,
    },
    /// Bech32-encode a voucher URL.
    EncodeLnurl { url: String },
    /// Decode an `lnurl1...` string back into its URL.
    DecodeLnurl { lnurl: String },
}
