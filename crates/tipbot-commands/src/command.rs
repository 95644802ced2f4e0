use serde_json::Value;
use tipbot_core::ExternalApp;

use crate::parsed_options::ParsedOptions;
use crate::usage_grammar::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Amount requested by `receive`.
pub enum InvoiceAmount {
    Any,
    Sats(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Setting changed by `toggle`. Prices stay raw until validated.
pub enum ToggleTarget {
    Ticket(Option<String>),
    Renamable(Option<String>),
    Spammy,
    Coinflips,
    Language(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
/// One dispatchable action. Numeric arguments are kept as typed text so the
/// dispatcher can report the exact input back when validation fails.
pub enum Command {
    Start {
        tutorial: Option<String>,
    },
    Stop,
    ExternalApp {
        app: ExternalApp,
        arguments: Value,
    },
    Send {
        amount: String,
        receivers: Vec<String>,
        anonymous: bool,
    },
    Giveaway {
        amount: String,
    },
    Giveflip {
        amount: String,
        participants: Option<String>,
    },
    Coinflip {
        amount: String,
        participants: Option<String>,
    },
    Fundraise {
        amount: String,
        participants: String,
        receivers: Vec<String>,
    },
    Hide {
        amount: String,
        message: Vec<String>,
        revealers: Option<String>,
        crowdfund: Option<String>,
        public: bool,
        private: bool,
    },
    Reveal {
        hidden_id: String,
    },
    Transactions,
    Transaction {
        hash: String,
    },
    Balance,
    Pay {
        invoice: Option<String>,
        now: bool,
        decode_only: bool,
    },
    IssueVoucher {
        amount: Option<String>,
    },
    Receive {
        amount: InvoiceAmount,
        description: String,
        preimage: Option<String>,
    },
    RedeemVoucher {
        lnurl: String,
    },
    Rename {
        name: String,
    },
    Apps,
    Help {
        topic: String,
    },
    Toggle(ToggleTarget),
}

const EXTERNAL_APPS: &[(&str, ExternalApp)] = &[
    ("microbet", ExternalApp::Microbet),
    ("bitflash", ExternalApp::Bitflash),
    ("satellite", ExternalApp::Satellite),
    ("golightning", ExternalApp::Golightning),
    ("gifts", ExternalApp::Gifts),
    ("paywall", ExternalApp::Paywall),
    ("poker", ExternalApp::Poker),
    ("bluewallet", ExternalApp::Lndhub),
    ("lndhub", ExternalApp::Lndhub),
    ("zeus", ExternalApp::Lndhub),
];

fn any_flag(options: &ParsedOptions, keys: &[&str]) -> bool {
    keys.iter().any(|key| options.flag(key))
}

fn owned(options: &ParsedOptions, key: &str) -> Option<String> {
    options.text(key).map(str::to_string)
}

fn required(options: &ParsedOptions, key: &str) -> Result<String, ParseError> {
    owned(options, key).ok_or_else(|| ParseError::MissingArgument(key.to_string()))
}

impl Command {
    /// Maps a matched option set to exactly one command.
    ///
    /// Sub-command words shared between lines (`balance`, `withdraw`, `lnurl`)
    /// are resolved by checking the owning command first.
    pub fn from_options(options: &ParsedOptions) -> Result<Self, ParseError> {
        if any_flag(options, &["start", "tutorial"]) {
            return Ok(Self::Start {
                tutorial: owned(options, "<tutorial>"),
            });
        }
        if options.flag("stop") {
            return Ok(Self::Stop);
        }
        if let Some((_, app)) = EXTERNAL_APPS.iter().find(|(key, _)| options.flag(key)) {
            return Ok(Self::ExternalApp {
                app: *app,
                arguments: options.set_entries(),
            });
        }
        if any_flag(options, &["send", "tip", "sendanonymously"]) {
            return Ok(Self::Send {
                amount: required(options, "<satoshis>")?,
                receivers: options.list("<receiver>"),
                anonymous: any_flag(
                    options,
                    &["sendanonymously", "anonymously", "--anonymous"],
                ),
            });
        }
        if options.flag("giveaway") {
            return Ok(Self::Giveaway {
                amount: required(options, "<satoshis>")?,
            });
        }
        if options.flag("giveflip") {
            return Ok(Self::Giveflip {
                amount: required(options, "<satoshis>")?,
                participants: owned(options, "<num_participants>"),
            });
        }
        if any_flag(options, &["coinflip", "lottery"]) {
            return Ok(Self::Coinflip {
                amount: required(options, "<satoshis>")?,
                participants: owned(options, "<num_participants>"),
            });
        }
        if any_flag(options, &["fundraise", "crowdfund"]) {
            return Ok(Self::Fundraise {
                amount: required(options, "<satoshis>")?,
                participants: required(options, "<num_participants>")?,
                receivers: options.list("<receiver>"),
            });
        }
        if options.flag("hide") {
            return Ok(Self::Hide {
                amount: required(options, "<satoshis>")?,
                message: options.list("<message>"),
                revealers: owned(options, "--revealers"),
                crowdfund: owned(options, "--crowdfund"),
                public: options.flag("--public"),
                private: options.flag("--private"),
            });
        }
        if options.flag("reveal") {
            return Ok(Self::Reveal {
                hidden_id: required(options, "<hidden_message_id>")?,
            });
        }
        if options.flag("transactions") {
            return Ok(Self::Transactions);
        }
        if options.flag("balance") {
            return Ok(Self::Balance);
        }
        if any_flag(options, &["pay", "decode", "paynow", "withdraw"]) {
            if options.flag("lnurl") {
                return Ok(Self::IssueVoucher {
                    amount: owned(options, "<satoshis>"),
                });
            }
            return Ok(Self::Pay {
                invoice: owned(options, "<invoice>"),
                now: any_flag(options, &["now", "paynow"]),
                decode_only: options.flag("decode"),
            });
        }
        if any_flag(options, &["receive", "invoice", "fund"]) {
            if options.flag("lnurl") {
                return Ok(Self::RedeemVoucher {
                    lnurl: required(options, "<lnurl>")?,
                });
            }
            let amount = match options.text("<satoshis>") {
                _ if options.flag("any") => InvoiceAmount::Any,
                Some(raw) if raw.eq_ignore_ascii_case("any") => InvoiceAmount::Any,
                Some(raw) => InvoiceAmount::Sats(raw.to_string()),
                None => InvoiceAmount::Any,
            };
            return Ok(Self::Receive {
                amount,
                description: options.list("<description>").join(" "),
                preimage: owned(options, "--preimage"),
            });
        }
        if options.flag("lnurl") {
            return Ok(Self::RedeemVoucher {
                lnurl: required(options, "<lnurl>")?,
            });
        }
        if options.flag("rename") {
            let name = options.list("<name>").join(" ");
            if name.is_empty() {
                return Err(ParseError::MissingArgument("<name>".to_string()));
            }
            return Ok(Self::Rename { name });
        }
        if any_flag(options, &["apps", "app"]) {
            return Ok(Self::Apps);
        }
        if options.flag("help") {
            return Ok(Self::Help {
                topic: options.list("<command>").join(" "),
            });
        }
        if options.flag("toggle") {
            let target = if options.flag("ticket") {
                ToggleTarget::Ticket(owned(options, "<price>"))
            } else if options.flag("renamable") {
                ToggleTarget::Renamable(owned(options, "<price>"))
            } else if options.flag("spammy") {
                ToggleTarget::Spammy
            } else if options.flag("coinflips") {
                ToggleTarget::Coinflips
            } else if options.flag("language") {
                ToggleTarget::Language(owned(options, "<lang>"))
            } else {
                return Err(ParseError::NoCommand);
            };
            return Ok(Self::Toggle(target));
        }
        if any_flag(options, &["transaction", "tx"]) {
            return Ok(Self::Transaction {
                hash: required(options, "<hash>")?,
            });
        }
        Err(ParseError::NoCommand)
    }

    /// Short label used in logs and analytics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Stop => "stop",
            Self::ExternalApp { app, .. } => app.as_str(),
            Self::Send { .. } => "send",
            Self::Giveaway { .. } => "giveaway",
            Self::Giveflip { .. } => "giveflip",
            Self::Coinflip { .. } => "coinflip",
            Self::Fundraise { .. } => "fundraise",
            Self::Hide { .. } => "hide",
            Self::Reveal { .. } => "reveal",
            Self::Transactions => "transactions",
            Self::Transaction { .. } => "transaction",
            Self::Balance => "balance",
            Self::Pay { .. } => "pay",
            Self::IssueVoucher { .. } => "lnurl withdraw",
            Self::Receive { .. } => "receive",
            Self::RedeemVoucher { .. } => "lnurl redeem",
            Self::Rename { .. } => "rename",
            Self::Apps => "apps",
            Self::Help { .. } => "help",
            Self::Toggle(_) => "toggle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Option map together with the command it maps to.
pub struct ParsedCommand {
    pub options: ParsedOptions,
    pub command: Command,
}

impl ParsedCommand {
    pub fn from_options(options: ParsedOptions) -> Result<Self, ParseError> {
        let command = Command::from_options(&options)?;
        Ok(Self { options, command })
    }
}
