use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A payment string pasted or forwarded as plain text.
pub enum PastedPayment {
    Invoice(String),
    Lnurl(String),
}

impl PastedPayment {
    /// The command the pasted text stands for.
    pub fn command_text(&self) -> String {
        match self {
            Self::Invoice(bolt11) => format!("/pay {bolt11}"),
            Self::Lnurl(lnurl) => format!("/lnurl {lnurl}"),
        }
    }
}

fn bolt11_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\b(?:lightning:)?(ln(?:bcrt|bc|tbs|tb|sb)[0-9a-z]{20,})\b").ok())
        .as_ref()
}

fn lnurl_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)\b(?:lightning:)?(lnurl1[0-9a-z]{20,})\b").ok())
        .as_ref()
}

/// Finds a bolt11 invoice, or failing that an `lnurl1...` voucher, in `text`.
pub fn detect_pasted_payment(text: &str) -> Option<PastedPayment> {
    let captured = |pattern: Option<&Regex>| {
        pattern
            .and_then(|pattern| pattern.captures(text))
            .and_then(|captures| captures.get(1))
            .map(|found| found.as_str().to_ascii_lowercase())
    };
    if let Some(invoice) = captured(bolt11_pattern()) {
        return Some(PastedPayment::Invoice(invoice));
    }
    captured(lnurl_pattern()).map(PastedPayment::Lnurl)
}
