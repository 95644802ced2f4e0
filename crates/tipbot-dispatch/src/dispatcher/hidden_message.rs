use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tipbot_core::{ChatId, MessageId, UserId};

pub const HIDDEN_KEY_PREFIX: &str = "hidden:";
const HIDDEN_ID_LEN: usize = 12;
const CONTENT_DELIMITER: char = '~';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Who sees a revealed message and how many payments unlock it.
pub struct HiddenVisibility {
    pub public: bool,
    /// Payers required before a public reveal; always at least one.
    pub crowdfund: u32,
    /// Private reveals allowed; zero means unlimited.
    pub revealers: u32,
}

/// More than one revealer forces a private single-funder message; a
/// crowdfund above one forces a public reveal.
pub fn normalize_hidden_options(
    public: bool,
    private: bool,
    crowdfund: Option<i64>,
    revealers: Option<i64>,
) -> HiddenVisibility {
    let mut visibility = HiddenVisibility {
        public: public && !private,
        crowdfund: 1,
        revealers: 0,
    };
    match crowdfund {
        Some(count) if count > 1 => {
            visibility.public = true;
            visibility.crowdfund = u32::try_from(count).unwrap_or(u32::MAX);
        }
        _ => visibility.crowdfund = 1,
    }
    if let Some(count) = revealers.filter(|count| *count > 1) {
        visibility.public = false;
        visibility.crowdfund = 1;
        visibility.revealers = u32::try_from(count).unwrap_or(u32::MAX);
    }
    visibility
}

/// `(preview, content)` from the replied-to text, or from `preview~content`.
pub fn extract_hidden_content(
    reply_text: Option<&str>,
    words: &[String],
) -> Option<(String, String)> {
    let inline = words.join(" ").trim().to_string();
    if let Some(content) = reply_text.map(str::trim).filter(|text| !text.is_empty()) {
        return Some((inline, content.to_string()));
    }
    let (preview, content) = inline.split_once(CONTENT_DELIMITER)?;
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    Some((preview.trim().to_string(), content.to_string()))
}

/// Stable id of the message hidden by one command message.
pub fn hidden_message_id(owner: UserId, chat: ChatId, message: MessageId) -> String {
    let digest = Sha256::digest(format!("{owner}:{chat}:{message}").as_bytes());
    let mut id = digest
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>();
    id.truncate(HIDDEN_ID_LEN);
    id
}

pub fn hidden_message_key(hidden_id: &str) -> String {
    format!("{HIDDEN_KEY_PREFIX}{}", hidden_id.trim().to_ascii_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenMessage {
    pub owner: UserId,
    #[serde(default)]
    pub preview: String,
    pub content: String,
    pub satoshis: u64,
    pub public: bool,
    pub crowdfund: u32,
    #[serde(rename = "times")]
    pub revealers: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_many_revealers_force_private_single_funder() {
        let visibility = normalize_hidden_options(true, false, Some(4), Some(3));
        assert_eq!(
            visibility,
            HiddenVisibility {
                public: false,
                crowdfund: 1,
                revealers: 3,
            }
        );
    }

    #[test]
    fn unit_crowdfund_above_one_forces_public() {
        let visibility = normalize_hidden_options(false, true, Some(5), None);
        assert!(visibility.public);
        assert_eq!(visibility.crowdfund, 5);
        assert_eq!(visibility.revealers, 0);
    }

    #[test]
    fn unit_small_crowdfund_and_revealer_counts_normalize_to_defaults() {
        for crowdfund in [None, Some(0), Some(1), Some(-2)] {
            let visibility = normalize_hidden_options(false, false, crowdfund, Some(1));
            assert_eq!(visibility.crowdfund, 1);
            assert_eq!(visibility.revealers, 0);
            assert!(!visibility.public);
        }
        assert!(normalize_hidden_options(true, false, None, None).public);
        assert!(!normalize_hidden_options(true, true, None, None).public);
    }

    #[test]
    fn functional_content_comes_from_reply_then_delimiter() {
        let words = vec!["teaser".to_string()];
        assert_eq!(
            extract_hidden_content(Some("the secret"), &words),
            Some(("teaser".to_string(), "the secret".to_string()))
        );
        let words = vec!["look".to_string(), "here~the answer".to_string()];
        assert_eq!(
            extract_hidden_content(None, &words),
            Some(("look here".to_string(), "the answer".to_string()))
        );
        assert_eq!(extract_hidden_content(None, &["no delimiter".to_string()]), None);
        assert_eq!(extract_hidden_content(Some("  "), &["x~ ".to_string()]), None);
        assert_eq!(extract_hidden_content(None, &[]), None);
    }

    #[test]
    fn unit_hidden_id_is_deterministic_and_short() {
        let id = hidden_message_id(1, -100, 7);
        assert_eq!(id.len(), HIDDEN_ID_LEN);
        assert_eq!(id, hidden_message_id(1, -100, 7));
        assert_ne!(id, hidden_message_id(1, -100, 8));
        assert_eq!(hidden_message_key(" ABC "), "hidden:abc");
    }
}
