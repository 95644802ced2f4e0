use bech32::{Bech32, Hrp};

use crate::LnurlError;

pub const LNURL_HRP: &str = "lnurl";
const LIGHTNING_SCHEME: &str = "lightning:";

/// Bech32-encodes `url` under the `lnurl` prefix, uppercased for QR density.
pub fn encode_lnurl(url: &str) -> Result<String, LnurlError> {
    let hrp = Hrp::parse(LNURL_HRP).map_err(|error| LnurlError::Encode(error.to_string()))?;
    bech32::encode_upper::<Bech32>(hrp, url.as_bytes())
        .map_err(|error| LnurlError::Encode(error.to_string()))
}

/// Decodes an LNURL (either case, optional `lightning:` scheme) into its URL.
pub fn decode_lnurl(lnurl: &str) -> Result<String, LnurlError> {
    let lowered = lnurl.trim().to_lowercase();
    let candidate = lowered.strip_prefix(LIGHTNING_SCHEME).unwrap_or(&lowered);
    let (hrp, data) =
        bech32::decode(candidate).map_err(|error| LnurlError::InvalidLnurl(error.to_string()))?;
    if hrp.to_lowercase() != LNURL_HRP {
        return Err(LnurlError::InvalidLnurl(format!(
            "unexpected prefix '{}'",
            hrp.to_lowercase()
        )));
    }
    let url = String::from_utf8(data)
        .map_err(|_| LnurlError::InvalidLnurl("payload is not utf-8".to_string()))?;
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(LnurlError::InvalidLnurl("payload is not a url".to_string()));
    }
    Ok(url)
}
