use thiserror::Error;

const MAX_SATOSHIS: u64 = 21_000_000 * 100_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Enumerates supported `AmountError` values.
pub enum AmountError {
    #[error("'{0}' is not a number of satoshis")]
    Invalid(String),
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("'{0}' is more satoshis than exist")]
    TooLarge(String),
}

/// Parses `100`, `2k` or `1.5k` into whole satoshis.
pub fn parse_satoshis(raw: &str) -> Result<u64, AmountError> {
    let trimmed = raw.trim().to_ascii_lowercase();
    let invalid = || AmountError::Invalid(raw.trim().to_string());
    let sats = match trimmed.strip_suffix('k') {
        Some(thousands) => {
            let (whole, fraction) = thousands.split_once('.').unwrap_or((thousands, ""));
            if (whole.is_empty() && fraction.is_empty()) || fraction.len() > 3 {
                return Err(invalid());
            }
            let whole = if whole.is_empty() {
                0
            } else {
                whole.parse::<u64>().map_err(|_| invalid())?
            };
            let fraction = if fraction.is_empty() {
                0
            } else {
                let digits = fraction.parse::<u64>().map_err(|_| invalid())?;
                digits * 10u64.pow(3 - fraction.len() as u32)
            };
            whole
                .checked_mul(1000)
                .and_then(|sats| sats.checked_add(fraction))
                .ok_or_else(|| AmountError::TooLarge(raw.trim().to_string()))?
        }
        None => trimmed.parse::<u64>().map_err(|_| invalid())?,
    };
    if sats == 0 {
        return Err(AmountError::NotPositive);
    }
    if sats > MAX_SATOSHIS {
        return Err(AmountError::TooLarge(raw.trim().to_string()));
    }
    Ok(sats)
}

/// Participant count for multi-party games; absent means two.
pub fn parse_participants(raw: Option<&str>) -> Result<u32, String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(2);
    };
    match raw.parse::<u32>() {
        Ok(count) if (2..=100).contains(&count) => Ok(count),
        _ => Err(raw.to_string()),
    }
}

/// Group setting price in satoshis; absent or `0` switches the setting off.
pub fn parse_price(raw: Option<&str>) -> Result<u64, AmountError> {
    match raw.map(str::trim) {
        None | Some("" | "0") => Ok(0),
        Some(raw) => parse_satoshis(raw),
    }
}
