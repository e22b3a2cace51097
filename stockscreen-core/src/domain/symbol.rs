//! A-share symbol normalization.
//!
//! Canonical form is a six-digit code with an exchange suffix:
//! `600519.SH` (Shanghai) or `000001.SZ` (Shenzhen).

use tracing::{debug, warn};

const EXCHANGES: [&str; 2] = ["SH", "SZ"];

fn is_code(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Map a user-supplied code to canonical `NNNNNN.SH` / `NNNNNN.SZ` form.
///
/// Accepts already-canonical codes, prefixed codes (`SZ.000001`) and bare
/// numeric codes of up to six digits (zero-padded; leading `6` is Shanghai,
/// anything else Shenzhen). Returns `None` for anything unparseable,
/// including numeric codes longer than six digits.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let code = raw.trim();
    if is_canonical(code) {
        return Some(code.to_string());
    }

    if let Some((left, right)) = code.split_once('.') {
        if EXCHANGES.contains(&left) && is_code(right) {
            let canonical = format!("{right}.{left}");
            debug!(raw, %canonical, "moved exchange prefix to suffix");
            return Some(canonical);
        }
        warn!(raw, "invalid symbol format");
        return None;
    }

    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        warn!(raw, "invalid symbol format");
        return None;
    }
    if code.len() > 6 {
        warn!(raw, "numeric code longer than six digits");
        return None;
    }

    let padded = format!("{code:0>6}");
    let exchange = match padded.as_bytes()[0] {
        b'6' => "SH",
        b'0' | b'3' => "SZ",
        _ => {
            warn!(code = %padded, "cannot infer exchange, assuming Shenzhen");
            "SZ"
        }
    };
    Some(format!("{padded}.{exchange}"))
}

/// Whether `symbol` is already in canonical form.
pub fn is_canonical(symbol: &str) -> bool {
    symbol
        .split_once('.')
        .is_some_and(|(code, ex)| is_code(code) && EXCHANGES.contains(&ex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_codes_get_exchange_suffix() {
        assert_eq!(normalize_symbol("600519").as_deref(), Some("600519.SH"));
        assert_eq!(normalize_symbol("000001").as_deref(), Some("000001.SZ"));
        assert_eq!(normalize_symbol("300750").as_deref(), Some("300750.SZ"));
    }

    #[test]
    fn short_codes_are_zero_padded() {
        assert_eq!(normalize_symbol("1").as_deref(), Some("000001.SZ"));
        assert_eq!(normalize_symbol("2594").as_deref(), Some("002594.SZ"));
    }

    #[test]
    fn prefixed_codes_are_flipped() {
        assert_eq!(normalize_symbol("SZ.000001").as_deref(), Some("000001.SZ"));
        assert_eq!(normalize_symbol("SH.600000").as_deref(), Some("600000.SH"));
    }

    #[test]
    fn canonical_codes_pass_through() {
        assert_eq!(normalize_symbol(" 600519.SH ").as_deref(), Some("600519.SH"));
        assert!(is_canonical("000001.SZ"));
        assert!(!is_canonical("SZ.000001"));
    }

    #[test]
    fn unparseable_codes_are_rejected() {
        assert_eq!(normalize_symbol("1234567"), None);
        assert_eq!(normalize_symbol(""), None);
        assert_eq!(normalize_symbol("AAPL"), None);
        assert_eq!(normalize_symbol("600519.HK"), None);
        assert_eq!(normalize_symbol("60051.SH"), None);
        assert_eq!(normalize_symbol("sz.000001"), None);
    }

    #[test]
    fn unknown_leading_digit_defaults_to_shenzhen() {
        assert_eq!(normalize_symbol("830799").as_deref(), Some("830799.SZ"));
    }
}
