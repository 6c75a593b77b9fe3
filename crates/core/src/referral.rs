//! Referral codes, links, and statistics.
//!
//! Each customer owns one `active` referral row holding their shareable code.
//! Every registration through that code adds a `pending` row for the new
//! customer, which becomes `completed` once an admin approves them.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Prefix of every referral code.
pub const CODE_PREFIX: &str = "REF";

/// Status of a referral row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    /// The referrer's own shareable link.
    Active,
    /// A referred customer registered and awaits approval.
    Pending,
    /// The referred customer was approved.
    Completed,
}

impl ReferralStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Build a referral code from the owner's id and the current time in
/// milliseconds, e.g. `REF42lq3x9k1c`.
pub fn generate_code(user_id: DbId, now_millis: i64) -> String {
    format!("{CODE_PREFIX}{user_id}{}", to_base36(now_millis.unsigned_abs()))
}

/// Code stored on the row recording one referred customer.
///
/// Codes are unique across all rows, so the referred user's id is appended.
pub fn referred_code(link_code: &str, referred_id: DbId) -> String {
    format!("{link_code}-{referred_id}")
}

/// Registration link shared by the referrer.
pub fn referral_link(client_url: &str, code: &str) -> String {
    format!("{}/register?ref={code}", client_url.trim_end_matches('/'))
}

/// Check the shape of a code supplied at registration.
pub fn validate_code(code: &str) -> Result<&str, CoreError> {
    let code = code.trim();
    let valid = code.len() > CODE_PREFIX.len()
        && code.starts_with(CODE_PREFIX)
        && code[CODE_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(code)
    } else {
        Err(CoreError::Validation(format!("Invalid referral code '{code}'")))
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Counts shown next to the referral link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReferralStats {
    pub total: i64,
    pub pending: i64,
    pub completed: i64,
}

impl ReferralStats {
    /// Fold `(status, count)` rows into stats. The referrer's own `active`
    /// row is not a referral and is skipped.
    pub fn from_counts<'a>(rows: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let mut stats = Self::default();
        for (status, count) in rows {
            match status {
                "pending" => stats.pending += count,
                "completed" => stats.completed += count,
                _ => continue,
            }
            stats.total += count;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn code_embeds_user_id_and_time() {
        let code = generate_code(42, 1_700_000_000_000);
        assert_eq!(code, "REF42loyw3v28");
        assert_eq!(validate_code(&code).unwrap(), code);
    }

    #[test]
    fn link_points_at_registration() {
        assert_eq!(
            referral_link("https://portal.example.de/", "REF1abc"),
            "https://portal.example.de/register?ref=REF1abc"
        );
    }

    #[test]
    fn malformed_codes_are_rejected() {
        assert_matches!(validate_code("REF"), Err(CoreError::Validation(_)));
        assert_matches!(validate_code("XYZ123"), Err(CoreError::Validation(_)));
        assert_matches!(validate_code("REF1;drop"), Err(CoreError::Validation(_)));
        assert_eq!(validate_code(" REF7k ").unwrap(), "REF7k");
    }

    #[test]
    fn stats_skip_active_link_row() {
        let stats = ReferralStats::from_counts([("active", 1), ("pending", 2), ("completed", 3)]);
        assert_eq!(
            stats,
            ReferralStats {
                total: 5,
                pending: 2,
                completed: 3
            }
        );
    }
}
