//! Money formatting and id generation

use chrono::Utc;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random characters appended to the timestamp in [`generate_id`]
const ID_SUFFIX_LEN: usize = 6;

/// Format an amount the way ko-KR locale does, with the won suffix
///
/// # Example
/// ```
/// use hyodo::ledger::format::format_money;
///
/// assert_eq!(format_money(1000), "1,000원");
/// assert_eq!(format_money(-1234567), "-1,234,567원");
/// ```
pub fn format_money(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);

    if amount < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped.push('원');
    grouped
}

/// Parse a user-typed amount such as `1,000`, `1000원` or `50000`
pub fn parse_money(text: &str) -> Option<i64> {
    let cleaned: String = text
        .trim()
        .trim_end_matches('원')
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Generate a client-side entry id: base-36 milliseconds plus a random suffix
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u128;
    let mut id = to_base36(millis);

    let mut random = uuid::Uuid::new_v4().as_u128();
    for _ in 0..ID_SUFFIX_LEN {
        id.push(BASE36[(random % 36) as usize] as char);
        random /= 36;
    }
    id
}

fn to_base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Mask the local part of an email address for display (`hong@x.com` -> `ho**@x.com`)
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };
    let keep = if local.chars().count() > 2 { 2 } else { 1 };
    let visible: String = local.chars().take(keep).collect();
    let hidden = local.chars().count().saturating_sub(keep).max(1);
    format!("{}{}@{}", visible, "*".repeat(hidden), domain)
}
