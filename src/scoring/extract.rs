use std::num::IntErrorKind;
use std::sync::LazyLock;

use regex::Regex;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?[0-9]+").expect("integer pattern is valid"));

/// Pulls the first ASCII integer out of a model reply and clamps it into 1..=10.
///
/// Returns `None` when the reply holds no ASCII digits at all.
pub fn extract_score(text: &str) -> Option<u8> {
    let found = INTEGER_RE.find(text)?.as_str();
    let value = match found.parse::<i64>() {
        Ok(value) => value,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => return None,
        },
    };
    Some(value.clamp(1, 10) as u8)
}
