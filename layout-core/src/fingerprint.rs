//! Layout fingerprinting.
//!
//! A fingerprint is a short, order-independent hash of a layout's column
//! count and item geometry. It is a change-detection oracle: equal layouts
//! always agree, and any geometry change almost certainly disagrees. It is
//! not a content address, and collisions only cost a skipped regeneration.
//!
//! ```text
//! items  -> "<id>:<x>,<y>,<w>,<h>" tokens -> sort -> join("|")
//!        -> "<columns>#" prefix -> 32-bit shift-and-add hash -> base 36
//! ```

use serde::{Deserialize, Serialize};

use crate::LayoutConfig;

const TOKEN_SEPARATOR: &str = "|";

/// Short base-36 hash of a layout's structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-computed fingerprint (e.g. one read from storage).
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the fingerprint text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a layout.
#[must_use]
pub fn fingerprint(layout: &LayoutConfig) -> Fingerprint {
    let mut tokens: Vec<String> = layout
        .items
        .iter()
        .map(|item| {
            format!(
                "{}:{},{},{},{}",
                item.node_id, item.x, item.y, item.w, item.h
            )
        })
        .collect();
    tokens.sort_unstable();

    let canonical = format!("{}#{}", layout.columns, tokens.join(TOKEN_SEPARATOR));
    Fingerprint(to_base36(rolling_hash(&canonical)))
}

/// 32-bit `hash * 31 + unit` accumulation over UTF-16 code units.
///
/// Wrapping arithmetic on `i32` matches the signed 32-bit accumulator used by
/// browser-side producers of stored fingerprints; the result is reinterpreted
/// as unsigned before rendering so it never carries a sign.
#[allow(clippy::cast_sign_loss)]
fn rolling_hash(input: &str) -> u32 {
    let hash = input.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    hash as u32
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(7);
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
