// ── MAC address input masking ──
//
// Client registration forms accept MAC addresses as free text. Input is
// masked keystroke by keystroke into `XX:XX:XX:XX:XX:XX` and checked before
// any request leaves the console.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validate::{FormField, ValidationError};

/// Number of hex digits in a MAC address.
const HEX_DIGITS: usize = 12;

/// Message shown when a MAC address does not pass [`is_valid`].
pub const INVALID_MAC_MESSAGE: &str =
    "Please enter a valid MAC address (format: XX:XX:XX:XX:XX:XX)";

/// Mask raw input into colon-separated uppercase hex.
///
/// Non-hex characters are dropped, the rest is uppercased and cut to
/// twelve digits, and a colon goes in front of every pair after the
/// first. Applying it twice gives the same result as applying it once.
///
/// ```
/// use gamenet_core::mac::format_input;
///
/// assert_eq!(format_input("aabbccddeeff"), "AA:BB:CC:DD:EE:FF");
/// assert_eq!(format_input("aa-bb-c"), "AA:BB:C");
/// ```
pub fn format_input(raw: &str) -> String {
    let mut out = String::with_capacity(HEX_DIGITS + 5);
    for (i, c) in raw
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_uppercase())
        .take(HEX_DIGITS)
        .enumerate()
    {
        if i > 0 && i % 2 == 0 {
            out.push(':');
        }
        out.push(c);
    }
    out
}

/// Whether `value` is exactly six colon-separated pairs of hex digits.
///
/// Case-insensitive; no other separators or surrounding whitespace.
pub fn is_valid(value: &str) -> bool {
    let groups: Vec<&str> = value.split(':').collect();
    groups.len() == 6
        && groups
            .iter()
            .all(|g| g.len() == 2 && g.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Check a submitted MAC address, reporting the form field on failure.
pub fn validate(value: &str) -> Result<MacAddress, ValidationError> {
    value.parse()
}

// ── MacAddress ──────────────────────────────────────────────────────

/// A validated MAC address in canonical uppercase `XX:XX:XX:XX:XX:XX` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacAddress(String);

impl MacAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_valid(s) {
            Ok(Self(s.to_ascii_uppercase()))
        } else {
            Err(ValidationError::new(FormField::MacAddress, INVALID_MAC_MESSAGE))
        }
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn formats_bare_hex() {
        assert_eq!(format_input("aabbccddeeff"), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn strips_separators_and_junk() {
        assert_eq!(format_input("aa-bb.cc zz dd:ee:ff"), "AA:BB:CC:DD:EE:FF");
        assert_eq!(format_input("xyz"), "");
    }

    #[test]
    fn partial_input_keeps_trailing_digit() {
        assert_eq!(format_input("a"), "A");
        assert_eq!(format_input("aab"), "AA:B");
        assert_eq!(format_input("aabb"), "AA:BB");
    }

    #[test]
    fn truncates_to_twelve_digits() {
        let out = format_input("00112233445566778899");
        assert_eq!(out, "00:11:22:33:44:55");
        assert_eq!(out.chars().filter(char::is_ascii_hexdigit).count(), 12);
    }

    #[test]
    fn formatting_is_idempotent() {
        for raw in [
            "",
            "a",
            "aa:b",
            "AA-BB-CC-DD-EE-FF",
            "0011.2233.4455",
            "ggg123",
            "aabbccddeeff0011",
            "  de ad be ef  ",
        ] {
            let once = format_input(raw);
            assert_eq!(format_input(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn validates_canonical_form() {
        assert!(is_valid("AA:BB:CC:DD:EE:FF"));
        assert!(is_valid("aa:bb:cc:dd:ee:ff"));
        assert!(!is_valid("AA:BB:CC:DD:EE"));
        assert!(!is_valid("GG:BB:CC:DD:EE:FF"));
        assert!(!is_valid("AA-BB-CC-DD-EE-FF"));
        assert!(!is_valid("AA:BB:CC:DD:EE:FF:00"));
        assert!(!is_valid("AAA:B:CC:DD:EE:FF"));
        assert!(!is_valid(""));
    }

    #[test]
    fn parse_uppercases_and_reports_field() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac.as_str(), "AA:BB:CC:DD:EE:FF");

        let err = validate("AA:BB").unwrap_err();
        assert_eq!(err.field, FormField::MacAddress);
        assert_eq!(err.message, INVALID_MAC_MESSAGE);
    }
}
