//! Canonical JSON encoding used as hash input.
//!
//! Rules:
//! - object keys sorted at every level (byte order of the UTF-8 key)
//! - `", "` between items, `": "` between key and value
//! - every character outside printable ASCII is written as a lowercase `\uXXXX`
//!   escape, astral characters as a surrogate pair
//! - floats in shortest round-trip form; plain decimal with a trailing `.0` for
//!   magnitudes in `[1e-4, 1e16)`, otherwise exponential with a signed exponent of
//!   at least two digits (`1e+16`, `1e-05`)
//!
//! Hashes already stored by earlier deployments of the ledger were computed over
//! exactly this text, so they keep verifying here.

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_f32<W: ?Sized + Write>(&mut self, writer: &mut W, value: f32) -> io::Result<()> {
        self.write_f64(writer, f64::from(value))
    }

    fn write_f64<W: ?Sized + Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(format_float(value).as_bytes())
    }

    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if (' '..='~').contains(&ch) {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

/// Shortest round-trip float text with the exponent spelled `e+NN` / `e-NN`.
pub fn format_float(value: f64) -> String {
    // `Debug` already switches to exponential form outside [1e-4, 1e16).
    let repr = format!("{value:?}");
    match repr.split_once('e') {
        None => repr,
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
    }
}

/// Encode `value` canonically. Keys are sorted by round-tripping through
/// `serde_json::Value`, whose object map is ordered.
pub fn to_vec<T: ?Sized + Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let sorted = serde_json::to_value(value)?;
    let mut out = Vec::with_capacity(256);
    let mut ser = Serializer::with_formatter(&mut out, CanonicalFormatter);
    sorted.serialize(&mut ser)?;
    Ok(out)
}

pub fn to_string<T: ?Sized + Serialize>(value: &T) -> serde_json::Result<String> {
    // Output is pure ASCII.
    to_vec(value).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_at_every_level() {
        let value = json!({"b": 1, "a": {"z": true, "m": null}});
        assert_eq!(
            to_string(&value).unwrap(),
            r#"{"a": {"m": null, "z": true}, "b": 1}"#
        );
    }

    #[test]
    fn arrays_use_spaced_separator() {
        assert_eq!(to_string(&json!([1, 2, 3])).unwrap(), "[1, 2, 3]");
        assert_eq!(to_string(&json!([])).unwrap(), "[]");
        assert_eq!(to_string(&json!({})).unwrap(), "{}");
    }

    #[test]
    fn integral_floats_keep_decimal_point() {
        assert_eq!(format_float(1_700_000_000.0), "1700000000.0");
        assert_eq!(format_float(1_700_000_001.25), "1700000001.25");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(0.0001), "0.0001");
    }

    #[test]
    fn exponent_is_signed_and_padded() {
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(123_456_789_012_345_680.0), "1.2345678901234568e+17");
    }

    #[test]
    fn non_ascii_is_escaped_lowercase() {
        assert_eq!(
            to_string(&json!("José Núñez")).unwrap(),
            r#""Jos\u00e9 N\u00fa\u00f1ez""#
        );
    }

    #[test]
    fn astral_characters_become_surrogate_pairs() {
        assert_eq!(to_string(&json!("\u{1F5F3}")).unwrap(), r#""\ud83d\uddf3""#);
    }

    #[test]
    fn control_and_delete_characters_are_escaped() {
        assert_eq!(to_string(&json!("a\nb\u{7f}")).unwrap(), r#""a\nb\u007f""#);
        assert_eq!(to_string(&json!("q\"\\")).unwrap(), r#""q\"\\""#);
    }
}
