//! Opaque dotted numbers ("1", "2.3", "2.3.1").

use std::cmp::Ordering;
use std::fmt;

use serde::Deserializer;
use serde::de::{self, Visitor};

/// Deserialize a field that may be a JSON string, number or null into a string.
///
/// Canonical JSON is not consistent about quoting chapter numbers and ids.
pub fn opaque_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct OpaqueVisitor;

    impl<'de> Visitor<'de> for OpaqueVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, number or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.trim().to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v.trim().to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(OpaqueVisitor)
}

/// Split a dotted number into its numeric parts, skipping parts that do not parse.
///
/// ```
/// use bookset::model::parse_number_parts;
///
/// assert_eq!(parse_number_parts("1.2.10"), vec![1, 2, 10]);
/// assert_eq!(parse_number_parts(" 3. "), vec![3]);
/// assert_eq!(parse_number_parts("A.1"), vec![1]);
/// ```
pub fn parse_number_parts(s: &str) -> Vec<u32> {
    s.trim()
        .split('.')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

/// Compare two dotted numbers part by part; missing parts count as 0.
///
/// ```
/// use std::cmp::Ordering;
/// use bookset::model::compare_numbers;
///
/// assert_eq!(compare_numbers("1.2", "1.10"), Ordering::Less);
/// assert_eq!(compare_numbers("1.2", "1.2.0"), Ordering::Equal);
/// ```
pub fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = parse_number_parts(a);
    let b = parse_number_parts(b);
    let n = a.len().max(b.len());
    for i in 0..n {
        let av = a.get(i).copied().unwrap_or(0);
        let bv = b.get(i).copied().unwrap_or(0);
        match av.cmp(&bv) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
