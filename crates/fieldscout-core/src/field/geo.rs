use std::sync::LazyLock;

use regex::Regex;

/// Name tokens that mark a column as geographic.
pub const GEO_VOCABULARY: &[&str] = &[
    "latitude",
    "longitude",
    "lat",
    "lng",
    "country",
    "region",
    "iso",
];

/// Lower/digit followed by upper: a camel-case word boundary.
static CAMEL_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Split a column name into lower-case word tokens.
///
/// `AdminRegion2` → `["admin", "region"]`, `lat_deg` → `["lat", "deg"]`.
pub fn name_tokens(name: &str) -> Vec<String> {
    let spaced = name.replace('_', " ");
    let split = CAMEL_BOUNDARY.replace_all(&spaced, "$1 $2");
    let without_digits: String = split.chars().filter(|c| !c.is_ascii_digit()).collect();
    without_digits
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// True if any token of `name` is in [`GEO_VOCABULARY`].
pub fn is_geo_name(name: &str) -> bool {
    name_tokens(name)
        .iter()
        .any(|token| GEO_VOCABULARY.contains(&token.as_str()))
}
