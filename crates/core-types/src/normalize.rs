//! Boundary parsing shared by the read and write paths.

/// Collapses every "no section" spelling (absent, empty, whitespace-only)
/// into `None` and trims everything else.
pub fn normalize_section(raw: Option<&str>) -> Option<String> {
    normalize_optional(raw)
}

/// Trims an optional text value, mapping blank input to `None`.
pub fn normalize_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parses a semester given as text.
///
/// Surrounding whitespace is ignored and integral decimals such as `"3.0"`
/// are accepted. Anything else yields `None`.
pub fn parse_semester(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i32>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite()
        && value.fract() == 0.0
        && value >= f64::from(i32::MIN)
        && value <= f64::from(i32::MAX)
    {
        Some(value as i32)
    } else {
        None
    }
}
