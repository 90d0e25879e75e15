//! Common utility functions used across modules.
//!
//! - [`format_count`] - Format counts with K/M suffix (1.5K, 2.3M)
//! - [`file_stem_for`] - Turn a category name into a safe file stem

/// Format a count with K/M suffix for compact display.
///
/// # Examples
/// ```
/// use routerus::utils::format_count;
/// assert_eq!(format_count(500), "500");
/// assert_eq!(format_count(1500), "1.5K");
/// assert_eq!(format_count(1_500_000), "1.5M");
/// ```
pub fn format_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// File stem for a category's route file.
///
/// Category names are used verbatim except for path separators and NUL,
/// which become `_`. An empty result becomes `_`.
///
/// # Examples
/// ```
/// use routerus::utils::file_stem_for;
/// assert_eq!(file_stem_for("Banks"), "Banks");
/// assert_eq!(file_stem_for("Maps/Navigation"), "Maps_Navigation");
/// ```
pub fn file_stem_for(category: &str) -> String {
    let stem: String = category
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => stem,
    }
}
