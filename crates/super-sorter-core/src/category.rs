//! File-name helpers: extension categories and `_N` renames.

pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// Split a basename into stem and extension (extension keeps its leading dot).
///
/// Leading dots belong to the stem, so `.bashrc` has no extension.
pub fn split_extension(filename: &str) -> (&str, &str) {
    let leading_dots = filename.len() - filename.trim_start_matches('.').len();
    match filename[leading_dots..].rfind('.') {
        Some(pos) => filename.split_at(leading_dots + pos),
        None => (filename, ""),
    }
}

/// Uppercased extension of `filename`, or `UNKNOWN` when there is none.
pub fn category_of(filename: &str) -> String {
    let (_, ext) = split_extension(filename);
    match ext.strip_prefix('.') {
        Some(ext) if !ext.is_empty() => ext.to_uppercase(),
        _ => UNKNOWN_CATEGORY.to_string(),
    }
}

/// `report.txt` with `n = 1` becomes `report_1.txt`.
pub fn suffixed_name(filename: &str, n: u32) -> String {
    let (stem, ext) = split_extension(filename);
    format!("{}_{}{}", stem, n, ext)
}
