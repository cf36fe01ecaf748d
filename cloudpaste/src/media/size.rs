// ABOUTME: Human readable byte sizes and size-reduction percentages for previews
// ABOUTME: KB values are rounded to whole numbers, MB values keep one decimal

/// Render a byte count as `"<n> KB"` below one megabyte, `"<n.n> MB"` from there on.
pub fn format_size(bytes: usize) -> String {
    let kilobytes = bytes as f64 / 1024.0;
    if kilobytes < 1024.0 {
        format!("{} KB", kilobytes.round() as u64)
    } else {
        format!("{:.1} MB", kilobytes / 1024.0)
    }
}

/// `round((1 - processed / original) * 100)`; negative when processing grew the file.
pub fn reduction_percent(original: usize, processed: usize) -> i64 {
    if original == 0 {
        return 0;
    }
    ((1.0 - processed as f64 / original as f64) * 100.0).round() as i64
}
