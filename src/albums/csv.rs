//! CSV rendering for the album export.

use super::{Album, EXPORT_COLUMNS};

/// Render albums as CSV: one header row, then one row per album, columns in
/// [`EXPORT_COLUMNS`] order.
pub fn to_csv(albums: &[Album]) -> String {
    let mut lines = Vec::with_capacity(albums.len() + 1);
    lines.push(EXPORT_COLUMNS.join(","));

    for album in albums {
        let row = [
            album.user_id.to_string(),
            album.id.to_string(),
            escape_field(&album.title),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Quote a field when it contains a comma, quote, or newline; embedded
/// quotes are doubled.
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
