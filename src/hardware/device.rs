//! Field extraction from raw device listing lines.
//!
//! Device lines stay opaque strings everywhere else; these helpers pull out the
//! pieces the `-nnmm` format carries when someone needs them.

use regex::Regex;

/// PCI classes of display controllers: VGA compatible and 3D.
pub const DISPLAY_CLASSES: [&str; 2] = ["0300", "0302"];

/// Every `"..."` field of a line, in order.
pub fn quoted_fields(line: &str) -> Vec<&str> {
    let Ok(re) = Regex::new(r#""(.*?)""#) else {
        return Vec::new();
    };
    re.captures_iter(line)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Contents of the first `[...]` token, if any.
pub fn first_bracket_token(field: &str) -> Option<&str> {
    let re = Regex::new(r"\[(.*?)\]").ok()?;
    re.captures(field)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Whether the line carries the `[class]` tag.
pub fn has_class(line: &str, class_id: &str) -> bool {
    line.contains(&format!("[{class_id}]"))
}

pub fn is_display_controller(line: &str) -> bool {
    DISPLAY_CLASSES.iter().any(|class| has_class(line, class))
}

/// Vendor and device fields of a `-nnmm` line, when it has at least three
/// quoted fields.
pub fn vendor_and_device(line: &str) -> Option<(&str, &str)> {
    match quoted_fields(line).as_slice() {
        [_, vendor, device, ..] => Some((*vendor, *device)),
        _ => None,
    }
}
