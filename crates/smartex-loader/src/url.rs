//! Encoding URL derivation

/// Swap the extension of the last path segment for `suffix`
///
/// Query string and fragment are dropped first, then everything after the
/// last `.` of the final segment is replaced. A segment without a `.` gets
/// `.suffix` appended.
pub fn derive_encoding_url(url: &str, suffix: &str) -> String {
    let path = url.find(['?', '#']).map_or(url, |end| &url[..end]);
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);

    match path[segment_start..].rfind('.') {
        Some(dot) => format!("{}{}", &path[..segment_start + dot + 1], suffix),
        None => format!("{path}.{suffix}"),
    }
}
