//! URL parsing and validation utilities
//!
//! Provides helpers for extracting artifact file names from URLs and
//! validating URL schemes.

/// Schemes a direct fetch may use.
const HTTP_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Whether a URL uses http or https.
pub fn is_http_url(url: &str) -> bool {
    let url_lower = url.trim().to_lowercase();
    HTTP_SCHEMES.iter().any(|s| url_lower.starts_with(s))
}

/// Join an index base URL with a path, tolerating trailing/leading slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Extract filename from a URL.
///
/// Handles query strings, fragments and percent-encoding; returns "download"
/// as fallback.
///
/// # Example
/// ```ignore
/// assert_eq!(extract_filename("https://example.com/foo-1.0-py3-none-any.whl"), "foo-1.0-py3-none-any.whl");
/// assert_eq!(extract_filename("https://example.com/file?v=1"), "file");
/// ```
pub fn extract_filename(url: &str) -> String {
    let clean_url = url.split('?').next().unwrap_or(url);
    let clean_url = clean_url.split('#').next().unwrap_or(clean_url);

    // Bare host, no path segment
    let path = clean_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(clean_url);
    if !path.contains('/') {
        return "download".to_string();
    }

    path.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| sanitize_filename(&percent_decode(s)))
        .unwrap_or_else(|| "download".to_string())
}

/// Simple percent-decoding for URL path segments.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let Some(byte) = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|h| u8::from_str_radix(h, 16).ok())
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Sanitize a filename for safe filesystem use.
///
/// Replaces problematic characters and handles special names.
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() || name == "." || name == ".." {
        return "download".to_string();
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Trim leading/trailing whitespace and dots
    let trimmed = sanitized.trim().trim_matches('.');

    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}
