//! File name handling for downloaded payloads.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static EXTENDED_FILENAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?i)filename\*\s*=\s*[^']*'[^']*'([^;\s]+)"#).ok());

static PLAIN_FILENAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*(?:"([^"]*)"|([^;]+))"#).ok());

/// Extract the file name from a raw `Content-Disposition` header value.
///
/// The RFC 5987 `filename*` form wins over plain `filename`. Header bytes
/// are read as UTF-8; anything else is treated as unparsable.
pub fn parse_content_disposition(raw: &[u8]) -> Option<String> {
    let value = std::str::from_utf8(raw).ok()?;

    if let Some(caps) = EXTENDED_FILENAME.as_ref().and_then(|re| re.captures(value)) {
        if let Ok(decoded) = urlencoding::decode(&caps[1]) {
            let name = decoded.trim().to_string();
            if !name.is_empty() {
                return Some(name);
            }
        }
    }

    let caps = PLAIN_FILENAME.as_ref()?.captures(value)?;
    let name = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Flatten a remote name into a single safe path component.
///
/// Directory parts are kept and joined with `_`, so `Season1/chs/ep01.srt`
/// and `Season1/cht/ep01.srt` stay distinct. Empty, `.` and `..` parts are
/// dropped. A name ending in a separator names no file.
pub fn local_file_name(remote: &str) -> Option<String> {
    let remote = remote.trim();
    if remote.ends_with(['/', '\\']) {
        return None;
    }

    let parts: Vec<&str> = remote
        .split(['/', '\\'])
        .map(str::trim)
        .filter(|part| !matches!(*part, "" | "." | ".."))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("_"))
    }
}

/// Local name for a payload of the candidate at `index`.
pub fn indexed_file_name(index: usize, name: &str) -> String {
    format!("[{}]{}", index, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attachment_quoted() {
        assert_eq!(
            parse_content_disposition(br#"attachment; filename="movie.chs.srt""#),
            Some("movie.chs.srt".to_string())
        );
    }

    #[test]
    fn test_parse_attachment_unquoted() {
        assert_eq!(
            parse_content_disposition(b"attachment; filename=movie.srt"),
            Some("movie.srt".to_string())
        );
    }

    #[test]
    fn test_parse_utf8_bytes() {
        let header = "attachment; filename=电影.srt".as_bytes();
        assert_eq!(
            parse_content_disposition(header),
            Some("电影.srt".to_string())
        );
    }

    #[test]
    fn test_parse_extended_wins() {
        assert_eq!(
            parse_content_disposition(
                b"attachment; filename=\"fallback.srt\"; filename*=UTF-8''%E7%94%B5%E5%BD%B1.srt"
            ),
            Some("电影.srt".to_string())
        );
    }

    #[test]
    fn test_parse_missing_filename() {
        assert_eq!(parse_content_disposition(b"attachment"), None);
        assert_eq!(parse_content_disposition(b"attachment; filename=\"\""), None);
        assert_eq!(parse_content_disposition(b""), None);
    }

    #[test]
    fn test_parse_invalid_utf8() {
        assert_eq!(
            parse_content_disposition(b"attachment; filename=\xff\xfe.srt"),
            None
        );
    }

    #[test]
    fn test_local_file_name() {
        assert_eq!(local_file_name("movie.srt"), Some("movie.srt".to_string()));
        assert_eq!(
            local_file_name("../../etc/passwd"),
            Some("etc_passwd".to_string())
        );
        assert_eq!(
            local_file_name("subs\\ep01.ass"),
            Some("subs_ep01.ass".to_string())
        );
        assert_eq!(
            local_file_name("Season1/./chs//ep01.srt"),
            Some("Season1_chs_ep01.srt".to_string())
        );
        assert_eq!(local_file_name("dir/"), None);
        assert_eq!(local_file_name(".."), None);
        assert_eq!(local_file_name("  "), None);
    }

    #[test]
    fn test_indexed_file_name() {
        assert_eq!(indexed_file_name(1, "movie.srt"), "[1]movie.srt");
        assert_eq!(indexed_file_name(12, "a.ass"), "[12]a.ass");
    }
}
