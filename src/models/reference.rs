//! C1: service reference and recording-ID utilities.
//!
//! A service reference is an Enigma2 colon-separated identifier, optionally
//! ending in an absolute receiver-side filesystem path (after the 10th
//! colon). A recording ID is a hex-encoded opaque token standing in for a
//! raw reference in client-facing URLs.

use std::path::{Path, PathBuf};

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Error, Result};

/// Characters allowed unescaped in `escape_service_ref_path` output:
/// `[A-Za-z0-9-._~:/]`. Every other byte is percent-encoded with uppercase
/// hex, matching §4.9.
const SERVICE_REF_PATH_ALLOWED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'/');

fn has_control_or_format_char(s: &str) -> bool {
    s.chars().any(|c| c.is_control() || is_format_char(c))
}

/// Approximates Unicode category `Cf` (format characters) without pulling in
/// a full Unicode-properties crate: the handful of zero-width/bidi control
/// points that matter for reference smuggling.
fn is_format_char(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{FEFF}'
    )
}

fn contains_dotdot(path: &str) -> bool {
    path.split('/').any(|seg| seg == "..")
}

/// Text after the 10th colon in a service reference, if present.
///
/// Returns `None` when the ref has fewer than 10 colons (a pure channel
/// reference with no trailing path), or when the suffix after the 10th
/// colon is empty.
#[must_use]
pub fn extract_receiver_path(service_ref: &str) -> Option<&str> {
    let mut idx = 0;
    let mut colons_seen = 0;
    for (i, c) in service_ref.char_indices() {
        if c == ':' {
            colons_seen += 1;
            if colons_seen == 10 {
                idx = i + 1;
                break;
            }
        }
    }
    if colons_seen < 10 {
        return None;
    }
    let suffix = &service_ref[idx..];
    if suffix.is_empty() {
        None
    } else {
        Some(suffix)
    }
}

/// Validates a recording reference per §4.9: valid UTF-8 (guaranteed by
/// `&str`), no control/format characters, no `\`, `?`, `#`; any trailing
/// path must start with `/` and must not contain `/../` (or end in `/..`),
/// checked both on the raw text and after percent-decoding.
pub fn validate_recording_ref(service_ref: &str) -> Result<()> {
    if service_ref.is_empty() {
        return Err(Error::InvalidArgument("empty service reference".into()));
    }
    if has_control_or_format_char(service_ref) {
        return Err(Error::InvalidArgument(
            "service reference contains control characters".into(),
        ));
    }
    if service_ref.contains('\\') || service_ref.contains('?') || service_ref.contains('#') {
        return Err(Error::InvalidArgument(
            "service reference contains forbidden characters".into(),
        ));
    }

    if let Some(path) = extract_receiver_path(service_ref) {
        if !path.starts_with('/') {
            return Err(Error::InvalidArgument(
                "trailing path must be absolute".into(),
            ));
        }
        check_no_traversal(path)?;
        let decoded = percent_decode_lossy(path);
        check_no_traversal(&decoded)?;
    }

    Ok(())
}

fn check_no_traversal(path: &str) -> Result<()> {
    if contains_dotdot(path) || path.ends_with("/..") {
        return Err(Error::InvalidArgument(
            "path traversal is not allowed".into(),
        ));
    }
    Ok(())
}

fn percent_decode_lossy(s: &str) -> String {
    percent_encoding::percent_decode_str(s)
        .decode_utf8_lossy()
        .into_owned()
}

/// Validates a live-channel reference: same rules as `validate_recording_ref`
/// plus no `/` at all (live refs are purely colon-structural) and at least
/// one colon.
pub fn validate_live_ref(service_ref: &str) -> Result<()> {
    if has_control_or_format_char(service_ref) {
        return Err(Error::InvalidArgument(
            "live reference contains control characters".into(),
        ));
    }
    if service_ref.contains('\\') || service_ref.contains('?') || service_ref.contains('#') {
        return Err(Error::InvalidArgument(
            "live reference contains forbidden characters".into(),
        ));
    }
    if service_ref.contains('/') {
        return Err(Error::InvalidArgument(
            "live reference must not contain a path".into(),
        ));
    }
    if !service_ref.contains(':') {
        return Err(Error::InvalidArgument(
            "live reference must contain at least one colon".into(),
        ));
    }
    Ok(())
}

/// Lowercase hex encoding of the reference's UTF-8 bytes. 1-1024 chars per
/// the caller's string (the hex expansion may be up to 2048 chars).
#[must_use]
pub fn encode_recording_id(service_ref: &str) -> String {
    hex::encode(service_ref.as_bytes())
}

/// Reverses `encode_recording_id`, re-validating the decoded reference.
///
/// Rejects: non-hex input, empty decode, non-UTF-8 bytes, an embedded NUL,
/// or a reference that fails `validate_recording_ref`.
pub fn decode_recording_id(id: &str) -> Result<String> {
    if id.is_empty() || id.len() > 1024 {
        return Err(Error::InvalidArgument(
            "recording id length out of range".into(),
        ));
    }
    let bytes = hex::decode(id)
        .map_err(|_| Error::InvalidArgument("recording id is not valid hex".into()))?;
    if bytes.is_empty() {
        return Err(Error::InvalidArgument("recording id decodes to empty".into()));
    }
    if bytes.contains(&0u8) {
        return Err(Error::InvalidArgument(
            "recording id decodes to a NUL byte".into(),
        ));
    }
    let service_ref = String::from_utf8(bytes)
        .map_err(|_| Error::InvalidArgument("recording id is not valid UTF-8".into()))?;
    validate_recording_ref(&service_ref)?;
    Ok(service_ref)
}

/// Percent-encodes every byte except `[A-Za-z0-9-._~:/]`, uppercase hex.
/// Callers must pass raw (unescaped) references; re-applying this to an
/// already-escaped string would double-encode any literal `%`.
#[must_use]
pub fn escape_service_ref_path(s: &str) -> String {
    percent_encode(s.as_bytes(), SERVICE_REF_PATH_ALLOWED).to_string()
}

/// Strips a leading `/`, lexically cleans the path, and rejects traversal
/// or forbidden characters. Used to validate relative paths under a
/// recording's cache directory before touching the filesystem.
pub fn sanitize_recording_rel_path(p: &str) -> Result<String> {
    if has_control_or_format_char(p) || p.contains('\\') || p.contains('?') || p.contains('#') {
        return Err(Error::Forbidden("relative path contains forbidden characters".into()));
    }
    let stripped = p.strip_prefix('/').unwrap_or(p);
    let cleaned = clean_path(stripped);
    if cleaned == ".." || cleaned.starts_with("../") {
        return Err(Error::Forbidden("relative path escapes its root".into()));
    }
    Ok(cleaned)
}

/// A minimal `path.Clean`-equivalent over `/`-separated segments: collapses
/// `.` and empty segments, resolves `..` against preceding segments when
/// possible (leaving a leading run of `..` untouched, same as Go's
/// `path.Clean`).
fn clean_path(p: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for seg in p.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                if let Some(last) = out.last() {
                    if *last != ".." {
                        out.pop();
                        continue;
                    }
                }
                out.push("..");
            }
            _ => out.push(seg),
        }
    }
    if out.is_empty() {
        ".".to_string()
    } else {
        out.join("/")
    }
}

/// Whether `path`'s basename is an allowed HLS segment/init file: `init.mp4`
/// exactly, or a `seg_`-prefixed file ending in `.ts`/`.m4s`/`.cmfv`
/// (case-insensitive).
#[must_use]
pub fn is_allowed_video_segment(path: &str) -> bool {
    let basename = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    if basename.eq_ignore_ascii_case("init.mp4") {
        return true;
    }
    let lower = basename.to_ascii_lowercase();
    lower.starts_with("seg_")
        && (lower.ends_with(".ts") || lower.ends_with(".m4s") || lower.ends_with(".cmfv"))
}

/// An ordered list of `(receiver_root, local_root)` pairs (§3).
#[derive(Debug, Clone, Default)]
pub struct PathMapping {
    pairs: Vec<(String, String)>,
}

impl PathMapping {
    #[must_use]
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First mapping whose local side exists on disk for `receiver_path`,
    /// with both sides cleaned and symlink-resolved so `/var` and
    /// `/private/var` variants match (a macOS quirk the teacher's own
    /// deployment targets run into via Docker Desktop bind mounts).
    #[must_use]
    pub fn resolve_local_existing(&self, receiver_path: &str) -> Option<PathBuf> {
        for (receiver_root, local_root) in &self.pairs {
            if let Some(rel) = strip_root(receiver_path, receiver_root) {
                let candidate = Path::new(local_root).join(rel.trim_start_matches('/'));
                if let Some(resolved) = canonicalize_existing(&candidate) {
                    return Some(resolved);
                }
            }
        }
        None
    }
}

fn strip_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return Some(path);
    }
    path.strip_prefix(root)
}

fn canonicalize_existing(path: &Path) -> Option<PathBuf> {
    let canonical = path.canonicalize().ok()?;
    normalize_private_var(&canonical)
}

/// Normalizes macOS's `/private/var` symlink target back to `/var` form so
/// configured mappings under either spelling compare equal.
fn normalize_private_var(path: &Path) -> Option<PathBuf> {
    let s = path.to_str()?;
    if let Some(rest) = s.strip_prefix("/private/var") {
        Some(PathBuf::from(format!("/var{rest}")))
    } else {
        Some(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_path_after_tenth_colon() {
        let r = "1:0:1:0:0:0:0:0:0:0:/media/hdd/movie/foo.ts";
        assert_eq!(extract_receiver_path(r), Some("/media/hdd/movie/foo.ts"));
    }

    #[test]
    fn extract_path_missing_when_fewer_colons() {
        assert_eq!(extract_receiver_path("1:0:1:0"), None);
    }

    #[test]
    fn validate_rejects_traversal_raw_and_decoded() {
        let raw = "1:0:1:0:0:0:0:0:0:0:/media/../etc/passwd";
        assert!(validate_recording_ref(raw).is_err());

        let encoded = "1:0:1:0:0:0:0:0:0:0:/media/%2e%2e/etc/passwd";
        assert!(validate_recording_ref(encoded).is_err());
    }

    #[test]
    fn validate_rejects_forbidden_chars() {
        assert!(validate_recording_ref("1:0:1:0:0:0:0:0:0:0:/a?b").is_err());
        assert!(validate_recording_ref("1:0:1:0:0:0:0:0:0:0:/a#b").is_err());
        assert!(validate_recording_ref("1:0:1:0:0:0:0:0:0:0:/a\\b").is_err());
    }

    #[test]
    fn validate_accepts_bare_channel_ref() {
        assert!(validate_recording_ref("1:0:1:1:1:1:1:0:0:0:").is_ok());
    }

    #[test]
    fn live_ref_rejects_path() {
        assert!(validate_live_ref("1:0:1:1:1:1:1:0:0:0:/x").is_err());
        assert!(validate_live_ref("1:0:1:1:1:1:1:0:0:0:").is_ok());
        assert!(validate_live_ref("noColonsHere").is_err());
    }

    #[test]
    fn recording_id_round_trips() {
        let r = "1:0:1:0:0:0:0:0:0:0:/media/hdd/movie/My Recording.ts";
        let id = encode_recording_id(r);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
        let decoded = decode_recording_id(&id).unwrap();
        assert_eq!(decoded, r);
    }

    #[test]
    fn decode_rejects_non_hex() {
        assert!(decode_recording_id("not-hex!!").is_err());
    }

    #[test]
    fn decode_rejects_empty() {
        assert!(decode_recording_id("").is_err());
    }

    #[test]
    fn decode_rejects_embedded_nul() {
        let id = hex::encode(b"1:0:1:0:0:0:0:0:0:0:/a\0b");
        assert!(decode_recording_id(&id).is_err());
    }

    #[test]
    fn escape_preserves_colon_and_slash_encodes_space() {
        let s = "1:0:1:1:1:1:1:0:0:0:/media/hdd/movie/My Recording.ts";
        let escaped = escape_service_ref_path(s);
        assert!(escaped.contains("/1:0:1:1:1:1:1:0:0:0:/media/hdd/movie/My%20Recording.ts"));
        assert!(!escaped.contains("%3A"));
        assert!(!escaped.contains("%2520"));
    }

    #[test]
    fn escape_is_idempotent_on_already_clean_input() {
        let s = "abc-._~:/123";
        assert_eq!(escape_service_ref_path(s), s);
    }

    #[test]
    fn sanitize_rejects_parent_escape() {
        assert!(sanitize_recording_rel_path("../../etc/passwd").is_err());
        assert!(sanitize_recording_rel_path("..").is_err());
    }

    #[test]
    fn sanitize_cleans_redundant_segments() {
        assert_eq!(
            sanitize_recording_rel_path("/a/./b/../c").unwrap(),
            "a/c"
        );
    }

    #[test]
    fn allowed_video_segment_patterns() {
        assert!(is_allowed_video_segment("init.mp4"));
        assert!(is_allowed_video_segment("INIT.MP4"));
        assert!(is_allowed_video_segment("seg_001.ts"));
        assert!(is_allowed_video_segment("seg_001.M4S"));
        assert!(is_allowed_video_segment("seg_1.cmfv"));
        assert!(!is_allowed_video_segment("other.ts"));
        assert!(!is_allowed_video_segment("seg_1.mp3"));
    }
}
