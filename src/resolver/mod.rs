// SPDX-License-Identifier: MPL-2.0
//! Media reference resolution for the supported hosting platform.
//!
//! References pointing at Bilibili carry a video id of the form `BV`
//! followed by ten word characters. Resolution asks a passthrough endpoint
//! for that id and follows the redirect chain; the final URL must end in an
//! allowed media extension before it is accepted as playable. Everything
//! else (direct URLs, local paths) passes through untouched upstream of
//! this module.
//!
//! Resolution happens strictly before a playback session starts. A failure
//! aborts the play transition; nothing is retried.

use crate::error::ResolveError;

/// Length of the word-character tail after the `BV` prefix.
const VIDEO_ID_TAIL_LEN: usize = 10;

/// User agent sent with resolver requests.
const USER_AGENT: &str = "IcedRefrain/0.1.0";

/// Maximum redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Returns true when a media reference needs platform resolution.
///
/// Full platform URLs are recognized by their host; a bare video id (the
/// whole reference being `BV` + 10 word characters) is accepted as well.
pub fn requires_resolution(reference: &str) -> bool {
    let trimmed = reference.trim();
    trimmed.contains("bilibili.com") || extract_video_id(trimmed).as_deref() == Some(trimmed)
}

/// Extracts the first `BV`-prefixed video id from a reference.
///
/// Word characters are ASCII letters, digits and underscore, exactly ten of
/// them after the prefix.
pub fn extract_video_id(reference: &str) -> Option<String> {
    let bytes = reference.as_bytes();
    let id_len = 2 + VIDEO_ID_TAIL_LEN;
    if bytes.len() < id_len {
        return None;
    }

    for start in 0..=bytes.len() - id_len {
        if bytes[start] != b'B' || bytes[start + 1] != b'V' {
            continue;
        }
        let tail = &bytes[start + 2..start + id_len];
        if tail
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            // The scan only ever looks at ASCII, so this slice is valid UTF-8.
            return String::from_utf8(bytes[start..start + id_len].to_vec()).ok();
        }
    }
    None
}

/// Checks whether a URL ends in one of the allowed media extensions,
/// either at the end of the string or right before a query string.
/// Matching is case-insensitive.
pub fn extension_allowed(url: &str, allowed: &[String]) -> bool {
    let lower = url.to_ascii_lowercase();
    allowed.iter().any(|ext| {
        let needle = format!(".{}", ext.to_ascii_lowercase());
        let mut from = 0;
        while let Some(pos) = lower[from..].find(&needle) {
            let end = from + pos + needle.len();
            if end == lower.len() || lower.as_bytes().get(end) == Some(&b'?') {
                return true;
            }
            from += pos + 1;
        }
        false
    })
}

/// Resolves platform references into direct media URLs.
///
/// Endpoint and allow-list come from `[resolver]` in the config file; the
/// resolver itself holds plain values so it can be cloned into an async
/// task per invocation.
#[derive(Debug, Clone)]
pub struct Resolver {
    endpoint: String,
    allowed_extensions: Vec<String>,
}

impl Resolver {
    pub fn new(endpoint: impl Into<String>, allowed_extensions: Vec<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            allowed_extensions,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Resolves a platform reference into a direct media URL.
    ///
    /// One GET against the passthrough endpoint, redirects followed; the
    /// URL the chain lands on is validated against the allow-list and
    /// returned. Every failure is terminal for this attempt.
    pub async fn resolve(&self, reference: &str) -> std::result::Result<String, ResolveError> {
        let video_id = extract_video_id(reference).ok_or(ResolveError::MissingVideoId)?;
        let request_url = format!("{}?id={}", self.endpoint, video_id);

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ResolveError::Request(e.to_string()))?;

        let response = client
            .get(&request_url)
            .send()
            .await
            .map_err(|e| ResolveError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResolveError::BadStatus(response.status().as_u16()));
        }

        let final_url = response.url().to_string();
        if !extension_allowed(&final_url, &self.allowed_extensions) {
            return Err(ResolveError::DisallowedExtension(final_url));
        }

        Ok(final_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_extensions() -> Vec<String> {
        vec!["mp4".to_string(), "m4s".to_string(), "flv".to_string()]
    }

    #[test]
    fn extracts_id_from_full_url() {
        let id = extract_video_id("https://www.bilibili.com/video/BV1GJ411x7h7/?p=2");
        assert_eq!(id.as_deref(), Some("BV1GJ411x7h7"));
    }

    #[test]
    fn extracts_bare_id() {
        assert_eq!(
            extract_video_id("BV1GJ411x7h7").as_deref(),
            Some("BV1GJ411x7h7")
        );
    }

    #[test]
    fn extracts_first_id_when_several_present() {
        let id = extract_video_id("BV1aaaaaaaaa BV2bbbbbbbbb");
        assert_eq!(id.as_deref(), Some("BV1aaaaaaaaa"));
    }

    #[test]
    fn id_tail_may_contain_underscores() {
        assert_eq!(
            extract_video_id("watch?v=BV1_2_3_4_5_").as_deref(),
            Some("BV1_2_3_4_5_")
        );
    }

    #[test]
    fn short_tail_is_not_an_id() {
        assert_eq!(extract_video_id("BV12345"), None);
    }

    #[test]
    fn tail_interrupted_by_punctuation_is_not_an_id() {
        assert_eq!(extract_video_id("BV1GJ411-7h7x"), None);
    }

    #[test]
    fn overlong_tail_still_matches_first_ten() {
        // Same as the first match of a 10-character word run: extra word
        // characters after the id simply stay outside the match.
        assert_eq!(
            extract_video_id("BV1GJ411x7h7extra").as_deref(),
            Some("BV1GJ411x7h7")
        );
    }

    #[test]
    fn no_id_in_plain_url() {
        assert_eq!(extract_video_id("https://example.com/video.mp4"), None);
    }

    #[test]
    fn platform_urls_require_resolution() {
        assert!(requires_resolution(
            "https://www.bilibili.com/video/BV1GJ411x7h7"
        ));
        assert!(requires_resolution("http://bilibili.com/x"));
    }

    #[test]
    fn bare_id_requires_resolution() {
        assert!(requires_resolution("BV1GJ411x7h7"));
        assert!(requires_resolution("  BV1GJ411x7h7  "));
    }

    #[test]
    fn direct_urls_pass_through() {
        assert!(!requires_resolution("https://example.com/video.mp4"));
        assert!(!requires_resolution("/home/user/practice.mp4"));
        assert!(!requires_resolution("BV1GJ411x7h7extra"));
    }

    #[test]
    fn extension_allowed_at_end_of_url() {
        assert!(extension_allowed(
            "https://cdn.example.com/v/123.mp4",
            &default_extensions()
        ));
    }

    #[test]
    fn extension_allowed_before_query_string() {
        assert!(extension_allowed(
            "https://cdn.example.com/v/123.m4s?sign=abc&expires=1",
            &default_extensions()
        ));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(extension_allowed(
            "https://cdn.example.com/V/123.MP4",
            &default_extensions()
        ));
    }

    #[test]
    fn extension_mid_path_does_not_count() {
        assert!(!extension_allowed(
            "https://cdn.example.com/v.mp4.token/stream",
            &default_extensions()
        ));
    }

    #[test]
    fn disallowed_extension_is_rejected() {
        assert!(!extension_allowed(
            "https://cdn.example.com/v/123.mkv",
            &default_extensions()
        ));
    }

    #[test]
    fn allow_list_is_configurable() {
        let custom = vec!["webm".to_string()];
        assert!(extension_allowed("https://x/v.webm", &custom));
        assert!(!extension_allowed("https://x/v.mp4", &custom));
    }

    #[test]
    fn resolver_keeps_endpoint_and_allow_list() {
        let resolver = Resolver::new("http://localhost:9000/api", default_extensions());
        assert_eq!(resolver.endpoint(), "http://localhost:9000/api");
        assert_eq!(resolver.allowed_extensions().len(), 3);
    }

    #[tokio::test]
    async fn resolve_without_id_fails_before_any_request() {
        let resolver = Resolver::new("http://127.0.0.1:1/api", default_extensions());
        let result = resolver.resolve("https://www.bilibili.com/video/short").await;
        assert_eq!(result, Err(ResolveError::MissingVideoId));
    }
}
