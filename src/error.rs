// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Resolve(ResolveError),
    Video(VideoError),
}

/// Failures while resolving a platform media reference into a playable URL.
/// Each variant maps to a localized message shown in a notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The reference points at the platform but carries no recognizable video id.
    MissingVideoId,

    /// The resolver endpoint could not be reached at all.
    Request(String),

    /// The endpoint answered with a non-success HTTP status.
    BadStatus(u16),

    /// The final URL after redirects does not end in an allowed media extension.
    DisallowedExtension(String),
}

impl ResolveError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            ResolveError::MissingVideoId => "error-resolve-missing-video-id",
            ResolveError::Request(_) => "error-resolve-request",
            ResolveError::BadStatus(_) => "error-resolve-bad-status",
            ResolveError::DisallowedExtension(_) => "error-resolve-disallowed-extension",
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::MissingVideoId => write!(f, "No video id found in reference"),
            ResolveError::Request(msg) => write!(f, "Resolver request failed: {}", msg),
            ResolveError::BadStatus(code) => {
                write!(f, "Resolver endpoint answered with status {}", code)
            }
            ResolveError::DisallowedExtension(url) => {
                write!(f, "Resolved URL has no allowed media extension: {}", url)
            }
        }
    }
}

/// Specific error types for video playback issues.
/// Used to provide user-friendly, localized error messages.
#[derive(Debug, Clone)]
pub enum VideoError {
    /// Source could not be opened (bad path, dead URL, unsupported protocol)
    OpenFailed(String),

    /// Video codec is not supported by the system's FFmpeg
    UnsupportedCodec(String),

    /// Source exists but contains no video stream
    NoVideoStream,

    /// Decoding failed during playback
    DecodingFailed(String),

    /// I/O error (file not found, permission denied, network interruption)
    IoError(String),

    /// Generic error with raw message
    Other(String),
}

impl VideoError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            VideoError::OpenFailed(_) => "error-video-open-failed",
            VideoError::UnsupportedCodec(_) => "error-video-unsupported-codec",
            VideoError::NoVideoStream => "error-video-no-video-stream",
            VideoError::DecodingFailed(_) => "error-video-decoding-failed",
            VideoError::IoError(_) => "error-video-io",
            VideoError::Other(_) => "error-video-general",
        }
    }

    /// Attempts to parse a raw error message into a specific VideoError type.
    /// This is used to categorize errors coming out of FFmpeg as strings.
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        // Codec errors may also contain "not found", so check them first
        if msg_lower.contains("codec") || msg_lower.contains("decoder") {
            if let Some(codec) = Self::extract_codec_name(&msg_lower) {
                return VideoError::UnsupportedCodec(codec);
            } else if msg_lower.contains("not found") || msg_lower.contains("unsupported") {
                return VideoError::DecodingFailed(msg.to_string());
            }
        }

        if msg_lower.contains("no such file")
            || (msg_lower.contains("not found") && !msg_lower.contains("decoder"))
            || msg_lower.contains("permission denied")
            || msg_lower.contains("i/o error")
            || msg_lower.contains("connection")
        {
            return VideoError::IoError(msg.to_string());
        }

        if msg_lower.contains("no video stream") || msg_lower.contains("no video track") {
            return VideoError::NoVideoStream;
        }

        if msg_lower.contains("could not open")
            || msg_lower.contains("protocol not found")
            || msg_lower.contains("invalid data found")
        {
            return VideoError::OpenFailed(msg.to_string());
        }

        if msg_lower.contains("packet")
            || msg_lower.contains("scaling")
            || msg_lower.contains("seek")
            || msg_lower.contains("decode")
            || msg_lower.contains("unsupported")
        {
            return VideoError::DecodingFailed(msg.to_string());
        }

        VideoError::Other(msg.to_string())
    }

    /// Tries to extract a codec name from an error message.
    fn extract_codec_name(msg: &str) -> Option<String> {
        // Common patterns: "codec 'xyz' not found", "decoder xyz not found"
        let codecs = [
            "h264", "hevc", "h265", "vp8", "vp9", "av1", "mpeg4", "mpeg2",
        ];
        for codec in codecs {
            if msg.contains(codec) {
                return Some(codec.to_uppercase());
            }
        }
        None
    }
}

impl fmt::Display for VideoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoError::OpenFailed(msg) => write!(f, "Could not open media source: {}", msg),
            VideoError::UnsupportedCodec(codec) => {
                write!(f, "Unsupported video codec: {}", codec)
            }
            VideoError::NoVideoStream => write!(f, "No video stream found"),
            VideoError::DecodingFailed(msg) => write!(f, "Decoding failed: {}", msg),
            VideoError::IoError(msg) => write!(f, "I/O error: {}", msg),
            VideoError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Resolve(e) => write!(f, "Resolve Error: {}", e),
            Error::Video(e) => write!(f, "Video Error: {}", e),
        }
    }
}

impl From<VideoError> for Error {
    fn from(err: VideoError) -> Self {
        Error::Video(err)
    }
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        Error::Resolve(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn resolve_error_converts_into_error() {
        let err: Error = ResolveError::BadStatus(502).into();
        match err {
            Error::Resolve(ResolveError::BadStatus(code)) => assert_eq!(code, 502),
            _ => panic!("expected Resolve variant"),
        }
    }

    #[test]
    fn resolve_error_i18n_keys() {
        assert_eq!(
            ResolveError::MissingVideoId.i18n_key(),
            "error-resolve-missing-video-id"
        );
        assert_eq!(
            ResolveError::BadStatus(404).i18n_key(),
            "error-resolve-bad-status"
        );
        assert_eq!(
            ResolveError::DisallowedExtension("http://x/v.mkv".into()).i18n_key(),
            "error-resolve-disallowed-extension"
        );
    }

    #[test]
    fn resolve_error_display_mentions_status() {
        let err = ResolveError::BadStatus(503);
        assert!(format!("{}", err).contains("503"));
    }

    #[test]
    fn video_error_from_message_io() {
        let err = VideoError::from_message("No such file or directory");
        assert!(matches!(err, VideoError::IoError(_)));
    }

    #[test]
    fn video_error_from_message_no_stream() {
        let err = VideoError::from_message("No video stream found in file");
        assert!(matches!(err, VideoError::NoVideoStream));
    }

    #[test]
    fn video_error_from_message_codec() {
        let err = VideoError::from_message("Decoder h264 not found");
        assert!(matches!(err, VideoError::UnsupportedCodec(codec) if codec == "H264"));
    }

    #[test]
    fn video_error_from_message_open_failed() {
        let err = VideoError::from_message("Invalid data found when processing input");
        assert!(matches!(err, VideoError::OpenFailed(_)));
    }

    #[test]
    fn video_error_from_message_decoding() {
        let err = VideoError::from_message("Packet send failed: error");
        assert!(matches!(err, VideoError::DecodingFailed(_)));
    }

    #[test]
    fn video_error_i18n_keys() {
        assert_eq!(
            VideoError::OpenFailed("x".into()).i18n_key(),
            "error-video-open-failed"
        );
        assert_eq!(
            VideoError::NoVideoStream.i18n_key(),
            "error-video-no-video-stream"
        );
    }

    #[test]
    fn video_error_display() {
        let err = VideoError::UnsupportedCodec("H264".to_string());
        assert!(format!("{}", err).contains("H264"));
    }
}
