//! C8: capability resolver — identity-bound profile lookup producing an
//! immutable `PlaybackCapabilities`. Servers may constrain a client's
//! declared capabilities but must never extend them (§4.7, normative).

use crate::models::{DeviceType, MaxVideo, PlaybackCapabilities};

/// Named fixtures selectable by profile name or device type (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileName {
    Tvos,
    StbEnigma2,
    VlcDesktop,
    AndroidTv,
    WebConservative,
}

impl ProfileName {
    #[must_use]
    pub fn from_str_lossy(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "tvos" => Self::Tvos,
            "stb_enigma2" | "stb-enigma2" => Self::StbEnigma2,
            "vlc_desktop" | "vlc-desktop" => Self::VlcDesktop,
            "android_tv" | "android-tv" => Self::AndroidTv,
            "safari" => Self::Tvos,
            _ => Self::WebConservative,
        }
    }

    fn fixture(self) -> PlaybackCapabilities {
        match self {
            Self::Tvos => PlaybackCapabilities {
                capabilities_version: 0,
                containers: vec!["mp4".into(), "mov".into(), "m4v".into()],
                video_codecs: vec!["h264".into(), "hevc".into()],
                audio_codecs: vec!["aac".into(), "ac3".into()],
                supports_hls: true,
                device_type: Some(DeviceType::Tvos),
                allow_transcode: Some(true),
                max_video: Some(MaxVideo { width: 3840, height: 2160 }),
            },
            Self::StbEnigma2 => PlaybackCapabilities {
                capabilities_version: 0,
                containers: vec!["ts".into(), "mpegts".into()],
                video_codecs: vec!["h264".into(), "mpeg2".into(), "hevc".into()],
                audio_codecs: vec!["ac3".into(), "mp2".into(), "aac".into()],
                supports_hls: true,
                device_type: Some(DeviceType::StbEnigma2),
                allow_transcode: Some(false),
                max_video: None,
            },
            Self::VlcDesktop => PlaybackCapabilities {
                capabilities_version: 0,
                containers: vec!["mp4".into(), "ts".into(), "mpegts".into(), "mov".into()],
                video_codecs: vec!["h264".into(), "hevc".into(), "mpeg2".into()],
                audio_codecs: vec!["aac".into(), "ac3".into(), "mp2".into(), "mp3".into()],
                supports_hls: true,
                device_type: Some(DeviceType::VlcDesktop),
                allow_transcode: Some(true),
                max_video: None,
            },
            Self::AndroidTv => PlaybackCapabilities {
                capabilities_version: 0,
                containers: vec!["mp4".into(), "ts".into()],
                video_codecs: vec!["h264".into(), "hevc".into()],
                audio_codecs: vec!["aac".into(), "ac3".into()],
                supports_hls: true,
                device_type: Some(DeviceType::AndroidTv),
                allow_transcode: Some(true),
                max_video: Some(MaxVideo { width: 3840, height: 2160 }),
            },
            Self::WebConservative => PlaybackCapabilities {
                capabilities_version: 0,
                containers: vec!["mp4".into()],
                video_codecs: vec!["h264".into()],
                audio_codecs: vec!["aac".into()],
                supports_hls: true,
                device_type: Some(DeviceType::Generic),
                allow_transcode: Some(true),
                max_video: Some(MaxVideo { width: 1920, height: 1080 }),
            },
        }
    }
}

/// Resolves capabilities for a playback request. If `client_caps` declares
/// `capabilities_version > 0`, it is treated as authoritative and only
/// constrained (never extended) by `server_max`; otherwise a named fixture
/// is selected by `profile_name` and canonicalized.
#[must_use]
pub fn resolve_capabilities(
    profile_name: &str,
    client_caps: Option<PlaybackCapabilities>,
    server_max: Option<&MaxVideo>,
) -> PlaybackCapabilities {
    let mut caps = match client_caps {
        Some(caps) if caps.capabilities_version > 0 => caps,
        _ => ProfileName::from_str_lossy(profile_name).fixture(),
    };

    if let Some(server_max) = server_max {
        caps.max_video = Some(match caps.max_video {
            Some(existing) => MaxVideo {
                width: existing.width.min(server_max.width),
                height: existing.height.min(server_max.height),
            },
            None => *server_max,
        });
    }

    caps.canonicalized()
}
