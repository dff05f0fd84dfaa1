use std::fmt::Display;
use std::io;
use std::path::Path;
use std::process::Command;
use serde::Deserialize;
use serde_json;
use tracing::debug;

use crate::error::{HvecError, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum CodecType {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    Other(String),
}

impl CodecType {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "video" => CodecType::Video,
            "audio" => CodecType::Audio,
            "subtitle" => CodecType::Subtitle,
            "data" => CodecType::Data,
            "attachment" => CodecType::Attachment,
            _ => CodecType::Other(String::from(s)),
        }
    }
}

impl Display for CodecType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecType::Other(kind) => write!(f, "{}", kind.to_lowercase()),
            _ => write!(f, "{}", format!("{:?}", self).to_lowercase()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    pub index: u32,
    pub codec_type: CodecType,
    pub codec_name: Option<String>,
    /// Explicit total frame count, only when ffprobe reports a plain decimal number.
    pub nb_frames: Option<u64>,
    pub duration: Option<f64>,
    /// Raw "num/den" rate string.
    pub avg_frame_rate: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MediaProbeResult {
    pub streams: Vec<StreamInfo>,
    pub format_name: Option<String>,
    /// Container duration in seconds.
    pub duration: Option<f64>,
    pub size: Option<u64>,
}

impl MediaProbeResult {
    pub fn first_video_stream(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.codec_type == CodecType::Video)
    }

    pub fn count(&self, codec_type: &CodecType) -> usize {
        self.streams.iter().filter(|s| &s.codec_type == codec_type).count()
    }
}

#[derive(Deserialize, Debug)]
struct FFProbeJsonOutput {
    #[serde(default)]
    pub streams: Vec<FFProbeJsonStream>,
    #[serde(default)]
    pub format: FFProbeJsonFormat,
}

#[derive(Deserialize, Debug, Default)]
struct FFProbeJsonFormat {
    pub format_name: Option<String>,
    pub duration: Option<String>,
    pub size: Option<String>,
}

#[derive(Deserialize, Debug)]
struct FFProbeJsonStream {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub codec_type: String,
    pub codec_name: Option<String>,
    pub nb_frames: Option<String>,
    pub duration: Option<String>,
    pub avg_frame_rate: Option<String>,
}

/// Run `ffprobe` in JSON mode and collect the container and stream metadata.
pub fn probe_file(ffprobe: &Path, path: &Path) -> Result<MediaProbeResult> {
    debug!("probing {:?} with {:?}", path, ffprobe);
    let output = Command::new(ffprobe)
        .args([
            "-v", "quiet",
            "-print_format", "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .map_err(|err| spawn_error(ffprobe, err))?;

    if !output.status.success() {
        return Err(HvecError::probe_failed(path, format!("ffprobe exited with {}", output.status)));
    }

    let utf8 = String::from_utf8(output.stdout)
        .map_err(|err| HvecError::probe_failed(path, format!("output is not UTF-8: {}", err)))?;
    let probe = parse_probe_output(&utf8)
        .map_err(|err| HvecError::probe_failed(path, format!("unreadable JSON: {}", err)))?;
    debug!("container {:?}, {:?} bytes, {:?} seconds, {} audio and {} subtitle streams",
        probe.format_name, probe.size, probe.duration,
        probe.count(&CodecType::Audio), probe.count(&CodecType::Subtitle));
    for stream in &probe.streams {
        debug!("stream #{} {} {:?}", stream.index, stream.codec_type, stream.codec_name);
    }
    Ok(probe)
}

/// Let ffprobe print its own human-readable stream listing straight to the terminal.
pub fn print_report(ffprobe: &Path, path: &Path) -> Result<()> {
    let status = Command::new(ffprobe)
        .arg("-hide_banner")
        .arg(path)
        .status()
        .map_err(|err| spawn_error(ffprobe, err))?;
    match status.success() {
        true => Ok(()),
        false => Err(HvecError::probe_failed(path, format!("ffprobe exited with {}", status))),
    }
}

pub fn parse_probe_output(json: &str) -> std::result::Result<MediaProbeResult, serde_json::Error> {
    let deserialized = serde_json::from_str::<FFProbeJsonOutput>(json)?;
    Ok(MediaProbeResult {
        streams: deserialized.streams.into_iter().map(|s| StreamInfo {
            index: s.index,
            codec_type: CodecType::from_str(&s.codec_type),
            codec_name: s.codec_name,
            nb_frames: s.nb_frames.as_deref().and_then(parse_frame_count),
            duration: s.duration.as_deref().and_then(parse_seconds),
            avg_frame_rate: s.avg_frame_rate,
        }).collect(),
        format_name: deserialized.format.format_name,
        duration: deserialized.format.duration.as_deref().and_then(parse_seconds),
        size: deserialized.format.size.and_then(|s| s.parse().ok()),
    })
}

fn spawn_error(ffprobe: &Path, err: io::Error) -> HvecError {
    debug!("unable to run {:?}: {}", ffprobe, err);
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => HvecError::ProbeToolMissing {
            tool: ffprobe.display().to_string(),
        },
        _ => HvecError::Io(err),
    }
}

fn parse_frame_count(s: &str) -> Option<u64> {
    match !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        true => s.parse().ok(),
        false => None,
    }
}

fn parse_seconds(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|d| d.is_finite())
}
