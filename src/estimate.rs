use std::fmt::Display;

use crate::ffmpeg::probe::{MediaProbeResult, StreamInfo};

/// Assumed QSV HEVC throughput on the reference machine, in frames per second.
pub const DEFAULT_ESTIMATED_FPS: u32 = 85;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatorConfig {
    pub fps: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig { fps: DEFAULT_ESTIMATED_FPS }
    }
}

/// Wall-clock duration split into whole hours, minutes and seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hms {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Hms {
    pub fn from_seconds(seconds: f64) -> Self {
        let total = seconds.max(0.0).floor() as u64;
        let (minutes, seconds) = (total / 60, total % 60);
        let (hours, minutes) = (minutes / 60, minutes % 60);
        Hms { hours, minutes, seconds }
    }
}

impl Display for Hms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Estimate {
    NoVideoStream,
    CannotEstimate,
    Known {
        frames: u64,
        seconds: f64,
        fps: u32,
    },
}

impl Display for Estimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Estimate::NoVideoStream => write!(f, "Could not find a video stream to analyze."),
            Estimate::CannotEstimate => write!(f, "Could not determine video length to provide an estimate."),
            Estimate::Known { seconds, fps, .. } => write!(
                f,
                "Estimated time to transcode: {}\n(Based on an estimated {} FPS for QSV HEVC encoding on this hardware)",
                Hms::from_seconds(*seconds),
                fps),
        }
    }
}

pub fn estimate(probe: &MediaProbeResult, config: &EstimatorConfig) -> Estimate {
    let video = match probe.first_video_stream() {
        Some(stream) => stream,
        None => return Estimate::NoVideoStream,
    };

    let frames = total_frames(video, probe.duration);
    if frames == 0 || config.fps == 0 {
        return Estimate::CannotEstimate;
    }

    Estimate::Known {
        frames,
        seconds: frames as f64 / config.fps as f64,
        fps: config.fps,
    }
}

/// An explicit frame count wins; otherwise `ceil(duration * frame_rate)`.
pub fn total_frames(stream: &StreamInfo, container_duration: Option<f64>) -> u64 {
    if let Some(frames) = stream.nb_frames {
        return frames;
    }

    let duration = stream.duration.or(container_duration).unwrap_or(0.0);
    let frame_rate = stream.avg_frame_rate.as_deref().map(parse_frame_rate).unwrap_or(0.0);
    (duration * frame_rate).ceil().max(0.0) as u64
}

/// Parse a "num/den" rate; zero for a zero denominator or anything unreadable.
pub fn parse_frame_rate(rate: &str) -> f64 {
    let splits: Vec<&str> = rate.split('/').collect();
    match splits.len() {
        2 => match (splits[0].trim().parse::<f64>(), splits[1].trim().parse::<f64>()) {
            (Ok(num), Ok(denom)) if denom != 0.0 => num / denom,
            _ => 0.0,
        },
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffmpeg::probe::CodecType;

    fn video_stream(nb_frames: Option<u64>, duration: Option<f64>, rate: Option<&str>) -> StreamInfo {
        StreamInfo {
            index: 0,
            codec_type: CodecType::Video,
            codec_name: Some(String::from("h264")),
            nb_frames,
            duration,
            avg_frame_rate: rate.map(String::from),
        }
    }

    fn probe_of(streams: Vec<StreamInfo>, duration: Option<f64>) -> MediaProbeResult {
        MediaProbeResult {
            streams,
            format_name: None,
            duration,
            size: None,
        }
    }

    #[test]
    fn test_explicit_frame_count() {
        let probe = probe_of(vec![video_stream(Some(2550), Some(1.0), Some("1/1"))], None);
        let estimate = estimate(&probe, &EstimatorConfig::default());
        assert_eq!(estimate, Estimate::Known { frames: 2550, seconds: 30.0, fps: 85 });
        assert!(estimate.to_string().starts_with("Estimated time to transcode: 00:00:30\n"));
    }

    #[test]
    fn test_frames_from_duration_and_rate() {
        assert_eq!(total_frames(&video_stream(None, Some(10.0), Some("30000/1001")), None), 300);
        assert_eq!(total_frames(&video_stream(None, Some(10.0), Some("25/1")), None), 250);
        assert_eq!(total_frames(&video_stream(None, Some(0.5), Some("25/1")), None), 13);
    }

    #[test]
    fn test_falls_back_to_container_duration() {
        assert_eq!(total_frames(&video_stream(None, None, Some("24/1")), Some(60.0)), 1440);
        assert_eq!(total_frames(&video_stream(None, Some(30.0), Some("24/1")), Some(60.0)), 720);
        assert_eq!(total_frames(&video_stream(None, None, Some("24/1")), None), 0);
    }

    #[test]
    fn test_zero_denominator_cannot_estimate() {
        assert_eq!(parse_frame_rate("30/0"), 0.0);
        let probe = probe_of(vec![video_stream(None, Some(120.0), Some("30/0"))], Some(120.0));
        assert_eq!(estimate(&probe, &EstimatorConfig::default()), Estimate::CannotEstimate);
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), 25.0);
        assert_eq!(parse_frame_rate("24000/1001"), 24000.0 / 1001.0);
        assert_eq!(parse_frame_rate("0/0"), 0.0);
        assert_eq!(parse_frame_rate("25"), 0.0);
        assert_eq!(parse_frame_rate("abc/1"), 0.0);
    }

    #[test]
    fn test_no_video_stream() {
        let mut audio = video_stream(Some(100), None, None);
        audio.codec_type = CodecType::Audio;
        let probe = probe_of(vec![audio], Some(10.0));
        let estimate = estimate(&probe, &EstimatorConfig::default());
        assert_eq!(estimate, Estimate::NoVideoStream);
    }

    #[test]
    fn test_first_video_stream_is_used() {
        let mut cover = video_stream(None, Some(10.0), Some("25/1"));
        cover.index = 1;
        let probe = probe_of(vec![video_stream(Some(850), None, None), cover], None);
        assert_eq!(
            estimate(&probe, &EstimatorConfig { fps: 85 }),
            Estimate::Known { frames: 850, seconds: 10.0, fps: 85 });
    }

    #[test]
    fn test_zero_fps_or_frames_cannot_estimate() {
        let probe = probe_of(vec![video_stream(Some(2550), None, None)], None);
        assert_eq!(estimate(&probe, &EstimatorConfig { fps: 0 }), Estimate::CannotEstimate);
        let probe = probe_of(vec![video_stream(Some(0), Some(10.0), Some("25/1"))], None);
        assert_eq!(estimate(&probe, &EstimatorConfig::default()), Estimate::CannotEstimate);
    }

    #[test]
    fn test_hms() {
        assert_eq!(Hms::from_seconds(0.0).to_string(), "00:00:00");
        assert_eq!(Hms::from_seconds(59.99).to_string(), "00:00:59");
        assert_eq!(Hms::from_seconds(3725.0).to_string(), "01:02:05");
        assert_eq!(Hms::from_seconds(360_000.0).to_string(), "100:00:00");
    }

    #[test]
    fn test_display() {
        let known = Estimate::Known { frames: 5100, seconds: 60.0, fps: 85 };
        assert_eq!(
            known.to_string(),
            "Estimated time to transcode: 00:01:00\n(Based on an estimated 85 FPS for QSV HEVC encoding on this hardware)");
        assert_eq!(Estimate::NoVideoStream.to_string(), "Could not find a video stream to analyze.");
    }
}
