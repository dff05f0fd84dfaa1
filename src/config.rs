use std::path::PathBuf;

use tracing::warn;

use crate::estimate::{EstimatorConfig, DEFAULT_ESTIMATED_FPS};

pub const FFMPEG_ENV: &str = "HVEC_FFMPEG";
pub const FFPROBE_ENV: &str = "HVEC_FFPROBE";
pub const ESTIMATED_FPS_ENV: &str = "HVEC_ESTIMATED_FPS";

/// Runtime settings drawn from the environment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    /// Explicit ffmpeg executable; `PATH` lookup when unset.
    pub ffmpeg: Option<PathBuf>,
    /// Explicit ffprobe executable; `PATH` lookup when unset.
    pub ffprobe: Option<PathBuf>,
    pub estimator: EstimatorConfig,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fps = match non_empty(ESTIMATED_FPS_ENV) {
            None => DEFAULT_ESTIMATED_FPS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(fps) => fps,
                Err(err) => {
                    warn!("ignoring {}={:?} ({}); using {}", ESTIMATED_FPS_ENV, raw, err, DEFAULT_ESTIMATED_FPS);
                    DEFAULT_ESTIMATED_FPS
                },
            },
        };

        Settings {
            ffmpeg: non_empty(FFMPEG_ENV).map(PathBuf::from),
            ffprobe: non_empty(FFPROBE_ENV).map(PathBuf::from),
            estimator: EstimatorConfig { fps },
        }
    }

    pub fn with_fps(mut self, fps: Option<u32>) -> Self {
        if let Some(fps) = fps {
            self.estimator.fps = fps;
        }
        self
    }
}
