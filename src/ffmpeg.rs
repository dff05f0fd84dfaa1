use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Settings;
use crate::error::{HvecError, Result};

pub mod command;
pub mod probe;
pub mod runner;

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Where to find the ffmpeg/ffprobe pair.
pub struct FFmpeg {
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
}

impl FFmpeg {
    pub fn new(settings: &Settings) -> Self {
        FFmpeg {
            ffmpeg: settings.ffmpeg.clone(),
            ffprobe: settings.ffprobe.clone(),
        }
    }

    pub fn ffmpeg(&self) -> Result<PathBuf> {
        locate(FFMPEG, self.ffmpeg.as_deref()).ok_or_else(|| HvecError::EncodeToolMissing {
            tool: tool_name(FFMPEG, self.ffmpeg.as_deref()),
        })
    }

    pub fn ffprobe(&self) -> Result<PathBuf> {
        locate(FFPROBE, self.ffprobe.as_deref()).ok_or_else(|| HvecError::ProbeToolMissing {
            tool: tool_name(FFPROBE, self.ffprobe.as_deref()),
        })
    }
}

/// Resolve a configured path, or `name` on `PATH`, to an executable file.
pub fn locate(name: &str, configured: Option<&Path>) -> Option<PathBuf> {
    let target = configured.map(Path::as_os_str).unwrap_or(OsStr::new(name));
    match which::which(target) {
        Ok(path) => {
            debug!("using {} at {:?}", name, path);
            Some(path)
        },
        Err(err) => {
            debug!("{} not found as {:?}: {}", name, target, err);
            None
        },
    }
}

fn tool_name(name: &str, configured: Option<&Path>) -> String {
    match configured {
        Some(path) => path.display().to_string(),
        None => String::from(name),
    }
}
