use std::path::Path;
use std::fs;

use crate::error::{HvecError, Result};

#[derive(Debug, PartialEq)]
pub enum DirEntryCategory {
    DoesNotExist,
    RegularFile,
    Directory,
    Unknown,
}

/// Symlinks are followed.
pub fn classify_file(path: &Path) -> DirEntryCategory {
    match fs::metadata(path) {
        Ok(metadata) => {
            if metadata.is_file() {
                DirEntryCategory::RegularFile
            } else if metadata.is_dir() {
                DirEntryCategory::Directory
            } else {
                DirEntryCategory::Unknown
            }
        },
        Err(_) => DirEntryCategory::DoesNotExist,
    }
}

/// The media input must be something ffmpeg can open as a file.
pub fn require_input(path: &Path) -> Result<()> {
    match classify_file(path) {
        DirEntryCategory::DoesNotExist => Err(HvecError::InputNotFound(path.to_path_buf())),
        DirEntryCategory::Directory => Err(HvecError::InputNotAFile(path.to_path_buf())),
        // devices and fifos are left to ffmpeg
        DirEntryCategory::RegularFile | DirEntryCategory::Unknown => Ok(()),
    }
}

pub fn require_subtitles(path: &Path) -> Result<()> {
    match classify_file(path) {
        DirEntryCategory::DoesNotExist => Err(HvecError::SubtitleNotFound(path.to_path_buf())),
        _ => Ok(()),
    }
}
