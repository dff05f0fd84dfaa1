use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, HvecError>;

/// Everything that ends an invocation with exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum HvecError {
    #[error("Input file not found at {0:?}")]
    InputNotFound(PathBuf),

    #[error("Input {0:?} is not a regular file")]
    InputNotAFile(PathBuf),

    #[error("Subtitle file not found at {0:?}")]
    SubtitleNotFound(PathBuf),

    #[error("the --input option is required (see --help)")]
    MissingInput,

    #[error("argument {0:?} is not valid UTF-8; such paths are not supported")]
    NonUnicodeArgument(String),

    #[error("'{tool}' not found. Is FFmpeg installed correctly?")]
    ProbeToolMissing { tool: String },

    #[error("ffprobe failed to analyze {path:?}: {message}")]
    ProbeFailed { path: PathBuf, message: String },

    #[error("'{tool}' not found. Is FFmpeg installed and in your PATH?")]
    EncodeToolMissing { tool: String },

    #[error("FFmpeg failed with exit code {code}.")]
    EncodeFailed { code: i32 },

    #[error("FFmpeg was terminated by a signal.")]
    EncodeTerminated,

    #[error("Transcode interrupted; {output:?} may be incomplete.")]
    Interrupted { output: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HvecError {
    pub fn probe_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        HvecError::ProbeFailed {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            HvecError::InputNotFound(PathBuf::from("movie.mp4")).to_string(),
            "Input file not found at \"movie.mp4\"");
        assert_eq!(HvecError::EncodeFailed { code: 187 }.to_string(), "FFmpeg failed with exit code 187.");
        assert_eq!(
            HvecError::probe_failed("a.mkv", "exit status 1").to_string(),
            "ffprobe failed to analyze \"a.mkv\": exit status 1");
    }
}
