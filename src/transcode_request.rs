use std::path::PathBuf;

/// How much progress and warning output ffmpeg is allowed to print.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verbosity {
    Full,
    /// One stats line every 30 seconds.
    Periodic,
    ErrorsOnly,
}

impl Verbosity {
    /// `quiet` beats `less_noise`.
    pub fn from_flags(quiet: bool, less_noise: bool) -> Self {
        match (quiet, less_noise) {
            (true, _) => Verbosity::ErrorsOnly,
            (false, true) => Verbosity::Periodic,
            (false, false) => Verbosity::Full,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TranscodeRequest {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub subtitles: Option<PathBuf>,
    pub verbosity: Verbosity,
}

impl TranscodeRequest {
    pub fn new(input: PathBuf) -> Self {
        TranscodeRequest {
            input,
            output: None,
            subtitles: None,
            verbosity: Verbosity::Full,
        }
    }

    pub fn output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn subtitles(mut self, subtitles: Option<PathBuf>) -> Self {
        self.subtitles = subtitles;
        self
    }

    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }
}
