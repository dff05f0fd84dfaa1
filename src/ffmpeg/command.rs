use std::fmt::Display;
use std::path::Path;

use crate::ffmpeg::FFMPEG;
use crate::transcode_request::{TranscodeRequest, Verbosity};

/// Fixed QSV HEVC encoding parameters; audio is passed through untouched.
const ENCODING_PARAMETERS: [&str; 8] = [
    "-c:v", "hevc_qsv",
    "-preset", "medium",
    "-global_quality", "24",
    "-c:a", "copy",
];

/// An external command: the program name and its arguments, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The last argument, which for ffmpeg is the output file.
    pub fn target(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }
}

impl Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            match arg.contains(' ') {
                true => write!(f, " \"{}\"", arg)?,
                false => write!(f, " {}", arg)?,
            }
        }
        Ok(())
    }
}

/// Build the ffmpeg invocation for a transcode request. `None` in info mode.
pub fn build(request: &TranscodeRequest) -> Option<CommandSpec> {
    fn s(s: &str) -> String { String::from(s) }
    fn p(p: &Path) -> String { p.to_string_lossy().into_owned() }

    let output = request.output.as_deref()?;
    let mut args = vec![];

    match request.verbosity {
        Verbosity::ErrorsOnly => args.extend([s("-loglevel"), s("error")]),
        Verbosity::Periodic => args.extend([s("-stats_period"), s("30")]),
        Verbosity::Full => (),
    }

    // decode on the QSV device; the source is input 0
    args.extend([
        s("-hwaccel"), s("qsv"),
        s("-c:v"), s("h264_qsv"),
        s("-i"), p(&request.input),
    ]);

    // map streams explicitly instead of "-map 0" so data and attachment
    // tracks never reach the muxer
    match &request.subtitles {
        Some(subtitles) => {
            args.extend([s("-i"), p(subtitles)]);
            args.extend([
                s("-map"), s("0:v:0"),
                s("-map"), s("0:a"),
                s("-map"), s("1:s"),
            ]);
            args.extend([
                s("-c:s"), s("copy"),
                s("-metadata:s:s:0"), s("language=eng"),
            ]);
        },
        None => args.extend([
            s("-map"), s("0:v:0"),
            s("-map"), s("0:a?"),
        ]),
    }

    args.extend(ENCODING_PARAMETERS.iter().map(|param| s(param)));
    args.push(p(output));

    Some(CommandSpec {
        program: String::from(FFMPEG),
        args,
    })
}
