use std::ffi::OsStr;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short flags that take no value: -q, -l (--less-noise) and -v.
const BOOLEAN_SHORT_FLAGS: &str = "qlv";

const HISTORY: &[(&str, &str)] = &[
    ("1.6", "Version is printed before argument parsing."),
    ("1.7", "Only the main video stream and the audio streams are mapped, so embedded \
             data or attachment tracks no longer break the transcode."),
    ("1.8", "Added -q/--quiet and --less-noise to tame ffmpeg's progress output."),
];

pub fn banner() -> String {
    format!("--- hvec Transcoder v{} ---", VERSION)
}

pub fn history() -> String {
    let mut text = format!("hvec {}\n\nVersion history:", VERSION);
    for (version, change) in HISTORY {
        text.push_str(&format!("\n  {:<4} {}", version, change));
    }
    text
}

/// `-v`/`--version` anywhere on the command line wins over everything else,
/// including a missing `--input`. Grouped boolean short flags (`-qv`) count too.
pub fn wants_version<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .skip(1)
        .map(|arg| arg.as_ref().to_string_lossy().into_owned())
        .take_while(|arg| arg != "--")
        .any(|arg| arg == "--version" || is_version_group(&arg))
}

/// `-v`, or a cluster of value-less short flags that includes it.
fn is_version_group(arg: &str) -> bool {
    match arg.strip_prefix('-') {
        Some(flags) if !flags.is_empty() => {
            flags.contains('v') && flags.chars().all(|c| BOOLEAN_SHORT_FLAGS.contains(c))
        },
        _ => false,
    }
}
