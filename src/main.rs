pub mod config;
pub mod error;
pub mod estimate;
pub mod ffmpeg;
pub mod fstools;
pub mod transcode_request;
pub mod version;

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use human_repr::HumanCount;
use rustop::opts;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use config::Settings;
use error::{HvecError, Result};
use estimate::estimate;
use ffmpeg::FFmpeg;
use ffmpeg::command::{self, CommandSpec};
use ffmpeg::{probe, runner};
use transcode_request::{TranscodeRequest, Verbosity};

fn main() -> ExitCode {
    // before rustop, so a missing --input can't get in the way
    if version::wants_version(std::env::args_os()) {
        println!("{}", version::history());
        return ExitCode::SUCCESS;
    }
    // rustop reads std::env::args, which panics on these
    if let Some(arg) = first_non_unicode(std::env::args_os()) {
        return report(HvecError::NonUnicodeArgument(arg));
    }

    let parsed = opts! {
        synopsis "Transcodes a video to HEVC (QSV) or displays media info.\n\n\
                  Examples:\n  \
                  hvec -i movie.mp4                  # info and estimated transcode time\n  \
                  hvec -i movie.mp4 -o movie.mkv     # transcode";
        opt input:Option<String>, desc:"Input video file.";
        opt output:Option<String>, desc:"Output MKV file. If omitted, display info about the input file.";
        opt subs:Option<String>, desc:"(Optional) Subtitle file to embed. Only used for transcoding.";
        opt quiet:bool=false, desc:"Only let ffmpeg print errors.";
        opt less_noise:bool=false, desc:"Let ffmpeg print progress every 30 seconds instead of continuously.";
        opt fps:Option<u32>, desc:"Assumed encoding speed for the estimate, in frames per second.";
        opt version:bool=false, desc:"Show the version history and exit.";
    }.parse();

    let (args, rest) = match parsed {
        Ok(parsed) => parsed,
        Err(rustop::Error::Help(help)) => {
            println!("{}", help);
            return ExitCode::SUCCESS;
        },
        Err(err) => rustop::error_and_exit(&err),
    };
    if args.version {
        println!("{}", version::history());
        return ExitCode::SUCCESS;
    }

    init_logging(args.quiet);
    println!("{}", version::banner());

    if !rest.is_empty() {
        warn!("ignoring extra arguments {:?}", rest);
    }

    let result = match args.input {
        None => Err(HvecError::MissingInput),
        Some(input) => {
            let request = TranscodeRequest::new(PathBuf::from(input))
                .output(args.output.map(PathBuf::from))
                .subtitles(args.subs.map(PathBuf::from))
                .verbosity(Verbosity::from_flags(args.quiet, args.less_noise));
            let settings = Settings::from_env().with_fps(args.fps);
            debug!("{:?}", settings);

            match command::build(&request) {
                Some(spec) => transcode(&request, &spec, &settings),
                None => info(&request, &settings),
            }
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    }
}

fn report(err: HvecError) -> ExitCode {
    eprintln!("Error: {}", err);
    ExitCode::FAILURE
}

fn first_non_unicode<I: IntoIterator<Item = OsString>>(args: I) -> Option<String> {
    args.into_iter()
        .find(|arg| arg.to_str().is_none())
        .map(|arg| arg.to_string_lossy().into_owned())
}

fn init_logging(quiet: bool) {
    let default_filter = match quiet {
        true => "hvec=error",
        false => "hvec=warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print ffprobe's report and a transcode time estimate.
fn info(request: &TranscodeRequest, settings: &Settings) -> Result<()> {
    fstools::require_input(&request.input)?;
    if let Some(subtitles) = &request.subtitles {
        warn!("subtitles {:?} are only used when transcoding", subtitles);
    }

    let ffprobe = FFmpeg::new(settings).ffprobe()?;

    println!("\n--- Media Information for: {} ({}) ---\n",
        file_name(&request.input),
        get_file_size(&request.input).human_count_bytes());
    probe::print_report(&ffprobe, &request.input)?;

    let probe = probe::probe_file(&ffprobe, &request.input)?;
    println!("\n--- Transcode Estimate (for this hardware) ---");
    println!("{}", estimate(&probe, &settings.estimator));
    Ok(())
}

fn transcode(request: &TranscodeRequest, spec: &CommandSpec, settings: &Settings) -> Result<()> {
    fstools::require_input(&request.input)?;
    if let Some(subtitles) = &request.subtitles {
        fstools::require_subtitles(subtitles)?;
        println!("Subtitle file provided. Building command to embed subtitles...");
    }

    let ffmpeg = FFmpeg::new(settings).ffmpeg()?;

    println!("\nExecuting FFmpeg command:");
    println!("{}", spec);
    println!("\n------------------------- FFmpeg Output -------------------------");
    let result = runner::run(spec, &ffmpeg);
    println!("-----------------------------------------------------------------");
    result?;

    println!("\nSuccessfully created '{}'.", spec.target().unwrap_or_default());
    Ok(())
}

fn file_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}

fn get_file_size(path: &Path) -> u64 {
    match fs::metadata(path) {
        Ok(fi) => fi.len(),
        Err(_) => 0,
    }
}
