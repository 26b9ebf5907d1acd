use clap::{error::ErrorKind, Parser};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::exit;

use smkc_core::reassemble::split_lines;
use smkc_core::{
    check_section, debug_dump_map_section, locate_map_section, run, MirrorError, MirrorSettings,
};

#[derive(Debug, Parser)]
#[command(
    name = "smkc-mirror",
    version,
    about = "Mirror the #MAP grid of an SMKC track file left to right"
)]
struct Args {
    /// Track file to mirror.
    path: PathBuf,

    /// Write the mirrored track here instead of `<name>-reversed.smkc`.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[arg(long, default_value_t = false)]
    json: bool,

    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Debug-only: print the located map section row by row and exit.
    /// Nothing is written.
    #[arg(long, hide = true)]
    dump_map: bool,
}

fn init_logging(debug: bool) -> Result<(), log::SetLoggerError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn exit_code(err: &MirrorError) -> i32 {
    if err.is_structural() {
        2
    } else {
        1
    }
}

/// Exit code for a failed argument parse. `None` means clap should exit
/// on its own terms (help and version output exit 0).
fn usage_exit_code(kind: ErrorKind) -> Option<i32> {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => Some(1),
    }
}

fn dump_map(path: &Path) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Failed to read {:?}: {}", path, e);
            exit(1);
        }
    };

    let lines = split_lines(&text);
    let section = locate_map_section(&lines);
    print!("{}", debug_dump_map_section(&section));

    if let Err(err) = check_section(&section) {
        eprintln!("Error: {err}");
        exit(exit_code(&err));
    }
}

fn main() {
    // Usage errors exit with 1 rather than clap's default of 2, which is
    // reserved for malformed map sections.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match usage_exit_code(err.kind()) {
            None => err.exit(),
            Some(code) => {
                let _ = err.print();
                exit(code);
            }
        },
    };

    if let Err(e) = init_logging(args.debug) {
        eprintln!("Failed to initialise logging: {e}");
    }

    if args.dump_map {
        dump_map(&args.path);
        return;
    }

    let settings = MirrorSettings {
        input_path: args.path,
        output_path: args.output,
        dry_run: args.dry_run,
        debug: args.debug,
    };

    let report = match run(settings) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Error: {err}");
            exit(exit_code(&err));
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialise report: {e}");
                exit(1);
            }
        }
    } else if report.written {
        println!("Reversed MAP saved to: {}", report.output_path.display());
    } else {
        println!(
            "Dry run: reversed MAP would be saved to: {}",
            report.output_path.display()
        );
    }
}
