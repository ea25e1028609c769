//! Converts a SubSpace server.cfg file to a dotproduct settings file.

use anyhow::Context;
use dotproduct::Settings;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use structopt::StructOpt;

/// Convert a SubSpace server.cfg file to a dotproduct settings.json file.
///
/// Set the LOG environment variable to "info", "debug" or "trace" for more
/// output.
#[derive(Debug, StructOpt)]
#[structopt(name = "convertsettings")]
struct Cli {
    /// SubSpace settings file to convert.
    #[structopt(name = "settings-file", parse(from_os_str))]
    settings_file: PathBuf,
    /// Write the JSON settings to this file instead of stdout.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

fn log_level() -> LevelFilter {
    std::env::var("LOG")
        .ok()
        .and_then(|value| match value.as_str() {
            "info" => Some(LevelFilter::Info),
            "debug" => Some(LevelFilter::Debug),
            "trace" => Some(LevelFilter::Trace),
            _ => None,
        })
        .unwrap_or(LevelFilter::Warn)
}

fn main() -> anyhow::Result<()> {
    TermLogger::init(
        log_level(),
        Default::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let Cli {
        settings_file,
        output,
    } = Cli::from_args();

    let instream = File::open(&settings_file)
        .with_context(|| format!("could not open {}", settings_file.display()))?;
    let settings = Settings::read_legacy_from(instream)
        .with_context(|| format!("could not convert {}", settings_file.display()))?;
    log::info!(
        "Converted {} ships from {}",
        settings.ships.len(),
        settings_file.display()
    );

    match output {
        Some(path) => {
            let outstream = File::create(&path)
                .with_context(|| format!("could not create {}", path.display()))?;
            let mut outstream = BufWriter::new(outstream);
            settings.write_json_to(&mut outstream)?;
            outstream.flush()?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut stdout = stdout.lock();
            settings.write_json_to(&mut stdout)?;
        }
    }

    Ok(())
}
