/*!
 * Command-line interface for ClipCat
 */

use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, warn};

use clipcat::config::{Args, Config, InputSource};
use clipcat::logger::setup_logger;
use clipcat::parser::{DropPayload, PathList, PathSource};
use clipcat::report::Reporter;
use clipcat::session::Session;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "clipcat", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    let config = Config::from_args(args);
    if let Err(e) = setup_logger(config.verbosity) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    match run(&config) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> clipcat::Result<ExitCode> {
    config.validate()?;

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos} file(s)")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.set_prefix("Collecting");
    progress.enable_steady_tick(Duration::from_millis(100));

    let mut session = Session::from_config(config, Arc::new(progress.clone()));

    if config.clean_scratch {
        progress.finish_and_clear();
        if session.discard_scratch_file()? {
            eprintln!("Removed {}", session.scratch_path().display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let instructions = config.load_instructions()?;
    let mut raw_bytes = Vec::new();
    let raw_payload;
    let source: Box<dyn PathSource + '_> = match &config.input {
        InputSource::Paths(paths) => Box::new(PathList(paths.clone())),
        InputSource::Payload(payload) => Box::new(DropPayload(payload)),
        InputSource::Stdin => {
            // Undecodable bytes must not fail the drop
            io::stdin().read_to_end(&mut raw_bytes)?;
            raw_payload = String::from_utf8_lossy(&raw_bytes);
            Box::new(DropPayload(&raw_payload))
        }
    };

    let outcome = session.on_drop(source.as_ref(), &instructions).clone();
    progress.finish_and_clear();

    if let Some(format) = config.report.format() {
        Reporter::new(format).print_report(&outcome.report)?;
    }

    // An empty document means there is nothing to act on
    if !session.has_content() {
        return Ok(ExitCode::SUCCESS);
    }

    if config.print {
        let mut stdout = io::stdout().lock();
        stdout.write_all(outcome.document.text.as_bytes())?;
        if !outcome.document.text.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
    }

    if let Some(path) = &config.output_file {
        session.save_to(path)?;
        eprintln!("Result saved to {}", path.display());
    }

    if config.scratch {
        let path = session.prepare_scratch_file()?;
        eprintln!("File ready for dragging at: {}", path.display());
        if config.reveal {
            if let Err(e) = session.reveal_scratch_file() {
                warn!("Could not open the file manager: {}", e);
            }
        }
    }

    if config.clip {
        session.copy_to_clipboard()?;
        eprintln!("Result copied to clipboard!");
    }

    Ok(ExitCode::SUCCESS)
}
