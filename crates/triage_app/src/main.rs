mod shell;

use std::path::PathBuf;
use std::process::ExitCode;

use shell::app::{run, HostOptions};
use shell::logging::{initialize, LogDestination};
use triage_engine::ClientSettings;

const USAGE: &str = "usage: triage_app <report.(pdf|txt)> [--server URL]";

fn main() -> ExitCode {
    initialize(LogDestination::File);

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<HostOptions, String> {
    let mut file = None;
    let mut settings = ClientSettings::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--server" => {
                settings.base_url = args
                    .next()
                    .ok_or_else(|| "--server needs a value".to_string())?;
            }
            _ if file.is_none() => file = Some(PathBuf::from(arg)),
            other => return Err(format!("unexpected argument: {other}")),
        }
    }
    let file = file.ok_or_else(|| "missing report file argument".to_string())?;
    Ok(HostOptions { file, settings })
}
