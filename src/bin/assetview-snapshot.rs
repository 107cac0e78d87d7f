//! Capture this host's inventory into the record directory.

use std::path::PathBuf;

use assetview::{
    config, logging,
    records::filename,
    snapshot::{Snapshot, write_snapshot},
};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    // Read the local offset while this is still the only thread.
    filename::capture_local_offset();
    if let Err(err) = logging::init("assetview-snapshot") {
        eprintln!("Logging disabled: {err}");
    }

    let records_dir = match options.records_dir {
        Some(dir) => dir,
        None => config::load_or_default()
            .map_err(|err| err.to_string())?
            .records_dir,
    };
    let snapshot = Snapshot::collect(&options.owner, options.serial_number, filename::local_now());
    let path = write_snapshot(&records_dir, &snapshot).map_err(|err| err.to_string())?;
    println!("{}", path.display());
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    owner: String,
    records_dir: Option<PathBuf>,
    serial_number: Option<String>,
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>, String> {
    let mut owner: Option<String> = None;
    let mut records_dir: Option<PathBuf> = None;
    let mut serial_number: Option<String> = None;
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            flag @ ("--owner" | "--records" | "--serial") => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| format!("{flag} requires a value"))?
                    .clone();
                match flag {
                    "--owner" => owner = Some(value),
                    "--records" => records_dir = Some(PathBuf::from(value)),
                    _ => serial_number = Some(value),
                }
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let Some(owner) = owner else {
        return Err("--owner is required".to_string());
    };
    Ok(Some(CliOptions {
        owner,
        records_dir,
        serial_number,
    }))
}

fn help_text() -> String {
    [
        "assetview-snapshot",
        "",
        "Usage:",
        "  assetview-snapshot --owner <name> [--records <dir>] [--serial <serial>]",
    ]
    .join("\n")
}
