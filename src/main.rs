//! Entry point for the record view server.

use std::path::PathBuf;

use assetview::{config, logging, server::RecordServer};

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
    if let Err(err) = logging::init("assetview") {
        eprintln!("Logging disabled: {err}");
    }

    let mut settings = config::load_or_default().map_err(|err| err.to_string())?;
    if let Some(records_dir) = options.records_dir {
        settings.records_dir = records_dir;
    }
    if let Some(bind_addr) = options.bind_addr {
        settings.bind_addr = bind_addr;
    }
    let cwd = std::env::current_dir()
        .map_err(|err| format!("Failed to resolve working directory: {err}"))?;
    let settings = settings.resolved(&cwd);

    let server = RecordServer::bind(&settings).map_err(|err| err.to_string())?;
    server.serve().map_err(|err| err.to_string())
}

#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    records_dir: Option<PathBuf>,
    bind_addr: Option<String>,
}

fn parse_args(args: Vec<String>) -> Result<Option<CliOptions>, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => {
                println!("{}", help_text());
                return Ok(None);
            }
            "--records" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--records requires a value".to_string())?;
                options.records_dir = Some(PathBuf::from(value));
            }
            "--bind" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--bind requires a value".to_string())?;
                options.bind_addr = Some(value.clone());
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(Some(options))
}

fn help_text() -> String {
    [
        "assetview",
        "",
        "Usage:",
        "  assetview [--records <dir>] [--bind <addr>]",
        "",
        "Defaults come from config.toml in the .assetview directory.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_overrides() {
        let options = parse_args(args(&["--records", "/srv/Records", "--bind", "127.0.0.1:9000"]))
            .unwrap()
            .unwrap();
        assert_eq!(options.records_dir, Some(PathBuf::from("/srv/Records")));
        assert_eq!(options.bind_addr.as_deref(), Some("127.0.0.1:9000"));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(parse_args(args(&["--help"])).unwrap(), None);
    }

    #[test]
    fn rejects_unknown_and_missing_values() {
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["--records"])).is_err());
    }
}
