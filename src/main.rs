//! texyll CLI
//!
//! Usage:
//!   texyll [OPTIONS] [FILES]...
//!
//! Options:
//!   -c, --config <FILE>     Alias configuration layer (TOML), repeatable
//!       --no-defaults       Start without the built-in aliases
//!   -o, --output <FILE>     Write the result to a file instead of stdout
//!   -i, --in-place          Rewrite each input file in place
//!       --list-aliases      Print the alias registry and exit
//!       --log-level <LEVEL> Log filter (overrides TEXYLL_LOG)
//!   -h, --help              Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use texyll::logging::init_logging;
use texyll::{Config, Dealiaser};

#[derive(Parser)]
#[command(name = "texyll")]
#[command(about = "Rewrite TeX alias notations into canonical texyll tags")]
struct Cli {
    /// Input files (reads from stdin if not provided)
    files: Vec<PathBuf>,

    /// Alias configuration layer (TOML); later layers override earlier ones
    #[arg(short, long = "config", value_name = "FILE")]
    configs: Vec<PathBuf>,

    /// Start from an empty alias set instead of the built-in aliases
    #[arg(long)]
    no_defaults: bool,

    /// Write output to this file (single input only)
    #[arg(short, long, conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Rewrite each input file in place
    #[arg(short, long)]
    in_place: bool,

    /// Print the alias registry in match order and exit
    #[arg(long)]
    list_aliases: bool,

    /// Log filter, e.g. `debug` or `texyll=trace`
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let dealiaser = match build_dealiaser(&cli) {
        Ok(d) => d,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::FAILURE;
        }
    };

    if cli.list_aliases {
        print!("{}", dealiaser.listing());
        return ExitCode::SUCCESS;
    }

    if cli.output.is_some() && cli.files.len() > 1 {
        eprintln!("Error: --output takes a single input file");
        return ExitCode::FAILURE;
    }

    if cli.in_place && cli.files.is_empty() {
        eprintln!("Error: --in-place needs at least one input file");
        return ExitCode::FAILURE;
    }

    let inputs = match read_inputs(&cli.files) {
        Ok(inputs) => inputs,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::FAILURE;
        }
    };

    let sources: Vec<&str> = inputs.iter().map(|(_, source)| source.as_str()).collect();
    let results = dealiaser.parse_all(&sources);

    let mut status = ExitCode::SUCCESS;
    for (index, ((name, source), result)) in inputs.iter().zip(results).enumerate() {
        let output = match result {
            Ok(output) => output,
            Err(e) => {
                error!(file = %name, offset = e.offset(), "dealiasing failed");
                eprint!("{}", e.format(source, name));
                status = ExitCode::FAILURE;
                continue;
            }
        };

        let in_place_target = cli.files.get(index).filter(|_| cli.in_place);
        let written = if let Some(path) = in_place_target.or(cli.output.as_ref()) {
            fs::write(path, &output).map_err(|e| format!("writing '{}': {}", path.display(), e))
        } else {
            print!("{}", output);
            Ok(())
        };

        if let Err(message) = written {
            eprintln!("Error: {}", message);
            status = ExitCode::FAILURE;
        }
    }
    status
}

fn build_dealiaser(cli: &Cli) -> Result<Dealiaser, String> {
    let mut config = if cli.no_defaults {
        Config::empty()
    } else {
        Config::default()
    };

    for path in &cli.configs {
        debug!(path = %path.display(), "loading config layer");
        let layer = Config::from_file(path)
            .map_err(|e| format!("loading config '{}': {}", path.display(), e))?;
        config = config.layer(layer);
    }

    config.dealiaser().map_err(|e| e.to_string())
}

/// Read every input as `(display name, contents)`; stdin when none are given
fn read_inputs(files: &[PathBuf]) -> Result<Vec<(String, String)>, String> {
    if files.is_empty() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("reading from stdin: {}", e))?;
        return Ok(vec![("<stdin>".to_string(), buffer)]);
    }

    files
        .iter()
        .map(|path| -> Result<(String, String), String> {
            let source = read_file(path)?;
            Ok((path.display().to_string(), source))
        })
        .collect()
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("reading file '{}': {}", path.display(), e))
}
