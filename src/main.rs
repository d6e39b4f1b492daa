use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use eddy_io::Config;

mod run;

/// Two-dimensional incompressible flow simulator.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long)]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("{config}");

    if let Err(err) = run::run(&config) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
