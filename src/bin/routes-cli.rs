use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use dispatch_core::handler::placeholder_action;
use dispatch_core::routing::{HttpMethod, RouteTable, RouteTableBuilder};

#[derive(Parser)]
#[command(name = "routes-cli")]
#[command(about = "Check route-definition files and test requests against them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a routes file and list its routes
    Check { file: PathBuf },
    /// Show which route a request would reach
    Resolve {
        file: PathBuf,
        method: String,
        path: String,
    },
}

/// Accepts every action name; the CLI only cares about matching.
fn build(file: &Path) -> Result<RouteTable, Box<dyn std::error::Error>> {
    Ok(RouteTableBuilder::new(&placeholder_action).build_sources(Some(file), &[])?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => {
            let table = build(&file)?;
            for route in table.routes() {
                println!("{route}");
            }
            println!("{} routes OK", table.len());
        }
        Commands::Resolve { file, method, path } => {
            let table = build(&file)?;
            let method: HttpMethod = method.parse()?;
            match table.resolve(method, &path) {
                Ok(resolved) => {
                    println!("{}", serde_json::to_string_pretty(&resolved.to_json())?);
                }
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
