use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use trie_router::config::loader::parse_config;
use trie_router::config::validate_config;
use trie_router::routing::{Method, RouteTable};

#[derive(Parser)]
#[command(name = "routectl")]
#[command(about = "Inspect the [[routes]] of a trie-router config file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the whole config, routes included
    Check { file: PathBuf },
    /// List every registered (method, pattern)
    List { file: PathBuf },
    /// Print the routing tree, for one method or all of them
    Tree { file: PathBuf, method: Option<Method> },
    /// Show which route a request would hit and the bound parameters
    Resolve {
        file: PathBuf,
        method: Method,
        path: String,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => {
            let config = parse_config(&fs::read_to_string(&file)?)?;
            match validate_config(&config) {
                Ok(()) => {
                    println!("{}: ok ({} routes)", file.display(), config.routes.len());
                }
                Err(errors) => {
                    for error in &errors {
                        eprintln!("{}: {}", file.display(), error);
                    }
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::List { file } => {
            for (method, pattern) in load_table(&file)?.routes() {
                println!("{method:<8} {pattern}");
            }
        }
        Commands::Tree { file, method } => {
            let table = load_table(&file)?;
            let methods = match method {
                Some(method) => vec![method],
                None => Method::ALL.to_vec(),
            };
            let all = method.is_none();
            for method in methods {
                let tree = table.tree(method);
                // empty trees only matter when asked for by name
                if all && tree.is_empty() {
                    continue;
                }
                println!("{method}");
                print!("{}", tree.dump());
            }
        }
        Commands::Resolve { file, method, path } => {
            let table = load_table(&file)?;
            match table.lookup(method, &path) {
                Some(found) => {
                    let report = json!({
                        "route": found.handlers.first(),
                        "params": found.params,
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                None => {
                    let allowed = table.allowed_methods(&path);
                    if allowed.is_empty() {
                        eprintln!("{method} {path}: no route");
                    } else {
                        let allowed: Vec<_> = allowed.iter().map(|m| m.as_str()).collect();
                        eprintln!("{method} {path}: no route (allowed: {})", allowed.join(", "));
                    }
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Route table labelled by route name, or by pattern for unnamed routes.
fn load_table(file: &Path) -> Result<RouteTable<String>, Box<dyn std::error::Error>> {
    let config = parse_config(&fs::read_to_string(file)?)?;
    let mut table = RouteTable::new();
    for route in &config.routes {
        let method: Method = route.method.parse()?;
        let label = route.name.clone().unwrap_or_else(|| route.path.clone());
        table.register(method, &route.path, vec![label])?;
    }
    Ok(table)
}
