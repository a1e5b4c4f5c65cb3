use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use wildcard_edge::config::load_config;
use wildcard_edge::config::validation::{validate_subdomain_base, ValidationError};
use wildcard_edge::event::handle_event_json;
use wildcard_edge::{EdgeRequest, SubdomainRewriter};

#[derive(Parser)]
#[command(name = "edge-cli")]
#[command(about = "Try the wildcard-subdomain rewrite offline", long_about = None)]
struct Cli {
    /// Base domain tenants live under.
    #[arg(short, long, env = "SUBDOMAIN_BASE", default_value = "example.com")]
    base: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a single host + URI and print the result
    Rewrite {
        #[arg(long)]
        host: String,
        uri: String,
    },
    /// Rewrite an origin-request event (stdin unless --file is given)
    Event {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Load and validate a config file, then print it
    CheckConfig { path: PathBuf },
}

/// Rewriter for `--base`, held to the same rules as `rewrite.subdomain_base`.
fn rewriter(base: &str) -> Result<SubdomainRewriter, ValidationError> {
    validate_subdomain_base(base)?;
    Ok(SubdomainRewriter::new(base))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rewrite { host, uri } => {
            let rewriter = rewriter(&cli.base)?;
            let mut request = EdgeRequest::new(host, uri);
            rewriter.rewrite(&mut request)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Commands::Event { file } => {
            let rewriter = rewriter(&cli.base)?;
            let input = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            println!("{}", handle_event_json(&rewriter, &input)?);
        }
        Commands::CheckConfig { path } => {
            let config = load_config(&path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
