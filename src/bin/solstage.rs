//! Command-line front end for staging programs

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::read_keypair_file;
use solstage::config::StageConfig;
use solstage::deploy::{DeployOptions, Deployment};
use solstage::loader::upload::DEFAULT_CHUNK_SIZE;
use solstage::program::Session;
use solstage::transport::RpcTransport;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage compiled bytecode onto the ledger
    Deploy {
        /// Bytecode file; defaults to <out_dir>/<name>.bc
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Clear and re-stage if already deployed
        #[arg(short, long)]
        force: bool,
    },

    /// Reset the bytecode account to the writable state
    Clear {
        /// New allocation size; defaults to the configured space
        #[arg(short, long)]
        space: Option<u64>,
    },

    /// Print the staged account's state
    Show,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let dir = std::env::current_dir()?;
    let config = StageConfig::read(&dir)?;
    let provider = config.provider()?;

    let payer = read_keypair_file(expand_home(&provider.wallet))
        .map_err(|e| anyhow!("bad keypair file {}: {}", provider.wallet, e))?;
    let loader_id = Pubkey::from_str(&provider.loader_id)
        .with_context(|| format!("bad loader id {}", provider.loader_id))?;

    let session = Session::new(loader_id, RpcTransport::new(provider.url(), payer));
    let deployment = Deployment::new(&session, config.project.name.clone())?;

    match cli.command {
        Commands::Deploy { path, force } => {
            let path = path.unwrap_or_else(|| {
                let mut path = config.project.out_dir.clone();
                path.push(&config.project.name);
                path.set_extension("bc");
                path
            });
            let blob = std::fs::read(&path)
                .with_context(|| format!("reading bytecode from {}", path.display()))?;
            println!("Deploying {} ({} bytes)", path.display(), blob.len());

            let options = DeployOptions {
                space: config.project.space,
                chunk_size: config.project.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE),
                force,
            };
            deployment.deploy(&blob, &options)?;
            println!("Deployed to {}", deployment.bytecode());
            Ok(())
        }

        Commands::Clear { space } => {
            let space = space.unwrap_or(config.project.space);
            deployment.clear(space)?;
            println!("Cleared {} ({} bytes)", deployment.bytecode(), space);
            Ok(())
        }

        Commands::Show => {
            match deployment.account()? {
                Some(account) => {
                    println!("address:   {}", deployment.bytecode());
                    println!("handle:    {}", account.handle());
                    println!("authority: {}", account.authority());
                    println!("finalized: {}", account.finalized());
                    println!(
                        "content:   {} / {} bytes",
                        account.content().len(),
                        account.capacity()
                    );
                }
                None => println!("{} does not exist", deployment.bytecode()),
            }
            Ok(())
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
