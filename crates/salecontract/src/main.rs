//! Sale contract command-line front end
//!
//! Creates contracts and applies accept/reject transitions against the
//! configured state store.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "salecontract", about = "Sale contract lifecycle manager")]
struct Cli {
    /// Home directory for config, logs and state
    #[arg(long, global = true, env = "SALECONTRACT_HOME")]
    home: Option<PathBuf>,

    /// State store directory (overrides config.toml)
    #[arg(long, global = true, env = "SALECONTRACT_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Print the response envelope as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a contract from a JSON payload
    Init {
        /// Contract JSON, or @path to read it from a file
        payload: String,
    },

    /// Invoke a named operation with positional arguments
    Invoke {
        /// Operation name (accept, reject)
        function: String,

        /// Operation arguments (contract id, actor)
        args: Vec<String>,
    },

    /// Accept a proposed contract as the buyer
    Accept {
        /// Contract id
        id: String,

        /// Acting party
        actor: String,
    },

    /// Reject a proposed contract as the buyer
    Reject {
        /// Contract id
        id: String,

        /// Acting party
        actor: String,
    },

    /// Show a stored contract
    Show {
        /// Contract id
        id: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let ctx = cli::context::CliContext::setup(cli::context::ContextArgs {
        home: cli.home,
        store_dir: cli.store_dir,
        verbose: cli.verbose,
    })?;
    let json = cli.json;

    let response = match cli.command {
        Commands::Init { payload } => cli::contract::init(&ctx, &payload)?,
        Commands::Invoke { function, args } => cli::contract::invoke(&ctx, &function, &args),
        Commands::Accept { id, actor } => cli::contract::invoke(&ctx, "accept", &[id, actor]),
        Commands::Reject { id, actor } => cli::contract::invoke(&ctx, "reject", &[id, actor]),
        Commands::Show { id } => cli::contract::show(&ctx, &id),
    };

    cli::output::print_response(&response, json)?;
    Ok(if response.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
