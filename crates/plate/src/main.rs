use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod derive;
mod produce;

#[derive(Parser)]
#[command(name = "plate")]
#[command(about = "Derive stiffening plates from KiCad boards and package fabrication outputs", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive plate board files without generating fabrication outputs
    #[command(alias = "d")]
    Derive(derive::DeriveArgs),

    /// Derive plates, export gerber and drill files, and archive the results
    #[command(alias = "p")]
    Produce(produce::ProduceArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG still wins.
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Derive(args) => derive::execute(args),
        Commands::Produce(args) => produce::execute(args),
    }
}
