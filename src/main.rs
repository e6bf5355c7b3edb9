use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "chainrun")]
#[command(about = "Run a declarative chain of model and tool steps over an input", long_about = None)]
struct Cli {
    #[arg(long, help = "Path to YAML/JSON agent spec")]
    spec: PathBuf,

    #[arg(long, help = "Input text")]
    input: String,

    #[arg(long, help = "Enable verbose debug output")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "chainrun=debug"
    } else {
        "chainrun=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    let config = cli::Config {
        verbose: cli.verbose,
    };

    cli::run_agent(&cli.spec, &cli.input, &config)
}
