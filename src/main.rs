use clap::Parser;
use owo_colors::{set_override, unset_override};

use oceanus::adapter::inbound::cli::command::{Cli, ColorChoice, Commands, ConfigCommand};
use oceanus::adapter::inbound::cli::output::{self, OutputConfig};
use oceanus::adapter::inbound::cli::{analyze, config, options};
use oceanus::error::Result;

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => analyze::execute(&args).await,
        Commands::Options(args) => options::execute(&args).await,
        Commands::Config(ConfigCommand::Init(args)) => config::execute_init(&args.path, args.force),
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args.config),
        Commands::Config(ConfigCommand::Validate(args)) => config::execute_validate(&args.config),
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match cli.color {
        ColorChoice::Always => set_override(true),
        ColorChoice::Never => set_override(false),
        ColorChoice::Auto => unset_override(),
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if let Err(e) = dispatch(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
