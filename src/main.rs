//! Protoplan CLI — validate and repair generated laboratory operation plans.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "protoplan",
    version,
    about = "Operation-graph validation for generated laboratory protocols"
)]
struct Cli {
    #[command(subcommand)]
    command: protoplan::cli::Commands,
}

fn main() {
    // Diagnostics go to stderr so `--json` and `schema` stay pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = protoplan::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
