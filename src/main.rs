use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use widget_pack::cli::{Command, RootArgs};
use widget_pack::workflow;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,widget_pack=debug"
    } else {
        "warn,widget_pack=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Pack(args) => workflow::run_pack(args),
        Command::StripLogging(args) => workflow::run_strip_logging(args),
    }
}
