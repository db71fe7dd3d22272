use crate::demo::{run_assess, run_batch, run_demo, AssessArgs, BatchArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use support_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Social Support Eligibility Service",
    about = "Assess social-support applications from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Assess a single applicant record stored as JSON
    Assess(AssessArgs),
    /// Assess every applicant in a CSV file
    Batch(BatchArgs),
    /// Walk through sample households end to end
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Batch(args) => run_batch(args),
        Command::Demo(args) => run_demo(args),
    }
}
