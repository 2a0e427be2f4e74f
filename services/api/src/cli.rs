use crate::evaluate::{run_evaluate, run_policy, EvaluateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use financing_engine::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Financing Decision Engine",
    about = "Score financing applications and serve the decision API",
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
    /// Evaluate applications from a JSON payload, a CSV export or stdin
    Evaluate(EvaluateArgs),
    /// Print the effective policy document as JSON
    Policy(PolicyArgs),
}

/// Policy selection shared by every command.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct PolicyArgs {
    /// Policy document to use instead of FINANCING_POLICY_PATH or the built-in policy
    #[arg(long)]
    pub(crate) policy: Option<PathBuf>,
    /// Report statuses with the Indonesian vocabulary
    #[arg(long)]
    pub(crate) indonesian: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) policy: PolicyArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Policy(args) => run_policy(args),
    }
}
