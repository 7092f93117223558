use crate::infra::list_recent_inquiries;
use crate::preview::{run_preview, PreviewArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sg_contact::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "S&G Global Advisors contact service",
    about = "Run the contact inquiry service and inspect its output from the command line",
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
    /// Render the notification e-mail for an inquiry without sending it
    Preview(PreviewArgs),
    /// Inspect stored inquiries
    Inquiries {
        #[command(subcommand)]
        command: InquiriesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum InquiriesCommand {
    /// Print the most recent inquiries from the configured database
    Recent(RecentArgs),
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

#[derive(Args, Debug)]
pub(crate) struct RecentArgs {
    /// Number of inquiries to show
    #[arg(long, default_value_t = 20)]
    pub(crate) limit: usize,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Preview(args) => run_preview(args),
        Command::Inquiries {
            command: InquiriesCommand::Recent(args),
        } => list_recent_inquiries(args.limit).await,
    }
}
