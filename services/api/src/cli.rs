use crate::commands::{
    run_scholarship_estimate, run_submit_cv, run_theme, ScholarshipArgs, SubmitCvArgs, ThemeArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use steps_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Steps Education Intake",
    about = "Run the Steps Education intake service or exercise its workflows from the command line",
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
    /// Submit a CV through the same pipeline the web form uses
    SubmitCv(SubmitCvArgs),
    /// Show or toggle the stored theme preference
    Theme(ThemeArgs),
    /// Scholarship calculator
    Scholarship {
        #[command(subcommand)]
        command: ScholarshipCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ScholarshipCommand {
    /// Estimate the scholarship for an applicant profile
    Estimate(ScholarshipArgs),
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
        Command::SubmitCv(args) => run_submit_cv(args).await,
        Command::Theme(args) => run_theme(args),
        Command::Scholarship {
            command: ScholarshipCommand::Estimate(args),
        } => run_scholarship_estimate(args),
    }
}
