use crate::forms::{render_form_file, RenderArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use intern_intake::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Internship Intake",
    about = "Run the internship applicant intake service or render application forms offline",
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
    /// Work with bilingual application forms
    Form {
        #[command(subcommand)]
        command: FormCommand,
    },
}

#[derive(Subcommand, Debug)]
enum FormCommand {
    /// Render a filled application form from applicant JSON
    Render(RenderArgs),
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
        Command::Form {
            command: FormCommand::Render(args),
        } => render_form_file(args),
    }
}
