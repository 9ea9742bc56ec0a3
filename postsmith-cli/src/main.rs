use clap::{Parser, Subcommand};
use postsmith_lib::Repository;
use sysexits::ExitCode;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::failure::{Failure, Outcome};

mod failure;
mod generate;
mod profile;

#[derive(Parser, Debug)]
#[command(name = "postsmith")]
#[command(author, version, about = "Generate SEO-ready social posts with an AI provider")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Override the active profile
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Operate on profiles
    #[command(subcommand)]
    Profile(profile::Command),
    /// Generate a post with the selected profile
    Generate(generate::GenerateArgs),
    /// Print the prompt a generation would send, without sending it
    Prompt(generate::PostArgs),
}

fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::Ok,
        Err(failure) => {
            failure.report();
            failure.code
        }
    }
}

fn run(cli: &Cli) -> Outcome {
    let repo = Repository::new().map_err(Failure::from)?;
    let selected = cli.profile.as_deref();

    match &cli.command {
        Command::Profile(cmd) => profile::handle(&repo, selected, cmd),
        Command::Generate(args) => generate::handle(&repo, selected, args),
        Command::Prompt(args) => generate::print_prompt(&repo, selected, args),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {err}");
    }
}
