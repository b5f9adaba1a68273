mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Import { file, goals } => commands::import::run(&file, goals.as_deref()),
        Commands::Generate {
            subject,
            name,
            gender,
            date,
            notes,
            mime,
            transcript,
            offline,
        } => commands::generate::run(commands::generate::GenerateArgs {
            subject,
            name,
            gender,
            date,
            notes,
            mime,
            transcript,
            offline,
        }),
        Commands::Review {
            name,
            gender,
            observer,
            notes,
            mime,
            transcript,
            offline,
            json,
        } => commands::review::run(commands::review::ReviewArgs {
            name,
            gender,
            observer,
            notes,
            mime,
            transcript,
            offline,
            json,
        }),
        Commands::Suggest {
            subject,
            name,
            gender,
            recent,
            offline,
            json,
        } => commands::suggest::run(commands::suggest::SuggestArgs {
            subject,
            name,
            gender,
            recent,
            offline,
            json,
        }),
        Commands::Monthly {
            subject,
            name,
            gender,
            year,
            month,
            format,
            offline,
            json,
        } => commands::monthly::run(commands::monthly::MonthlyArgs {
            subject,
            name,
            gender,
            year,
            month,
            format,
            offline,
            json,
        }),
        Commands::Extract { file } => commands::extract::run(&file),
        Commands::Version => commands::version::run(),
    }
}
