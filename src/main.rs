use clap::Parser;
use tracing::info;

use cardplan::application::RunStatus;
use cardplan::cli::{check, optimize, output, CheckCommand, Cli, Commands};
use cardplan::infrastructure::config::Settings;

/// Exit code for a run whose envelope reports failure.
const EXIT_RUN_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{e:#}"));
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Optimize(args) => {
            output::configure(args.json);
            let mut settings = Settings::load_or_default(&args.config)?;
            if let Some(level) = &args.log_level {
                settings.logging.level.clone_from(level);
            }
            settings.init_logging();
            info!(config = %args.config.display(), "cardplan starting");

            let status = optimize::execute(&args, &settings).await?;
            info!(%status, "cardplan finished");
            Ok(if status == RunStatus::Failed {
                EXIT_RUN_FAILED
            } else {
                0
            })
        }
        Commands::Check(CheckCommand::Config(arg)) => {
            check::execute_config(&arg.config)?;
            Ok(0)
        }
        Commands::Check(CheckCommand::Input(input)) => {
            check::execute_input(&input)?;
            Ok(0)
        }
    }
}
