use anyhow::{Context, Result};
use clap::Parser;
use dbchat::cli::commands::inspect::{InspectCommand, InspectCommandHandler};
use dbchat::cli::commands::serve::{ServeCommand, ServeCommandHandler};
use dbchat::cli::{logging, Cli, Commands};
use dbchat::core::config::LoggingConfig;
use dbchat::services::config_loader::ConfigLoader;
use std::process;

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    match cli.command {
        Commands::Serve { config, bind } => {
            let mut config = ConfigLoader::load(config.as_deref())?;
            // --bind は環境変数より優先
            if let Some(bind) = bind {
                config.server.bind = bind;
                config.validate().context("Invalid configuration")?;
            }
            logging::init(&config.logging, cli.verbose);

            let handler = ServeCommandHandler::new();
            handler.execute(&ServeCommand { config }).await
        }

        Commands::Inspect {
            connection_string,
            timeout,
        } => {
            logging::init(&LoggingConfig::default(), cli.verbose);

            let handler = InspectCommandHandler::new();
            let command = InspectCommand {
                connection_string,
                timeout,
            };
            handler.execute(&command).await
        }
    }
}
