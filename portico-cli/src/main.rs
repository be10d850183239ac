use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use url::Url;

use portico_offline::{
    CacheStore, ControlMessage, HttpFetcher, LogGateway, MessageReply, OfflineWorker, WebRequest,
    WorkerConfig, create_client,
};
use portico_rates::RateService;

mod cli;
mod error;

use cli::{CliArgs, Command};
use error::AppError;

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    let args = CliArgs::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))?;

    let config = WorkerConfig::default();
    let store = CacheStore::on_disk(&args.cache_dir);
    let fetcher = Arc::new(HttpFetcher::new()?);
    let worker = OfflineWorker::new(config, store.clone(), fetcher, Arc::new(LogGateway));

    match args.command {
        Command::Install => {
            worker.install().await?;
            worker.activate().await?;
            info!(state = %worker.state(), "worker installed and active");
        }

        Command::Fetch {
            url,
            navigate,
            print_body,
        } => {
            let url =
                Url::parse(&url).map_err(|e| AppError::InvalidInput(format!("{url}: {e}")))?;
            let request = if navigate {
                WebRequest::navigate(url)
            } else {
                WebRequest::get(url)
            };

            let response = worker.handle_fetch(&request).await;
            info!(
                status = %response.status,
                served_from = ?response.served_from,
                bytes = response.body.len(),
                "request resolved"
            );
            if print_body {
                std::io::stdout().write_all(&response.body)?;
            }
        }

        Command::Rates => {
            let service = RateService::new(create_client(concat!(
                "portico/",
                env!("CARGO_PKG_VERSION")
            ))?);
            let board = service.latest().await;
            println!("{}", serde_json::to_string_pretty(&board)?);
        }

        Command::Status => {
            println!("version: {}", worker.config().worker_tag());
            println!("state:   {}", worker.state());
            let mut names = store.partition_names().await?;
            names.sort();
            for name in names {
                let count = store.len(&name).await?;
                println!("partition {name}: {count} entries");
            }
        }

        Command::Clear => {
            if let Some(MessageReply::Completed { success }) =
                worker.handle_message(ControlMessage::ClearCache).await
            {
                info!(success, "cache cleared");
            }
        }
    }

    Ok(())
}
