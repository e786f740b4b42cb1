mod bot;
mod config;
mod cover_letter;
mod dates;
mod diagnostics;
mod errors;
mod filter;
mod finder;
mod llm_client;
mod models;
mod resume;
mod routes;
mod sender;
mod state;
mod store;
mod telegram;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{optional_env, Config, DataPaths, FinderSettings};
use crate::cover_letter::{CoverLetterService, LetterModel};
use crate::finder::habr::HabrClient;
use crate::finder::hh::HhClient;
use crate::finder::{http_client, render_listing, VacancyFinder};
use crate::llm_client::LlmClient;
use crate::sender::SendOptions;
use crate::state::{AppState, BotState};
use crate::telegram::types::ChatId;
use crate::telegram::TelegramClient;

const SEND_DELAY: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "vacancy-bot", version, about = "Product-management job postings to Telegram")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search hh.ru and career.habr.com, print and save the result
    Find {
        #[arg(long)]
        min_salary: Option<u64>,
        #[arg(long)]
        min_experience: Option<u64>,
        #[arg(long)]
        max: Option<usize>,
        /// Also query employer career sites and Avito
        #[arg(long)]
        all_sources: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Send the saved postings to TELEGRAM_CHAT_ID once
    Send {
        /// Re-run the search first and send everything found
        #[arg(short, long)]
        refresh: bool,
        /// Only postings from the last N days
        #[arg(short, long, default_value_t = sender::DEFAULT_DAYS)]
        days: i64,
        /// Ignore the date window
        #[arg(long)]
        all: bool,
    },
    /// Run the interactive bot
    Bot,
    /// List chats that wrote to the bot
    ChatId,
    /// Check the required environment variables
    CheckEnv,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                config::rust_log()
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Find {
            min_salary,
            min_experience,
            max,
            all_sources,
            output,
        } => {
            let settings = FinderSettings::resolve(min_salary, min_experience, max);
            let paths = DataPaths::from_env();
            let finder = build_finder(settings, optional_env("HH_ACCESS_TOKEN"))?
                .with_extra_sources(all_sources);

            let found = finder.find_all().await;
            print!("{}", render_listing(&found));
            if !found.is_empty() {
                let output = output.unwrap_or_else(|| paths.vacancies_file());
                store::vacancies::save(&output, &found)?;
                println!("\n💾 Результаты сохранены в {}", output.display());
            }
        }
        Command::Send { refresh, days, all } => {
            let config = Config::from_env()?;
            let api = TelegramClient::new(&config.telegram_bot_token)?;
            let finder = build_finder(FinderSettings::resolve(None, None, None), None)?;
            sender::send_all(
                &api,
                &ChatId::parse(&config.telegram_chat_id),
                &config.paths,
                Some(&finder),
                SendOptions { refresh, days, all },
                SEND_DELAY,
            )
            .await?;
        }
        Command::Bot => run_bot(Config::from_env()?).await?,
        Command::ChatId => {
            let token = optional_env("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN is not set")?;
            let api = TelegramClient::new(token)?;
            diagnostics::print_chat_ids(&api).await?;
        }
        Command::CheckEnv => {
            let token = optional_env("TELEGRAM_BOT_TOKEN");
            let chat_id = optional_env("TELEGRAM_CHAT_ID");
            let (report, ok) = diagnostics::env_report(token.as_deref(), chat_id.as_deref());
            print!("{report}");
            if !ok {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn build_finder(settings: FinderSettings, hh_token: Option<String>) -> Result<VacancyFinder> {
    let client = http_client()?;
    Ok(VacancyFinder::new(
        HhClient::new(client.clone(), hh_token),
        HabrClient::new(client.clone()),
        client,
        settings,
    ))
}

async fn run_bot(config: Config) -> Result<()> {
    info!("Starting vacancy bot v{}", env!("CARGO_PKG_VERSION"));

    let model: Option<Arc<dyn LetterModel>> = match config.openai_api_key.clone() {
        Some(key) => {
            let llm = LlmClient::new(key).context("failed to build the OpenAI client")?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(llm))
        }
        None => {
            warn!("OPENAI_API_KEY is not set, cover letters use the template");
            None
        }
    };
    if config.hh_access_token.is_none() {
        warn!("HH_ACCESS_TOKEN is not set, applying from the bot is disabled");
    }

    let finder = build_finder(
        FinderSettings::resolve(None, None, None),
        config.hh_access_token.clone(),
    )?;
    let store = BotState::load(&config.paths)?;

    let state = AppState {
        api: Arc::new(TelegramClient::new(&config.telegram_bot_token)?),
        finder: Arc::new(finder),
        letters: CoverLetterService::new(model),
        paths: config.paths.clone(),
        channel: ChatId::parse(&config.telegram_chat_id),
        send_delay: SEND_DELAY,
        store: Arc::new(Mutex::new(store)),
    };

    if let Some(port) = config.status_port {
        routes::spawn_status_server(state.clone(), port);
    }

    bot::run(state).await?;
    Ok(())
}
