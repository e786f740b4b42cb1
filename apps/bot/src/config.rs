use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const VACANCIES_FILE: &str = "product_manager_vacancies.json";
const SENT_FILE: &str = "sent_vacancies.json";
const USERS_FILE: &str = "users_data.json";
const FRESH_FILE: &str = "fresh_vacancies.json";
const USER_SENT_FRESH_FILE: &str = "user_sent_fresh.json";
const RESUMES_DIR: &str = "resumes";

/// Chat-facing configuration loaded from environment variables.
/// Fails at startup if the bot token or target chat is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub openai_api_key: Option<String>,
    pub hh_access_token: Option<String>,
    pub status_port: Option<u16>,
    pub paths: DataPaths,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            telegram_bot_token: require_env("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: require_env("TELEGRAM_CHAT_ID")?,
            openai_api_key: optional_env("OPENAI_API_KEY"),
            hh_access_token: optional_env("HH_ACCESS_TOKEN"),
            status_port: optional_env("STATUS_PORT")
                .map(|p| p.parse::<u16>())
                .transpose()
                .context("STATUS_PORT must be a valid port number")?,
            paths: DataPaths::from_env(),
        })
    }
}

/// Filter thresholds for the finder. Explicit values win over the environment;
/// non-numeric environment values are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinderSettings {
    pub min_salary: Option<u64>,
    pub min_experience_years: Option<u64>,
    pub max_vacancies: usize,
}

pub const DEFAULT_MAX_VACANCIES: usize = 10;

impl FinderSettings {
    pub fn resolve(
        min_salary: Option<u64>,
        min_experience_years: Option<u64>,
        max_vacancies: Option<usize>,
    ) -> Self {
        let max_vacancies = max_vacancies
            .or_else(|| int_env("MAX_VACANCIES").map(|v| v as usize))
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_VACANCIES);

        Self {
            min_salary: min_salary.or_else(|| int_env("MIN_SALARY")).filter(|v| *v > 0),
            min_experience_years: min_experience_years
                .or_else(|| int_env("MIN_EXPERIENCE_YEARS"))
                .filter(|v| *v > 0),
            max_vacancies,
        }
    }
}

impl Default for FinderSettings {
    fn default() -> Self {
        Self {
            min_salary: None,
            min_experience_years: None,
            max_vacancies: DEFAULT_MAX_VACANCIES,
        }
    }
}

/// Locations of every JSON state file, rooted at `DATA_DIR` (default: cwd).
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        Self::new(optional_env("DATA_DIR").unwrap_or_else(|| ".".to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vacancies_file(&self) -> PathBuf {
        self.root.join(VACANCIES_FILE)
    }

    pub fn sent_file(&self) -> PathBuf {
        self.root.join(SENT_FILE)
    }

    pub fn users_file(&self) -> PathBuf {
        self.root.join(USERS_FILE)
    }

    pub fn fresh_file(&self) -> PathBuf {
        self.root.join(FRESH_FILE)
    }

    pub fn user_sent_fresh_file(&self) -> PathBuf {
        self.root.join(USER_SENT_FRESH_FILE)
    }

    pub fn resumes_dir(&self) -> PathBuf {
        self.root.join(RESUMES_DIR)
    }
}

pub fn rust_log() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}

pub fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn int_env(key: &str) -> Option<u64> {
    optional_env(key).and_then(|v| v.parse::<u64>().ok())
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
