use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::DataPaths;
use crate::cover_letter::CoverLetterService;
use crate::dates;
use crate::errors::AppError;
use crate::finder::VacancyFinder;
use crate::models::Vacancy;
use crate::store::{FreshStore, ResumeStore, SentStore, UserSentFresh, UserStore};
use crate::telegram::types::ChatId;
use crate::telegram::ChatApi;

/// Everything the bot persists or remembers between updates.
#[derive(Debug)]
pub struct BotState {
    pub sent: SentStore,
    pub users: UserStore,
    pub resumes: ResumeStore,
    pub fresh: FreshStore,
    pub user_sent_fresh: UserSentFresh,
    /// Postings offered recently, by callback id.
    pub vacancy_cache: VacancyCache,
    /// Users asked to type their desired position.
    pub awaiting_position: HashSet<i64>,
}

impl BotState {
    pub fn load(paths: &DataPaths) -> Result<Self, AppError> {
        Ok(Self {
            sent: SentStore::load(paths.sent_file()),
            users: UserStore::load(paths.users_file()),
            resumes: ResumeStore::load_all(paths.resumes_dir())?,
            fresh: FreshStore::load(paths.fresh_file(), dates::today()),
            user_sent_fresh: UserSentFresh::load(paths.user_sent_fresh_file()),
            vacancy_cache: VacancyCache::default(),
            awaiting_position: HashSet::new(),
        })
    }
}

/// Most recently offered postings, so button presses resolve without the
/// vacancies file. The oldest entry is dropped once `capacity` is reached.
#[derive(Debug)]
pub struct VacancyCache {
    capacity: usize,
    entries: HashMap<String, Vacancy>,
    order: VecDeque<String>,
}

pub const VACANCY_CACHE_CAPACITY: usize = 500;

impl Default for VacancyCache {
    fn default() -> Self {
        Self::with_capacity(VACANCY_CACHE_CAPACITY)
    }
}

impl VacancyCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, id: String, vacancy: Vacancy) {
        if self.entries.insert(id.clone(), vacancy).is_some() {
            self.order.retain(|known| known != &id);
        }
        self.order.push_back(id);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Vacancy> {
        self.entries.get(id)
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }
}

/// Shared application state handed to every update handler, the scanner
/// task and the status routes.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ChatApi>,
    pub finder: Arc<VacancyFinder>,
    pub letters: CoverLetterService,
    pub paths: DataPaths,
    /// Channel or chat that receives `/send` batches.
    pub channel: ChatId,
    /// Pause between consecutive chat sends.
    pub send_delay: Duration,
    pub store: Arc<Mutex<BotState>>,
}
