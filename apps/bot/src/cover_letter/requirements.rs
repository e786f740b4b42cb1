//! Keyword-level requirement extraction from a posting, and matching
//! those requirements against a resume.

/// Keyword groups, first match per group wins.
const CATEGORIES: &[(&str, &[&str])] = &[
    ("Методологии разработки", &["agile", "scrum", "kanban", "lean"]),
    ("Инструменты", &["jira", "confluence", "notion", "figma", "miro"]),
    (
        "Языки программирования",
        &["sql", "python", "javascript", "java", "swift", "kotlin"],
    ),
    ("Архитектура", &["api", "rest", "graphql", "microservices"]),
    ("Инфраструктура", &["aws", "azure", "gcp", "docker", "kubernetes"]),
    ("Аналитика", &["analytics", "метрики", "аналитика", "bi", "tableau"]),
    ("Дизайн", &["ux", "ui", "дизайн", "design"]),
    ("Тестирование", &["a/b тест", "ab тест", "a/b testing"]),
    ("Бизнес-модели", &["b2b", "b2c", "saas", "marketplace"]),
    ("Планирование", &["roadmap", "дорожная карта"]),
    ("Управление задачами", &["backlog", "бэклог", "приоритизация"]),
    ("Коммуникации", &["stakeholder", "стейкхолдер", "коммуникация"]),
    ("Метрики и цели", &["метрики", "kpi", "okr", "цели"]),
    ("Экспериментирование", &["гипотеза", "hypothesis", "эксперимент"]),
    ("Работа с требованиями", &["юзер стори", "user story", "требования"]),
    ("Исследования", &["анализ данных", "data analysis", "исследования"]),
    ("Анализ рынка", &["конкурентный анализ", "competitive analysis"]),
];

const REQUIREMENT_CONTEXT: usize = 100;
const RESUME_CONTEXT: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub keyword: &'static str,
    pub category: &'static str,
    /// Surrounding text from the posting.
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementMatch {
    pub requirement: Requirement,
    /// Surrounding text from the resume.
    pub resume_context: String,
}

/// Substring match on lower-cased text; `pm` also hits `npm`.
pub fn extract_requirements(description: &str) -> Vec<Requirement> {
    let lower = description.to_lowercase();
    CATEGORIES
        .iter()
        .filter_map(|&(category, keywords)| {
            keywords.iter().find_map(|&keyword| {
                context_around(description, &lower, keyword, REQUIREMENT_CONTEXT).map(|context| {
                    Requirement {
                        keyword,
                        category,
                        context,
                    }
                })
            })
        })
        .collect()
}

pub fn match_with_resume(requirements: &[Requirement], resume: &str) -> Vec<RequirementMatch> {
    let lower = resume.to_lowercase();
    requirements
        .iter()
        .filter_map(|req| {
            context_around(resume, &lower, req.keyword, RESUME_CONTEXT).map(|resume_context| {
                RequirementMatch {
                    requirement: req.clone(),
                    resume_context,
                }
            })
        })
        .collect()
}

/// `radius` characters either side of the first hit, trimmed. Positions are
/// counted in characters so the slice never splits a code point.
fn context_around(original: &str, lower: &str, keyword: &str, radius: usize) -> Option<String> {
    let byte_idx = lower.find(keyword)?;
    let start = lower[..byte_idx].chars().count();
    let len = keyword.chars().count();
    let from = start.saturating_sub(radius);
    let to = start + len + radius;
    Some(
        original
            .chars()
            .skip(from)
            .take(to - from)
            .collect::<String>()
            .trim()
            .to_string(),
    )
}
