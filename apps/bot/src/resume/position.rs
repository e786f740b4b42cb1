use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Labelled "desired position" lines, most specific first. Applied to the
/// text with all whitespace collapsed to single spaces.
static POSITION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"желаемая\s+должность",
        r"желаемая\s+позиция",
        r"желаемая\s+работа",
        r"желаемая\s+вакансия",
        r"должность",
        r"позиция",
        r"профессия",
        r"desired\s+position",
        r"desired\s+job",
        r"position",
        r"job\s+title",
        r"target\s+position",
        r"цель",
        r"objective",
        r"career\s+objective",
        r"ищу\s+работу\s+на\s+позицию",
        r"ищу\s+позицию",
        r"looking\s+for",
    ]
    .iter()
    .map(|label| labelled(label))
    .collect()
});

static SALARY_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"желаемая\s+зарплата",
        r"зарплата",
        r"зарплата\s+от",
        r"оклад",
        r"salary",
        r"desired\s+salary",
        r"compensation",
    ]
    .iter()
    .map(|label| labelled(label))
    .collect()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s\-/()]").unwrap());
static PHONE_LIKE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d\s\-+()]+$").unwrap());
static LETTERS_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[А-Яа-яA-Za-z\s\-]+$").unwrap());

const ROLE_KEYWORDS: &[&str] = &[
    "менеджер",
    "manager",
    "разработчик",
    "developer",
    "дизайнер",
    "designer",
    "аналитик",
    "analyst",
    "специалист",
    "specialist",
    "инженер",
    "engineer",
    "архитектор",
    "architect",
    "лид",
    "lead",
    "директор",
    "director",
    "руководитель",
    "head",
    "координатор",
    "coordinator",
    "консультант",
    "consultant",
];

const HEADER_LINES: usize = 15;

/// `<label>: <value>` up to the end of the line, a period or a semicolon.
fn labelled(label: &str) -> Regex {
    Regex::new(&format!(r"(?im){label}[:\s]*([^\n\r]+?)(?:\n|$|\.|;)")).unwrap()
}

fn looks_like_contact(text: &str) -> bool {
    text.contains('@') || PHONE_LIKE.is_match(text)
}

/// Desired position from resume text: labelled lines first, then the
/// first header lines naming a role, then a short letters-only line.
pub fn extract_position(resume: &str) -> Option<String> {
    let normalized = WHITESPACE.replace_all(resume, " ");

    for (i, pattern) in POSITION_PATTERNS.iter().enumerate() {
        for caps in pattern.captures_iter(&normalized) {
            let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let cleaned = DISALLOWED.replace_all(raw.trim(), "");
            let cleaned = WHITESPACE.replace_all(cleaned.trim(), " ").trim().to_string();
            let len = cleaned.chars().count();
            if (3..=100).contains(&len) && !looks_like_contact(&cleaned) {
                debug!("Position found by pattern {}: '{cleaned}'", i + 1);
                return Some(cleaned);
            }
        }
    }

    for line in resume.lines().take(HEADER_LINES) {
        let line = line.trim();
        let len = line.chars().count();
        if !(5..=80).contains(&len) {
            continue;
        }
        let lower = line.to_lowercase();
        if ROLE_KEYWORDS.iter().any(|k| lower.contains(k)) && !looks_like_contact(line) {
            debug!("Position found in header line: '{line}'");
            return Some(line.to_string());
        }
    }

    resume
        .lines()
        .map(str::trim)
        .find(|line| {
            (5..=80).contains(&line.chars().count())
                && LETTERS_ONLY.is_match(line)
                && line.split_whitespace().count() <= 5
        })
        .map(str::to_string)
}

/// Desired salary as written in the resume; the value must contain a digit.
pub fn extract_salary(resume: &str) -> Option<String> {
    SALARY_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures_iter(resume)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .find(|value| value.chars().any(|c| c.is_ascii_digit()))
            .map(str::to_string)
    })
}
