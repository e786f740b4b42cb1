use std::sync::LazyLock;

use regex::Regex;

use crate::models::{SalaryRange, NOT_SPECIFIED};

static RANGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*-\s*(\d+)").unwrap());
static FROM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)от\s*(\d+)").unwrap());
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Display string for an hh.ru salary block.
pub fn format_salary(salary: Option<&SalaryRange>) -> String {
    let Some(salary) = salary else {
        return NOT_SPECIFIED.to_string();
    };
    let currency = salary.currency.as_deref().unwrap_or("RUR");
    match (salary.from.filter(|v| *v > 0), salary.to.filter(|v| *v > 0)) {
        (Some(from), Some(to)) => format!(
            "{} - {} {currency}",
            group_thousands(from),
            group_thousands(to)
        ),
        (Some(from), None) => format!("от {} {currency}", group_thousands(from)),
        (None, Some(to)) => format!("до {} {currency}", group_thousands(to)),
        (None, None) => NOT_SPECIFIED.to_string(),
    }
}

/// Lower bound of a free-text salary: the start of a range, the "от N"
/// value, or the first number. Separators (commas, plain and narrow
/// spaces) are ignored.
pub fn parse_min_salary(salary: &str) -> Option<u64> {
    if salary.trim().is_empty() || salary == NOT_SPECIFIED {
        return None;
    }
    let clean: String = salary
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}' | '\u{202f}' | '\u{2009}'))
        .collect();

    let first_capture = |re: &Regex| {
        re.captures(&clean)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
    };

    first_capture(&RANGE)
        .or_else(|| first_capture(&FROM))
        .or_else(|| {
            NUMBER
                .find(&clean)
                .and_then(|m| m.as_str().parse::<u64>().ok())
        })
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
