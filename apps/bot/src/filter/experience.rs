use std::sync::LazyLock;

use regex::Regex;

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"от\s+(\d+)\s+лет",
        r"(\d+)\+\s+лет",
        r"(\d+)\s+лет",
        r"(\d+)\s+года",
        r"(\d+)\s+год",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Minimum years for an hh.ru experience id.
pub fn years_from_hh_id(id: &str) -> Option<u64> {
    match id {
        "noExperience" => Some(0),
        "between1And3" => Some(1),
        "between3And6" => Some(3),
        "moreThan6" => Some(6),
        _ => None,
    }
}

/// Years mentioned in free text ("от 3 лет", "5+ лет", "2 года").
pub fn parse_years(text: &str) -> Option<u64> {
    if text.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    PATTERNS.iter().find_map(|re| {
        re.captures(&lower)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
    })
}
