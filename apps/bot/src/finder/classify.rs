const PRODUCT_KEYWORDS: &[&str] = &[
    "product manager",
    "продакт менеджер",
    "продакт-менеджер",
    "product owner",
    "продакт оунер",
    "продакт-оунер",
    "product lead",
    "продакт лид",
    "продакт-лид",
    "product",
    "продакт",
    "pm",
    "po",
];

const PROJECT_KEYWORDS: &[&str] = &[
    "project manager",
    "проект менеджер",
    "проект-менеджер",
    "project",
    "проект",
    "программный менеджер",
    "program manager",
];

/// Keyword test for product-management titles. Project and program
/// management titles are excluded unless they also say "product".
pub fn is_product_manager_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    let has_product = PRODUCT_KEYWORDS.iter().any(|k| lower.contains(k));
    if !has_product {
        return false;
    }
    let has_project = PROJECT_KEYWORDS.iter().any(|k| lower.contains(k));
    if has_project {
        return lower.contains("product") || lower.contains("продакт");
    }
    true
}
