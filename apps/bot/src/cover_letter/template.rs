//! Offline cover letter built from the posting and, when available, the
//! requirements the resume covers.

use std::collections::HashSet;

use super::requirements::{extract_requirements, match_with_resume};

const GENERIC_EXPERIENCE: &str = "Я имею опыт работы в продуктовой разработке и управления продуктами, что соответствует требованиям данной позиции. ";
const CLOSING: &str = "Буду рад обсудить, как мой опыт может быть полезен для вашей команды. Готов предоставить дополнительную информацию и ответить на ваши вопросы.\n\nС уважением,\n[Ваше имя]";
const MAX_CATEGORIES: usize = 5;

pub fn template_letter(
    title: &str,
    company: &str,
    description: Option<&str>,
    resume: Option<&str>,
) -> String {
    let description = description.filter(|d| !d.trim().is_empty());
    let resume = resume.filter(|r| !r.trim().is_empty());

    let mut letter = format!(
        "Здравствуйте!\n\nМеня заинтересовала вакансия \"{title}\" в компании {company}. \n\n"
    );

    match (description, resume) {
        (Some(description), Some(resume)) => {
            let requirements = extract_requirements(description);
            let matched = match_with_resume(&requirements, resume);
            if matched.is_empty() {
                letter.push_str("Изучив описание вакансии, я вижу, что мой опыт работы в продуктовой разработке и управления продуктами соответствует требованиям данной позиции. ");
            } else {
                let keywords = matched_keywords(matched.iter().map(|m| m.requirement.keyword));
                letter.push_str(&format!(
                    "Мой опыт соответствует требованиям: {}. ",
                    keywords.join(", ")
                ));
                letter.push_str("Мой опыт, отраженный в резюме, показывает, что я обладаю необходимыми компетенциями для успешной работы на данной позиции. ");
            }
        }
        (Some(description), None) => {
            let requirements = extract_requirements(description);
            let mut categories: Vec<&str> = Vec::new();
            for req in requirements.iter().take(MAX_CATEGORIES) {
                if !categories.contains(&req.category) {
                    categories.push(req.category);
                }
            }
            if !categories.is_empty() {
                letter.push_str(&format!(
                    "Я вижу, что в вакансии упоминаются следующие области: {}. ",
                    categories.join(", ")
                ));
            }
            letter.push_str(GENERIC_EXPERIENCE);
        }
        _ => letter.push_str(GENERIC_EXPERIENCE),
    }

    letter.push_str(CLOSING);
    letter
}

/// Display forms in first-seen order, de-duplicated case-insensitively.
fn matched_keywords<'a>(keywords: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .map(|kw| {
            if kw.chars().count() > 3 {
                title_case(kw)
            } else {
                kw.to_uppercase()
            }
        })
        .filter(|kw| seen.insert(kw.to_lowercase()))
        .collect()
}

/// Upper-cases the first letter of every alphabetic run.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("user story"), "User Story");
        assert_eq!(title_case("a/b тест"), "A/B Тест");
        assert_eq!(title_case("scrum"), "Scrum");
    }

    #[test]
    fn test_matched_keywords_formatting() {
        let out = matched_keywords(["scrum", "sql", "метрики", "метрики"].into_iter());
        assert_eq!(out, vec!["Scrum", "SQL", "Метрики"]);
    }

    #[test]
    fn test_letter_with_matches() {
        let letter = template_letter(
            "Product Manager",
            "Acme",
            Some("Опыт Scrum, знание SQL и Jira"),
            Some("Работал по Scrum, писал SQL запросы"),
        );
        assert!(letter.starts_with(
            "Здравствуйте!\n\nМеня заинтересовала вакансия \"Product Manager\" в компании Acme. \n\n"
        ));
        assert!(letter.contains("Мой опыт соответствует требованиям: Scrum, SQL. "));
        assert!(letter.ends_with("С уважением,\n[Ваше имя]"));
    }

    #[test]
    fn test_letter_without_matches() {
        let letter = template_letter("PM", "Acme", Some("Знание Kotlin"), Some("Резюме без совпадений"));
        assert!(letter.contains("Изучив описание вакансии"));
        assert!(!letter.contains("соответствует требованиям:"));
    }

    #[test]
    fn test_letter_description_only_lists_areas() {
        let letter = template_letter("PM", "Acme", Some("Agile, Jira, backlog"), None);
        assert!(letter.contains(
            "Я вижу, что в вакансии упоминаются следующие области: Методологии разработки, Инструменты, Управление задачами. "
        ));
        assert!(letter.contains(GENERIC_EXPERIENCE));
    }

    #[test]
    fn test_letter_without_inputs() {
        let letter = template_letter("PM", "Acme", None, Some("resume"));
        assert!(letter.contains(GENERIC_EXPERIENCE));
        assert!(!letter.contains("области"));
    }
}
