// Prompt text for cover letters. Russian, because the letters are.

pub const COVER_LETTER_SYSTEM: &str =
    "Ты профессиональный HR-консультант, который помогает составлять сопроводительные письма.";

const INPUT_LIMIT: usize = 2000;

fn head(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// User prompt for one posting. The resume block, with its
/// requirement-by-requirement instructions, is added only when present.
pub fn build_cover_letter_prompt(
    title: &str,
    company: &str,
    description: Option<&str>,
    resume: Option<&str>,
) -> String {
    let description = description
        .filter(|d| !d.trim().is_empty())
        .map(|d| head(d, INPUT_LIMIT))
        .unwrap_or_else(|| "Описание не предоставлено".to_string());

    let mut parts = vec![
        format!(
            "Составь профессиональное сопроводительное письмо на русском языке для вакансии \"{title}\" в компании \"{company}\"."
        ),
        String::new(),
        "Описание вакансии:".to_string(),
        description,
    ];

    if let Some(resume) = resume.filter(|r| !r.trim().is_empty()) {
        parts.extend([
            String::new(),
            "Резюме кандидата:".to_string(),
            head(resume, INPUT_LIMIT),
            String::new(),
            "ВАЖНО:".to_string(),
            "1. Проанализируй все требования из описания вакансии".to_string(),
            "2. Найди в резюме ответы на КАЖДОЕ требование".to_string(),
            "3. Перечисли все найденные совпадения в письме".to_string(),
            "4. Для каждого требования из вакансии, которое есть в резюме, укажи конкретный опыт/навык"
                .to_string(),
            "5. Структурируй письмо так, чтобы было видно соответствие каждому требованию"
                .to_string(),
        ]);
    }

    parts.extend(
        [
            "",
            "Требования к письму:",
            "- Краткое (2-3 абзаца)",
            "- Профессиональное",
            "- Показывает интерес к позиции",
            "- Подчеркивает релевантный опыт и навыки из резюме",
            "- Заканчивается призывом к действию",
            "",
            "Начни письмо с обращения к HR-менеджеру.",
        ]
        .map(str::to_string),
    );

    parts.join("\n")
}
