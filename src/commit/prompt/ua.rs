//! Ukrainian prompts.

use super::{ManagedOptions, MAX_DIFF_CHARS, PromptTemplates, SUBJECT_MAX_CHARS, types_list};
use crate::commit::diff::DiffSourceMode;

pub(super) struct Ukrainian;

const EXAMPLES: &str = "feat(auth): додано Google OAuth провайдер
fix(api): виправлено помилку валідації в user endpoint
refactor(store): оптимізовано управління станом корзини
docs(readme): оновлено інструкції встановлення";

fn rules() -> String {
    format!(
        r#"- Формат: <type>(<scope>): <subject>
- Type: {types}
- Subject ТІЛЬКИ у МИНУЛОМУ ЧАСІ (що ЗРОБЛЕНО), макс {SUBJECT_MAX_CHARS} символів, без крапки
- Використовуй дієслова: додано, виправлено, оновлено, видалено, рефакторено
- НЕПРАВИЛЬНО: "додати функцію", "виправити баг", "оновити стилі"
- ПРАВИЛЬНО: "додано функцію", "виправлено баг", "оновлено стилі""#,
        types = types_list(),
    )
}

fn output_rule(multi_line: bool) -> &'static str {
    if multi_line {
        "Поверни ТІЛЬКИ commit message: рядок subject, порожній рядок, потім 2-4 короткі пункти \"- \" у минулому часі. Без пояснень."
    } else {
        "Поверни ТІЛЬКИ commit message (один рядок), без пояснень."
    }
}

impl PromptTemplates for Ukrainian {
    fn generation(&self, diff: &str, stats: &str, multi_line: bool) -> String {
        format!(
            r#"Проаналізуй git зміни та згенеруй commit message у форматі conventional commits.

Статистика змін:
{stats}

Diff (перші {MAX_DIFF_CHARS} символів):
{diff}

СУВОРІ ПРАВИЛА:
{rules}

Приклади:
{EXAMPLES}

{output}"#,
            rules = rules(),
            output = output_rule(multi_line),
        )
    }

    fn edit(&self, current_message: &str, feedback: &str, diff: &str, stats: &str) -> String {
        format!(
            r#"Ти написав цей commit message для git змін нижче:

{current_message}

Користувач хоче його змінити:
{feedback}

Відредагуй наявне повідомлення згідно з відгуком. Не починай з нуля: збережи все, що відгук не просить змінити.

Статистика змін:
{stats}

Diff (перші {MAX_DIFF_CHARS} символів):
{diff}

ПРАВИЛА (якщо відгук явно не вимагає іншого):
{rules}

Поверни ТІЛЬКИ оновлений commit message, без пояснень."#,
            rules = rules(),
        )
    }

    fn managed(&self, options: &ManagedOptions<'_>) -> String {
        let scope = match options.diff_source {
            DiffSourceMode::Staged => "staged зміни (`git diff --cached`)",
            DiffSourceMode::All => "усі незакомічені зміни (`git diff HEAD`)",
            DiffSourceMode::Auto => {
                "staged зміни (`git diff --cached`); якщо нічого не staged, усі незакомічені зміни (`git diff HEAD`)"
            }
        };

        let attribution = if options.keep_co_authored_by {
            "Можеш завершити повідомлення трейлером Co-Authored-By."
        } else {
            "НЕ додавай трейлер Co-Authored-By чи будь-яку іншу атрибуцію."
        };

        let mut prompt = format!(
            r#"Напиши git commit message для цього репозиторію.

Переглянь зміни самостійно за допомогою git. Опиши {scope}.
Не додавай файли в індекс, не створюй коміт і нічого не змінюй.

СУВОРІ ПРАВИЛА:
{rules}
- {attribution}

Приклади:
{EXAMPLES}"#,
            rules = rules(),
        );

        let instruction = options.custom_instruction.trim();
        if !instruction.is_empty() {
            prompt.push_str(&format!("\n\nДодаткові інструкції від користувача:\n{instruction}"));
        }

        prompt.push_str("\n\n");
        prompt.push_str(output_rule(options.multi_line));
        prompt
    }
}
