/// Server-rendered HTML
///
/// Pages are assembled with `format!`. Every value that comes from a user or
/// the store goes through [`escape`] before it is written into markup.

pub mod auth;
pub mod catalog;
pub mod tasks;
pub mod users;

use chrono::{DateTime, Utc};
use taskhub_shared::{flash::FlashMessage, models::user::User};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #212529; }
nav { background: #212529; padding: .75rem 1.5rem; display: flex; gap: 1rem; align-items: center; }
nav a, nav button { color: #f8f9fa; text-decoration: none; background: none; border: 0; font: inherit; cursor: pointer; }
nav .brand { font-weight: bold; margin-right: auto; }
main { max-width: 960px; margin: 1.5rem auto; padding: 0 1rem; }
.alert { padding: .75rem 1rem; border-radius: .25rem; margin-bottom: 1rem; }
.alert-success { background: #d1e7dd; } .alert-info { background: #cff4fc; } .alert-danger { background: #f8d7da; }
table { width: 100%; border-collapse: collapse; } th, td { text-align: left; padding: .5rem; border-bottom: 1px solid #dee2e6; }
.field { margin-bottom: 1rem; } .field label { display: block; margin-bottom: .25rem; }
.errors { color: #dc3545; margin: .25rem 0 0; padding-left: 1rem; }
"#;

/// Escapes text for element content and quoted attribute values
pub fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%d.%m.%Y %H:%M").to_string()
}

/// Wraps a page body with navigation and pending flash messages
pub fn layout(title: &str, user: Option<&User>, flashes: &[FlashMessage], body: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            r#"<a href="/users/">Пользователи</a>
<a href="/statuses/">Статусы</a>
<a href="/labels/">Метки</a>
<a href="/tasks/">Задачи</a>
<span>{name}</span>
<form method="post" action="/logout/"><button type="submit">Выход</button></form>"#,
            name = escape(&user.username),
        ),
        None => r#"<a href="/users/">Пользователи</a>
<a href="/login/">Вход</a>
<a href="/users/create/">Регистрация</a>"#
            .to_string(),
    };

    let alerts: String = flashes
        .iter()
        .map(|message| {
            format!(
                r#"<div class="alert alert-{}" role="alert">{}</div>"#,
                message.level.css_class(),
                escape(&message.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Менеджер задач</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a class="brand" href="/">Менеджер задач</a>
{nav}
</nav>
<main>
{alerts}
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

/// Minimal page for error responses, which have no request context
pub fn error_page(title: &str, message: &str) -> String {
    layout(title, None, &[], &format!("<p>{}</p>", escape(message)))
}

pub fn errors_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape(e)))
        .collect();
    format!(r#"<ul class="errors">{items}</ul>"#)
}

/// Labeled `<input>` with its errors
pub fn input(name: &str, label: &str, kind: &str, value: &str, errors: &[String]) -> String {
    format!(
        r#"<div class="field">
<label for="id_{name}">{label}</label>
<input type="{kind}" name="{name}" id="id_{name}" value="{value}">
{errors}
</div>"#,
        label = escape(label),
        value = escape(value),
        errors = errors_list(errors),
    )
}

pub fn textarea(name: &str, label: &str, value: &str, errors: &[String]) -> String {
    format!(
        r#"<div class="field">
<label for="id_{name}">{label}</label>
<textarea name="{name}" id="id_{name}" rows="5">{value}</textarea>
{errors}
</div>"#,
        label = escape(label),
        value = escape(value),
        errors = errors_list(errors),
    )
}

/// One `<option>` of a select
#[derive(Debug, Clone)]
pub struct Choice {
    pub value: i64,
    pub label: String,
}

impl Choice {
    pub fn new(value: i64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Labeled `<select>`
///
/// Single selects get a leading blank option; multiple selects don't.
pub fn select(
    name: &str,
    label: &str,
    choices: &[Choice],
    selected: &[i64],
    multiple: bool,
    errors: &[String],
) -> String {
    let mut options = String::new();
    if !multiple {
        options.push_str(r#"<option value="">---------</option>"#);
    }
    for choice in choices {
        let marker = if selected.contains(&choice.value) {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            r#"<option value="{}"{marker}>{}</option>"#,
            choice.value,
            escape(&choice.label)
        ));
    }

    format!(
        r#"<div class="field">
<label for="id_{name}">{label}</label>
<select name="{name}" id="id_{name}"{multiple}>{options}</select>
{errors}
</div>"#,
        label = escape(label),
        multiple = if multiple { " multiple" } else { "" },
        errors = errors_list(errors),
    )
}

/// POST form with a submit button
pub fn form(action: &str, fields: &str, submit: &str) -> String {
    format!(
        r#"<form method="post" action="{action}">
{fields}
<button type="submit">{submit}</button>
</form>"#,
        action = escape(action),
        submit = escape(submit),
    )
}

/// Delete confirmation for a named object
pub fn confirm_delete(action: &str, object_name: &str) -> String {
    form(
        action,
        &format!(
            "<p>Вы уверены, что хотите удалить {}?</p>",
            escape(object_name)
        ),
        "Да, удалить",
    )
}
