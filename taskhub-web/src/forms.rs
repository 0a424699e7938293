/// Form and query-string inputs
///
/// Field rules are declared with `validator`. Failures are collected into
/// [`FormErrors`] and re-rendered next to the offending fields.

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use taskhub_shared::models::task::TaskFilter;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

pub const REQUIRED: &str = "Обязательное поле.";
pub const INVALID_CHOICE: &str =
    "Выберите корректный вариант. Этого варианта нет среди допустимых значений.";

/// Key for errors that belong to the whole form
pub const NON_FIELD: &str = "__all__";

/// Error messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn non_field(&self) -> &[String] {
        self.field(NON_FIELD)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, messages) in errors.field_errors() {
            for error in messages.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form_errors.add(&field.to_string(), message);
            }
        }
        form_errors
    }
}

/// Runs the declared field rules of a form
pub fn field_errors<T: Validate>(form: &T) -> FormErrors {
    match form.validate() {
        Ok(()) => FormErrors::new(),
        Err(e) => FormErrors::from(e),
    }
}

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error_with_message("required", REQUIRED));
    }
    Ok(())
}

/// Required; letters, digits and `@ . + - _` only
fn validate_username(value: &str) -> Result<(), ValidationError> {
    required(value)?;

    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !value.chars().all(allowed) {
        return Err(error_with_message(
            "username",
            "Введите правильное имя пользователя. Оно может содержать только буквы, \
             цифры и знаки @/./+/-/_.",
        ));
    }
    Ok(())
}

/// Blank is accepted; anything else must look like an address
fn validate_optional_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().to_string().validate_email() {
        return Ok(());
    }
    Err(error_with_message(
        "email",
        "Введите правильный адрес электронной почты.",
    ))
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(custom(function = "required"))]
    pub username: String,

    #[validate(custom(function = "required"))]
    pub password: String,
}

/// Registration and profile form
///
/// On update the password pair may be left blank to keep the current one.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserForm {
    #[validate(length(max = 150, message = "Не более 150 символов."))]
    pub first_name: String,

    #[validate(length(max = 150, message = "Не более 150 символов."))]
    pub last_name: String,

    #[validate(
        custom(function = "validate_username"),
        length(max = 150, message = "Не более 150 символов.")
    )]
    pub username: String,

    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,

    pub password1: String,
    pub password2: String,
}

impl UserForm {
    pub fn email(&self) -> Option<String> {
        let email = self.email.trim();
        (!email.is_empty()).then(|| email.to_string())
    }

    pub fn wants_password_change(&self) -> bool {
        !self.password1.is_empty() || !self.password2.is_empty()
    }
}

/// Name-only form shared by statuses and labels
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct NameForm {
    #[validate(
        custom(function = "required"),
        length(max = 100, message = "Не более 100 символов.")
    )]
    pub name: String,
}

/// Raw task form as submitted
///
/// Built from the urlencoded pairs so that `labels` may repeat.
#[derive(Debug, Clone, Default, Validate)]
pub struct TaskForm {
    #[validate(
        custom(function = "required"),
        length(max = 150, message = "Не более 150 символов.")
    )]
    pub name: String,

    pub description: String,
    pub status: String,
    pub executor: String,
    pub labels: Vec<String>,
}

/// Task form with every ID parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub name: String,
    pub description: String,
    pub status_id: i64,
    pub executor_id: Option<i64>,
    pub label_ids: Vec<i64>,
}

impl TaskForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = TaskForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => form.name = value,
                "description" => form.description = value,
                "status" => form.status = value,
                "executor" => form.executor = value,
                "labels" => form.labels.push(value),
                _ => {}
            }
        }
        form
    }

    /// Checks field rules and parses the ID fields
    ///
    /// Existence of the referenced rows is checked by the caller.
    pub fn parse(&self) -> Result<TaskInput, FormErrors> {
        let mut errors = field_errors(self);

        let status_id = if self.status.trim().is_empty() {
            errors.add("status", REQUIRED);
            None
        } else {
            let id = parse_id(&self.status);
            if id.is_none() {
                errors.add("status", INVALID_CHOICE);
            }
            id
        };

        let executor_id = if self.executor.trim().is_empty() {
            None
        } else {
            let id = parse_id(&self.executor);
            if id.is_none() {
                errors.add("executor", INVALID_CHOICE);
            }
            id
        };

        let mut label_ids = Vec::with_capacity(self.labels.len());
        for raw in self.labels.iter().filter(|raw| !raw.trim().is_empty()) {
            match parse_id(raw) {
                Some(id) => label_ids.push(id),
                None => errors.add("labels", INVALID_CHOICE),
            }
        }

        match (status_id, errors.is_empty()) {
            (Some(status_id), true) => Ok(TaskInput {
                name: self.name.trim().to_string(),
                description: self.description.clone(),
                status_id,
                executor_id,
                label_ids,
            }),
            _ => Err(errors),
        }
    }

    pub fn selected_labels(&self) -> Vec<i64> {
        self.labels.iter().filter_map(|raw| parse_id(raw)).collect()
    }
}

/// Task list query string
///
/// Every criterion is optional; blank or non-numeric values mean "any".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskFilterQuery {
    pub status: Option<String>,
    pub executor: Option<String>,
    pub label: Option<String>,
    pub self_tasks: Option<String>,
}

impl TaskFilterQuery {
    pub fn only_own(&self) -> bool {
        matches!(
            self.self_tasks.as_deref().map(str::trim),
            Some("on" | "true" | "1")
        )
    }

    pub fn to_filter(&self, current_user_id: i64) -> TaskFilter {
        TaskFilter {
            status_id: self.status.as_deref().and_then(parse_id),
            executor_id: self.executor.as_deref().and_then(parse_id),
            label_id: self.label.as_deref().and_then(parse_id),
            author_id: self.only_own().then_some(current_user_id),
        }
    }
}

/// Positive integer ID, None for anything else
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id(" 3 "), Some(3));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-4"), None);
    }

    #[test]
    fn test_user_form_rules() {
        let form = UserForm {
            username: "bad name!".to_string(),
            email: "not-an-email".to_string(),
            ..Default::default()
        };

        let errors = FormErrors::from(form.validate().unwrap_err());
        assert!(!errors.field("username").is_empty());
        assert!(!errors.field("email").is_empty());
        assert!(errors.field("first_name").is_empty());

        let ok = UserForm {
            username: "anna.s+test@corp".to_string(),
            email: String::new(),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.email(), None);
    }

    #[test]
    fn test_blank_username_is_required() {
        let errors = FormErrors::from(UserForm::default().validate().unwrap_err());
        assert_eq!(errors.field("username"), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_task_form_collects_repeated_labels() {
        let form = TaskForm::from_pairs(pairs(&[
            ("name", "Write docs"),
            ("status", "2"),
            ("executor", ""),
            ("labels", "1"),
            ("labels", "3"),
            ("csrf", "ignored"),
        ]));

        let input = form.parse().unwrap();
        assert_eq!(input.status_id, 2);
        assert_eq!(input.executor_id, None);
        assert_eq!(input.label_ids, vec![1, 3]);
    }

    #[test]
    fn test_task_form_errors() {
        let form = TaskForm::from_pairs(pairs(&[("name", "  "), ("executor", "x")]));

        let errors = form.parse().unwrap_err();
        assert_eq!(errors.field("name"), [REQUIRED.to_string()]);
        assert_eq!(errors.field("status"), [REQUIRED.to_string()]);
        assert_eq!(errors.field("executor"), [INVALID_CHOICE.to_string()]);
    }

    #[test]
    fn test_filter_query_ignores_blank_values() {
        let query = TaskFilterQuery {
            status: Some(String::new()),
            executor: Some("7".to_string()),
            label: Some("abc".to_string()),
            self_tasks: None,
        };

        assert_eq!(
            query.to_filter(1),
            TaskFilter {
                executor_id: Some(7),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_filter_query_self_tasks() {
        let query = TaskFilterQuery {
            self_tasks: Some("on".to_string()),
            ..Default::default()
        };

        assert!(query.only_own());
        assert_eq!(query.to_filter(5).author_id, Some(5));
        assert!(TaskFilterQuery::default().to_filter(5).is_empty());
    }
}
