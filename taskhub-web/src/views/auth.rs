use super::{errors_list, escape, form, input};
use crate::forms::{FormErrors, LoginForm};
use taskhub_shared::models::user::User;

pub fn index(user: Option<&User>) -> String {
    match user {
        Some(user) => format!(
            r#"<p>Здравствуйте, {}!</p>
<p><a href="/tasks/">Перейти к задачам</a></p>"#,
            escape(&user.full_name())
        ),
        None => r#"<p>Простой менеджер задач: статусы, метки, исполнители.</p>
<p><a href="/login/">Войдите</a> или <a href="/users/create/">зарегистрируйтесь</a>.</p>"#
            .to_string(),
    }
}

pub fn login(data: &LoginForm, errors: &FormErrors) -> String {
    let fields = format!(
        "{}\n{}\n{}",
        errors_list(errors.non_field()),
        input(
            "username",
            "Имя пользователя",
            "text",
            &data.username,
            errors.field("username")
        ),
        input("password", "Пароль", "password", "", errors.field("password")),
    );

    form("/login/", &fields, "Войти")
}
