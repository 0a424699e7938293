use super::{escape, form, format_timestamp, input};
use crate::forms::{FormErrors, UserForm};
use taskhub_shared::models::user::User;

pub fn list(users: &[User]) -> String {
    let rows: String = users
        .iter()
        .map(|user| {
            format!(
                r#"<tr>
<td>{id}</td>
<td>{username}</td>
<td>{full_name}</td>
<td>{created}</td>
<td><a href="/users/{id}/update/">Изменить</a> <a href="/users/{id}/delete/">Удалить</a></td>
</tr>"#,
                id = user.id,
                username = escape(&user.username),
                full_name = escape(&user.full_name()),
                created = format_timestamp(&user.created_at),
            )
        })
        .collect();

    format!(
        r#"<table>
<thead><tr><th>ID</th><th>Имя пользователя</th><th>Полное имя</th><th>Дата создания</th><th></th></tr></thead>
<tbody>
{rows}
</tbody>
</table>"#
    )
}

/// Registration form when `with_email` is set, profile form otherwise
pub fn user_form(
    action: &str,
    data: &UserForm,
    errors: &FormErrors,
    with_email: bool,
    submit: &str,
) -> String {
    let mut fields = vec![
        input("first_name", "Имя", "text", &data.first_name, errors.field("first_name")),
        input("last_name", "Фамилия", "text", &data.last_name, errors.field("last_name")),
        input(
            "username",
            "Имя пользователя",
            "text",
            &data.username,
            errors.field("username"),
        ),
    ];
    if with_email {
        fields.push(input("email", "Email", "email", &data.email, errors.field("email")));
    }
    fields.push(input("password1", "Пароль", "password", "", errors.field("password1")));
    fields.push(input(
        "password2",
        "Подтверждение пароля",
        "password",
        "",
        errors.field("password2"),
    ));

    form(action, &fields.join("\n"), submit)
}
