/// Pages for name-only reference data (statuses and labels)

use super::{escape, form, format_timestamp, input};
use crate::forms::{FormErrors, NameForm};
use chrono::{DateTime, Utc};

/// Titles and URLs of one catalog
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pub base_url: &'static str,
    pub list_title: &'static str,
    pub create_title: &'static str,
    pub update_title: &'static str,
    pub delete_title: &'static str,
}

pub const STATUSES: Catalog = Catalog {
    base_url: "/statuses/",
    list_title: "Статусы",
    create_title: "Создать статус",
    update_title: "Изменение статуса",
    delete_title: "Удаление статуса",
};

pub const LABELS: Catalog = Catalog {
    base_url: "/labels/",
    list_title: "Метки",
    create_title: "Создать метку",
    update_title: "Изменение метки",
    delete_title: "Удаление метки",
};

/// A row as the list page shows it
pub struct Entry<'a> {
    pub id: i64,
    pub name: &'a str,
    pub created_at: &'a DateTime<Utc>,
}

impl Catalog {
    pub fn create_url(&self) -> String {
        format!("{}create/", self.base_url)
    }

    pub fn update_url(&self, id: i64) -> String {
        format!("{}{id}/update/", self.base_url)
    }

    pub fn delete_url(&self, id: i64) -> String {
        format!("{}{id}/delete/", self.base_url)
    }

    pub fn list(&self, entries: &[Entry<'_>]) -> String {
        let rows: String = entries
            .iter()
            .map(|entry| {
                format!(
                    r#"<tr>
<td>{id}</td>
<td>{name}</td>
<td>{created}</td>
<td><a href="{update}">Изменить</a> <a href="{delete}">Удалить</a></td>
</tr>"#,
                    id = entry.id,
                    name = escape(entry.name),
                    created = format_timestamp(entry.created_at),
                    update = self.update_url(entry.id),
                    delete = self.delete_url(entry.id),
                )
            })
            .collect();

        format!(
            r#"<p><a href="{create}">{create_title}</a></p>
<table>
<thead><tr><th>ID</th><th>Имя</th><th>Дата создания</th><th></th></tr></thead>
<tbody>
{rows}
</tbody>
</table>"#,
            create = self.create_url(),
            create_title = escape(self.create_title),
        )
    }

    pub fn name_form(&self, action: &str, data: &NameForm, errors: &FormErrors, submit: &str) -> String {
        form(
            action,
            &input("name", "Имя", "text", &data.name, errors.field("name")),
            submit,
        )
    }
}
