use super::{escape, form, format_timestamp, input, select, textarea, Choice};
use crate::forms::{parse_id, FormErrors, TaskFilterQuery, TaskForm};
use taskhub_shared::models::{label::Label, task::TaskView};

/// Options offered by the task form and the list filter
pub struct TaskChoices {
    pub statuses: Vec<Choice>,
    pub users: Vec<Choice>,
    pub labels: Vec<Choice>,
}

pub fn list(tasks: &[TaskView], choices: &TaskChoices, query: &TaskFilterQuery) -> String {
    let selected = |raw: &Option<String>| -> Vec<i64> {
        raw.as_deref().and_then(parse_id).into_iter().collect()
    };

    let filter = format!(
        r#"<form method="get" action="/tasks/" class="filter">
{status}
{executor}
{label}
<div class="field"><label><input type="checkbox" name="self_tasks" id="id_self_tasks"{checked}> Только свои задачи</label></div>
<button type="submit">Показать</button>
</form>"#,
        status = select("status", "Статус", &choices.statuses, &selected(&query.status), false, &[]),
        executor = select(
            "executor",
            "Исполнитель",
            &choices.users,
            &selected(&query.executor),
            false,
            &[]
        ),
        label = select("label", "Метка", &choices.labels, &selected(&query.label), false, &[]),
        checked = if query.only_own() { " checked" } else { "" },
    );

    let rows: String = tasks
        .iter()
        .map(|task| {
            format!(
                r#"<tr>
<td>{id}</td>
<td><a href="/tasks/{id}/">{name}</a></td>
<td>{status}</td>
<td>{author}</td>
<td>{executor}</td>
<td>{created}</td>
<td><a href="/tasks/{id}/update/">Изменить</a> <a href="/tasks/{id}/delete/">Удалить</a></td>
</tr>"#,
                id = task.id,
                name = escape(&task.name),
                status = escape(&task.status_name),
                author = escape(&task.author_name()),
                executor = escape(&task.executor_name().unwrap_or_default()),
                created = format_timestamp(&task.created_at),
            )
        })
        .collect();

    format!(
        r#"<p><a href="/tasks/create/">Создать задачу</a></p>
{filter}
<table>
<thead><tr><th>ID</th><th>Имя</th><th>Статус</th><th>Автор</th><th>Исполнитель</th><th>Дата создания</th><th></th></tr></thead>
<tbody>
{rows}
</tbody>
</table>"#
    )
}

pub fn detail(task: &TaskView, labels: &[Label]) -> String {
    let label_items: String = labels
        .iter()
        .map(|label| format!("<li>{}</li>", escape(&label.name)))
        .collect();

    format!(
        r#"<dl>
<dt>Автор</dt><dd>{author}</dd>
<dt>Исполнитель</dt><dd>{executor}</dd>
<dt>Статус</dt><dd>{status}</dd>
<dt>Дата создания</dt><dd>{created}</dd>
</dl>
<p>{description}</p>
<h2>Метки</h2>
<ul>{label_items}</ul>
<p><a href="/tasks/{id}/update/">Изменить</a> <a href="/tasks/{id}/delete/">Удалить</a></p>"#,
        id = task.id,
        author = escape(&task.author_name()),
        executor = escape(&task.executor_name().unwrap_or_default()),
        status = escape(&task.status_name),
        created = format_timestamp(&task.created_at),
        description = escape(&task.description),
    )
}

pub fn task_form(
    action: &str,
    data: &TaskForm,
    choices: &TaskChoices,
    errors: &FormErrors,
    submit: &str,
) -> String {
    let fields = [
        input("name", "Имя", "text", &data.name, errors.field("name")),
        textarea("description", "Описание", &data.description, errors.field("description")),
        select(
            "status",
            "Статус",
            &choices.statuses,
            &parse_id(&data.status).into_iter().collect::<Vec<_>>(),
            false,
            errors.field("status"),
        ),
        select(
            "executor",
            "Исполнитель",
            &choices.users,
            &parse_id(&data.executor).into_iter().collect::<Vec<_>>(),
            false,
            errors.field("executor"),
        ),
        select(
            "labels",
            "Метки",
            &choices.labels,
            &data.selected_labels(),
            true,
            errors.field("labels"),
        ),
    ];

    form(action, &fields.join("\n"), submit)
}
