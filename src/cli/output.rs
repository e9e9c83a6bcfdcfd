use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::auth::FieldErrors;
use crate::model::project::Project;
use crate::model::task::Task;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub row: usize,
    pub title: String,
    pub created: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub project: usize,
    pub title: String,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub index: usize,
    pub title: String,
    pub tasks: usize,
    pub completed: usize,
    pub active: bool,
}

#[derive(Serialize)]
pub struct FieldErrorsJson<'a> {
    pub errors: &'a FieldErrors,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(row: usize, task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.to_string(),
        row,
        title: task.title.clone(),
        created: task.created.clone(),
        completed: task.completed,
    }
}

pub fn project_to_json(index: usize, project: &Project, active: usize) -> ProjectJson {
    ProjectJson {
        index,
        title: project.title.clone(),
        tasks: project.tasks.len(),
        completed: project.completed_count(),
        active: index == active,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    format!(
        "[{}] {}  {}  {}",
        check,
        task.id.short(),
        task.created,
        task.title
    )
}

/// Format a project as one line of `td projects`
pub fn format_project_line(index: usize, project: &Project, active: usize) -> String {
    let marker = if index == active { '*' } else { ' ' };
    format!(
        "{} {}  {} ({}/{})",
        marker,
        index,
        project.title,
        project.completed_count(),
        project.tasks.len()
    )
}

/// One `field: message` line per invalid field
pub fn format_field_errors(errors: &FieldErrors) -> Vec<String> {
    errors
        .iter()
        .map(|(field, message)| {
            let name = serde_json::to_value(field)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            format!("{}: {}", name, message)
        })
        .collect()
}

/// Human-readable recovery entry: header line, fields, then the body
pub fn format_recovery_entry(entry: &RecoveryEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{} [{}] {}",
        entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        entry.category,
        entry.description
    )];
    for (key, value) in &entry.fields {
        lines.push(format!("  {}: {}", key, value));
    }
    for body_line in entry.body.lines() {
        lines.push(format!("  | {}", body_line));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::auth::AuthField;

    #[test]
    fn task_line_marks_completed() {
        let task = Task::new("Ship", "01.02.2025", true);
        let line = format_task_line(&task);
        assert!(line.starts_with("[x] "));
        assert!(line.contains(&task.id.short()));
        assert!(line.ends_with("01.02.2025  Ship"));
    }

    #[test]
    fn project_line_marks_active() {
        let mut project = Project::new("Work");
        project.tasks.push(Task::new("a", "d", true));
        project.tasks.push(Task::new("b", "d", false));
        assert_eq!(format_project_line(1, &project, 1), "* 1  Work (1/2)");
        assert_eq!(format_project_line(0, &project, 1), "  0  Work (1/2)");
    }

    #[test]
    fn field_errors_use_wire_names() {
        let mut errors = FieldErrors::new();
        errors.insert(AuthField::Password, "Пароль обязателен".into());
        errors.insert(AuthField::Email, "Почта обязательна".into());
        assert_eq!(
            format_field_errors(&errors),
            vec!["email: Почта обязательна", "password: Пароль обязателен"]
        );
    }

    #[test]
    fn task_json_shape() {
        let task = Task::new("T", "01.01.2025", false);
        let json = serde_json::to_value(task_to_json(0, &task)).unwrap();
        assert_eq!(json["title"], "T");
        assert_eq!(json["completed"], false);
        assert_eq!(json["id"], task.id.to_string());
    }
}
