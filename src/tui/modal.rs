use crate::model::task::{Task, TaskField};

use super::line_edit::LineEdit;

pub const MODAL_TITLE: &str = "Добавить задачу";
pub const TITLE_REQUIRED: &str = "Введите название задачи";

/// State of the "add task" overlay
#[derive(Debug, Clone)]
pub struct AddTaskModal {
    pub title: LineEdit,
    pub created: LineEdit,
    pub focus: TaskField,
    pub error: Option<&'static str>,
}

impl AddTaskModal {
    pub fn new(today: impl Into<String>) -> Self {
        AddTaskModal {
            title: LineEdit::default(),
            created: LineEdit::new(today),
            focus: TaskField::Title,
            error: None,
        }
    }

    pub fn focused_input(&mut self) -> &mut LineEdit {
        match self.focus {
            TaskField::Title => &mut self.title,
            TaskField::Created => &mut self.created,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            TaskField::Title => TaskField::Created,
            TaskField::Created => TaskField::Title,
        };
    }

    /// Build the new task, or record why it can't be built yet
    pub fn confirm(&mut self) -> Option<Task> {
        let title = self.title.text().trim();
        if title.is_empty() {
            self.error = Some(TITLE_REQUIRED);
            self.focus = TaskField::Title;
            return None;
        }
        self.error = None;
        Some(Task::new(title, self.created.text().trim(), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_is_prefilled() {
        let modal = AddTaskModal::new("16.10.2026");
        assert_eq!(modal.created.text(), "16.10.2026");
        assert_eq!(modal.title.text(), "");
        assert_eq!(modal.focus, TaskField::Title);
    }

    #[test]
    fn empty_title_is_refused() {
        let mut modal = AddTaskModal::new("16.10.2026");
        modal.title.insert_str("   ");
        assert!(modal.confirm().is_none());
        assert_eq!(modal.error, Some(TITLE_REQUIRED));
    }

    #[test]
    fn confirm_builds_incomplete_task() {
        let mut modal = AddTaskModal::new("16.10.2026");
        modal.title.insert_str("Написать тесты");
        modal.toggle_focus();
        modal.focused_input().clear();
        modal.focused_input().insert_str("01.11.2026");

        let task = modal.confirm().unwrap();
        assert_eq!(task.title, "Написать тесты");
        assert_eq!(task.created, "01.11.2026");
        assert!(!task.completed);
        assert!(modal.error.is_none());
    }
}
