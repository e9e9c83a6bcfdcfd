use crate::model::task::{Task, TaskField, TaskId};

use super::line_edit::LineEdit;

/// Columns of the task table, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    Created,
    Done,
    Delete,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Title, Column::Created, Column::Done, Column::Delete];

    /// Editable field behind this column, if any
    pub fn field(self) -> Option<TaskField> {
        match self {
            Column::Title => Some(TaskField::Title),
            Column::Created => Some(TaskField::Created),
            Column::Done | Column::Delete => None,
        }
    }

    pub fn next(self) -> Column {
        let i = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(i + 1).min(Self::ALL.len() - 1)]
    }

    pub fn prev(self) -> Column {
        let i = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[i.saturating_sub(1)]
    }
}

/// The cell being edited and its uncommitted buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit {
    pub task_id: TaskId,
    pub field: TaskField,
    pub input: LineEdit,
}

/// Which cell of the table, if any, is in edit mode. At most one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditCursor {
    #[default]
    Viewing,
    Editing(CellEdit),
}

impl EditCursor {
    /// Put `field` of `task` into edit mode, seeded with its current value.
    ///
    /// Any other cell already in edit mode is dropped without being committed.
    pub fn begin(&mut self, task: &Task, field: TaskField) {
        *self = EditCursor::Editing(CellEdit {
            task_id: task.id,
            field,
            input: LineEdit::new(task.field(field)),
        });
    }

    /// Leave edit mode, handing back the value to persist
    pub fn commit(&mut self) -> Option<(TaskId, TaskField, String)> {
        match std::mem::take(self) {
            EditCursor::Editing(edit) => {
                Some((edit.task_id, edit.field, edit.input.into_text()))
            }
            EditCursor::Viewing => None,
        }
    }

    /// Leave edit mode, discarding the buffer
    pub fn cancel(&mut self) {
        *self = EditCursor::Viewing;
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditCursor::Editing(_))
    }

    pub fn is_editing_cell(&self, id: TaskId, field: TaskField) -> bool {
        matches!(self, EditCursor::Editing(e) if e.task_id == id && e.field == field)
    }

    pub fn edit(&self) -> Option<&CellEdit> {
        match self {
            EditCursor::Editing(e) => Some(e),
            EditCursor::Viewing => None,
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut LineEdit> {
        match self {
            EditCursor::Editing(e) => Some(&mut e.input),
            EditCursor::Viewing => None,
        }
    }
}

/// Cursor, scroll and edit state of the task table
#[derive(Debug, Clone)]
pub struct TaskTableState {
    /// Selected row (display order)
    pub row: usize,
    pub column: Column,
    /// First visible row
    pub scroll_offset: usize,
    pub edit: EditCursor,
}

impl Default for TaskTableState {
    fn default() -> Self {
        TaskTableState {
            row: 0,
            column: Column::Title,
            scroll_offset: 0,
            edit: EditCursor::Viewing,
        }
    }
}

impl TaskTableState {
    /// Keep the row cursor inside `0..len`
    pub fn clamp(&mut self, len: usize) {
        self.row = self.row.min(len.saturating_sub(1));
    }

    pub fn move_row(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.row = 0;
            return;
        }
        let target = self.row as isize + delta;
        self.row = target.clamp(0, len as isize - 1) as usize;
    }

    /// Adjust `scroll_offset` so the cursor row is visible in `height` rows
    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.row < self.scroll_offset {
            self.scroll_offset = self.row;
        } else if self.row >= self.scroll_offset + height {
            self.scroll_offset = self.row + 1 - height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_seeds_buffer_with_current_value() {
        let task = Task::new("Выполнить план", "21.11.2024", false);
        let mut cursor = EditCursor::default();
        cursor.begin(&task, TaskField::Created);
        let edit = cursor.edit().unwrap();
        assert_eq!(edit.input.text(), "21.11.2024");
        assert!(cursor.is_editing_cell(task.id, TaskField::Created));
        assert!(!cursor.is_editing_cell(task.id, TaskField::Title));
    }

    #[test]
    fn begin_on_another_cell_drops_previous_buffer() {
        let a = Task::new("A", "01.01.2025", false);
        let b = Task::new("B", "02.01.2025", false);
        let mut cursor = EditCursor::default();
        cursor.begin(&a, TaskField::Title);
        cursor.input_mut().unwrap().insert_str(" changed");

        cursor.begin(&b, TaskField::Title);
        assert!(!cursor.is_editing_cell(a.id, TaskField::Title));
        assert!(cursor.is_editing_cell(b.id, TaskField::Title));

        let (id, field, value) = cursor.commit().unwrap();
        assert_eq!(id, b.id);
        assert_eq!(field, TaskField::Title);
        assert_eq!(value, "B");
    }

    #[test]
    fn commit_returns_value_and_leaves_edit_mode() {
        let task = Task::new("Old", "01.01.2025", false);
        let mut cursor = EditCursor::default();
        cursor.begin(&task, TaskField::Title);
        let input = cursor.input_mut().unwrap();
        input.clear();
        input.insert_str("New");

        assert_eq!(
            cursor.commit(),
            Some((task.id, TaskField::Title, "New".to_string()))
        );
        assert_eq!(cursor, EditCursor::Viewing);
        assert_eq!(cursor.commit(), None);
    }

    #[test]
    fn cancel_discards() {
        let task = Task::new("Old", "01.01.2025", false);
        let mut cursor = EditCursor::default();
        cursor.begin(&task, TaskField::Title);
        cursor.cancel();
        assert!(!cursor.is_editing());
        assert_eq!(cursor.commit(), None);
    }

    #[test]
    fn column_navigation_stops_at_edges() {
        assert_eq!(Column::Title.prev(), Column::Title);
        assert_eq!(Column::Title.next(), Column::Created);
        assert_eq!(Column::Delete.next(), Column::Delete);
        assert_eq!(Column::Done.field(), None);
        assert_eq!(Column::Created.field(), Some(TaskField::Created));
    }

    #[test]
    fn row_movement_and_scroll() {
        let mut state = TaskTableState::default();
        state.move_row(-1, 3);
        assert_eq!(state.row, 0);
        state.move_row(5, 3);
        assert_eq!(state.row, 2);
        state.ensure_visible(2);
        assert_eq!(state.scroll_offset, 1);
        state.row = 0;
        state.ensure_visible(2);
        assert_eq!(state.scroll_offset, 0);
        state.move_row(1, 0);
        assert_eq!(state.row, 0);
    }
}
