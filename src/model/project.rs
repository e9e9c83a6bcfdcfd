use serde::{Deserialize, Serialize};

use super::task::Task;

/// Title given to the implicit project built from the seed tasks
pub const SEED_PROJECT_TITLE: &str = "Мой проект";

/// A titled, ordered collection of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn new(title: impl Into<String>) -> Self {
        Project {
            title: title.into(),
            tasks: Vec::new(),
        }
    }

    /// Number of completed tasks
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

/// Every project, persisted as one JSON array under a single storage key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectList(pub Vec<Project>);

impl ProjectList {
    /// The list used when storage holds nothing: one project, three tasks
    pub fn seed() -> Self {
        let mut project = Project::new(SEED_PROJECT_TITLE);
        project.tasks = vec![
            Task::new("Выполнить план по тз", "21.11.2024", true),
            Task::new("Сделать реконструкцию функции", "17.11.2024", false),
            Task::new("Добавить фильтры для проектов", "11.11.2024", true),
        ];
        ProjectList(vec![project])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Project> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Project> {
        self.0.iter()
    }

    /// Total task count across all projects
    pub fn task_count(&self) -> usize {
        self.0.iter().map(|p| p.tasks.len()).sum()
    }
}
