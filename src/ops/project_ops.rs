use log::{debug, info};

use crate::io::storage::{ListSource, Storage, StorageError, read_project_list, write_project_list};
use crate::model::project::{Project, ProjectList};
use crate::model::task::{Task, TaskId, TaskPatch};

/// Error type for project store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("project index {index} out of range ({len} projects)")]
    ProjectIndexOutOfRange { index: usize, len: usize },
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("task id prefix {0:?} matches more than one task")]
    AmbiguousTask(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The project list mirrored from storage, with one project selected.
///
/// Every mutation rewrites the whole list under the storage key through
/// [`ProjectStore::update_project`]. There is no cross-process coordination:
/// two stores on the same key overwrite each other, last write wins.
#[derive(Debug)]
pub struct ProjectStore<S: Storage> {
    storage: S,
    key: String,
    projects: ProjectList,
    index: usize,
    project: Project,
    source: ListSource,
}

impl<S: Storage> ProjectStore<S> {
    /// Read the list stored under `key` (or the seed list) and select
    /// `project_index`.
    pub fn load(storage: S, key: &str, project_index: usize) -> Result<Self, StoreError> {
        let (projects, source) = read_project_list(&storage, key)?;
        let project = projects
            .get(project_index)
            .cloned()
            .ok_or(StoreError::ProjectIndexOutOfRange {
                index: project_index,
                len: projects.len(),
            })?;
        debug!(
            "event=store_load key={} project={} tasks={}",
            key,
            project_index,
            project.tasks.len()
        );
        Ok(ProjectStore {
            storage,
            key: key.to_string(),
            projects,
            index: project_index,
            project,
            source,
        })
    }

    /// The active project
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The full in-memory list
    pub fn projects(&self) -> &ProjectList {
        &self.projects
    }

    pub fn project_index(&self) -> usize {
        self.index
    }

    /// Where the list came from when it was loaded
    pub fn source(&self) -> &ListSource {
        &self.source
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Display row of the task with `id`
    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.project.tasks.iter().position(|t| t.id == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.project.tasks.iter().find(|t| t.id == id)
    }

    /// Id of the task shown at display row `row`
    pub fn task_id_at(&self, row: usize) -> Option<TaskId> {
        self.project.tasks.get(row).map(|t| t.id)
    }

    /// Resolve a full id or a unique short prefix to a task id
    pub fn resolve(&self, id_or_prefix: &str) -> Result<TaskId, StoreError> {
        if let Ok(id) = id_or_prefix.parse::<TaskId>()
            && self.task(id).is_some()
        {
            return Ok(id);
        }
        let mut matches = self
            .project
            .tasks
            .iter()
            .filter(|t| t.id.matches_prefix(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id),
            (Some(_), Some(_)) => Err(StoreError::AmbiguousTask(id_or_prefix.to_string())),
            (None, _) => Err(StoreError::TaskNotFound(id_or_prefix.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Write the in-memory list when storage does not hold it yet (seed list,
    /// malformed value, or tasks that were given ids on load), so task ids
    /// stay the same across loads. Returns whether anything was written.
    pub fn persist_unsaved(&mut self) -> Result<bool, StoreError> {
        if !self.source.is_unsaved() {
            return Ok(false);
        }
        let current = self.project.clone();
        self.update_project(current)?;
        info!("event=store_persist key={} status=ok", self.key);
        Ok(true)
    }

    /// Flip `completed` on a task. Returns the new value.
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<bool, StoreError> {
        let mut updated = self.project.clone();
        let task = find_mut(&mut updated, id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        self.update_project(updated)?;
        Ok(completed)
    }

    /// Append a task to the active project. Returns its id.
    pub fn add_task(&mut self, task: Task) -> Result<TaskId, StoreError> {
        let id = task.id;
        let mut updated = self.project.clone();
        updated.tasks.push(task);
        self.update_project(updated)?;
        info!("event=task_add project={} id={}", self.index, id.short());
        Ok(id)
    }

    /// Merge `patch` into a task.
    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> Result<(), StoreError> {
        let mut updated = self.project.clone();
        find_mut(&mut updated, id)?.apply(patch);
        self.update_project(updated)
    }

    /// Remove a task. Returns the removed task.
    pub fn delete_task(&mut self, id: TaskId) -> Result<Task, StoreError> {
        let mut updated = self.project.clone();
        let pos = updated
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))?;
        let removed = updated.tasks.remove(pos);
        self.update_project(updated)?;
        info!("event=task_delete project={} id={}", self.index, id.short());
        Ok(removed)
    }

    /// Replace the active project in the list, persist the whole list, then
    /// update the active-project view. The only path that writes storage.
    ///
    /// On a failed write neither the list nor the view changes.
    fn update_project(&mut self, updated: Project) -> Result<(), StoreError> {
        let mut projects = self.projects.clone();
        projects.0[self.index] = updated.clone();
        write_project_list(&mut self.storage, &self.key, &projects)?;
        self.projects = projects;
        self.project = updated;
        self.source = ListSource::Stored;
        Ok(())
    }
}

fn find_mut(project: &mut Project, id: TaskId) -> Result<&mut Task, StoreError> {
    project
        .tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
}
