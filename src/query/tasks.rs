use super::{contains_ci, pagination, Page, PAGE_SIZE};
use crate::error::AppError;
use crate::forms::{TaskNameSearchForm, TaskStatusFilterForm};
use crate::models::Task;
use crate::store::Store;
use serde::{Deserialize, Serialize};

/// Raw query string of the task listing.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TaskListParams {
    pub name: Option<String>,
    pub status: Option<String>,
    pub page: Option<String>,
}

/// What a task must satisfy to be listed. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub name_contains: Option<String>,
    pub is_completed: Option<bool>,
}

impl TaskFilter {
    /// Builds the filter from the search and status forms. A form that does
    /// not validate contributes nothing.
    pub fn from_params(params: &TaskListParams) -> Self {
        let name_contains = TaskNameSearchForm {
            name: params.name.clone(),
        }
        .clean()
        .unwrap_or_else(|errors| {
            log::debug!("ignoring task name search: {:?}", errors);
            None
        });

        let is_completed = TaskStatusFilterForm {
            status: params.status.clone(),
        }
        .clean()
        .unwrap_or_else(|errors| {
            log::debug!("ignoring task status filter: {:?}", errors);
            None
        })
        .map(|status| status.is_completed());

        Self {
            name_contains,
            is_completed,
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        let name_ok = self
            .name_contains
            .as_deref()
            .map_or(true, |needle| contains_ci(&task.name, needle));
        let status_ok = self
            .is_completed
            .map_or(true, |wanted| task.is_completed == wanted);
        name_ok && status_ok
    }
}

/// One page of the task listing for the given raw parameters.
pub async fn task_page(store: &dyn Store, params: &TaskListParams) -> Result<Page<Task>, AppError> {
    let filter = TaskFilter::from_params(params);
    let count = store.count_tasks(&filter).await?;
    let number = pagination::resolve_page_number(params.page.as_deref(), count, PAGE_SIZE)?;
    let tasks = store
        .task_window(&filter, pagination::offset(number, PAGE_SIZE), PAGE_SIZE)
        .await?;
    Ok(pagination::page_of(tasks, number, count, PAGE_SIZE))
}
