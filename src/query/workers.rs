use super::{contains_ci, pagination, Page, PAGE_SIZE};
use crate::error::AppError;
use crate::forms::WorkerUsernameSearchForm;
use crate::models::Worker;
use crate::store::Store;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct WorkerListParams {
    pub username: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerFilter {
    pub username_contains: Option<String>,
}

impl WorkerFilter {
    pub fn from_params(params: &WorkerListParams) -> Self {
        let username_contains = WorkerUsernameSearchForm {
            username: params.username.clone(),
        }
        .clean()
        .unwrap_or_else(|errors| {
            log::debug!("ignoring worker username search: {:?}", errors);
            None
        });
        Self { username_contains }
    }

    pub fn matches(&self, worker: &Worker) -> bool {
        self.username_contains
            .as_deref()
            .map_or(true, |needle| contains_ci(&worker.username, needle))
    }
}

pub async fn worker_page(
    store: &dyn Store,
    params: &WorkerListParams,
) -> Result<Page<Worker>, AppError> {
    let filter = WorkerFilter::from_params(params);
    let count = store.count_filtered_workers(&filter).await?;
    let number = pagination::resolve_page_number(params.page.as_deref(), count, PAGE_SIZE)?;
    let workers = store
        .worker_window(&filter, pagination::offset(number, PAGE_SIZE), PAGE_SIZE)
        .await?;
    Ok(pagination::page_of(workers, number, count, PAGE_SIZE))
}
