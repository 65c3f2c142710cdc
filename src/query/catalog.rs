use super::{contains_ci, ordering};
use crate::error::AppError;
use crate::forms::normalize;
use crate::models::{Position, TaskType};
use crate::store::Store;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CatalogParams {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFilter {
    pub name_contains: Option<String>,
}

impl NameFilter {
    pub fn from_params(params: &CatalogParams) -> Self {
        Self {
            name_contains: normalize(&params.name),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name_contains
            .as_deref()
            .map_or(true, |needle| contains_ci(name, needle))
    }
}

pub async fn position_list(
    store: &dyn Store,
    params: &CatalogParams,
) -> Result<Vec<Position>, AppError> {
    let mut positions = store.list_positions(&NameFilter::from_params(params)).await?;
    positions.sort_by(ordering::position_default);
    Ok(positions)
}

pub async fn task_type_list(
    store: &dyn Store,
    params: &CatalogParams,
) -> Result<Vec<TaskType>, AppError> {
    let mut task_types = store.list_task_types(&NameFilter::from_params(params)).await?;
    task_types.sort_by(ordering::task_type_default);
    Ok(task_types)
}
