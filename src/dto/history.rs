use serde::Serialize;
use utoipa::ToSchema;

use crate::models::History;

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct HistoryList {
    #[schema(value_type = Vec<History>)]
    pub items: Vec<History>,
}
