use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Table, TableStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub number: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TableStatusRequest {
    pub status: TableStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TableList {
    #[schema(value_type = Vec<Table>)]
    pub items: Vec<Table>,
}
