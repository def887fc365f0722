use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Setting;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PutSettingRequest {
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SettingList {
    #[schema(value_type = Vec<Setting>)]
    pub items: Vec<Setting>,
}
