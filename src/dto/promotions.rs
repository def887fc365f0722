use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Promotion;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePromotionRequest {
    pub code: String,
    pub discount_percent: i32,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePromotionRequest {
    pub discount_percent: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PromotionList {
    #[schema(value_type = Vec<Promotion>)]
    pub items: Vec<Promotion>,
}
