use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Food;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFoodRequest {
    pub name: String,
    pub price: i64,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFoodRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct FoodList {
    #[schema(value_type = Vec<Food>)]
    pub items: Vec<Food>,
}
