use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Bill, BillItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenBillRequest {
    pub table_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BillLineRequest {
    pub food_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemsRequest {
    pub items: Vec<BillLineRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyPromotionRequest {
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DiscountRequest {
    pub discount: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillWithItems {
    pub bill: Bill,
    pub items: Vec<BillItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillList {
    pub items: Vec<Bill>,
}
