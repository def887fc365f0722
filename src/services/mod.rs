pub mod auth_service;
pub mod bill_service;
pub mod cart_service;
pub mod category_service;
pub mod food_service;
pub mod history_service;
pub mod promotion_service;
pub mod setting_service;
pub mod statistics_service;
pub mod table_service;
pub mod user_service;
