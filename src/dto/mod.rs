pub mod auth;
pub mod bills;
pub mod cart;
pub mod categories;
pub mod foods;
pub mod history;
pub mod promotions;
pub mod settings;
pub mod statistics;
pub mod tables;
pub mod users;
