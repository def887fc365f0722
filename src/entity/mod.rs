pub mod bill_items;
pub mod bills;
pub mod cart_items;
pub mod categories;
pub mod dining_tables;
pub mod foods;
pub mod history;
pub mod promotions;
pub mod settings;
pub mod users;

pub use bill_items::Entity as BillItems;
pub use bills::Entity as Bills;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use dining_tables::Entity as DiningTables;
pub use foods::Entity as Foods;
pub use history::Entity as History;
pub use promotions::Entity as Promotions;
pub use settings::Entity as Settings;
pub use users::Entity as Users;
