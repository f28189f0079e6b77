pub mod cart_items;
pub mod logs;
pub mod menu_items;
pub mod order_kots;
pub mod orders;
pub mod profiles;
pub mod transactions;
pub mod users;

pub use cart_items as cart_item_entity;
pub use logs as log_entity;
pub use menu_items as menu_item_entity;
pub use order_kots as order_kot_entity;
pub use orders as order_entity;
pub use profiles as profile_entity;
pub use transactions as transaction_entity;
pub use users as user_entity;

pub use logs::LogMode;
pub use orders::PaymentType;
