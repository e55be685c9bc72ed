// storefront/src/models/mod.rs

//! Records persisted by the store, plus the computed order views.

pub mod address;
pub mod category;
pub mod coupon;
pub mod item;
pub mod order;
pub mod order_item;
pub mod refund;

pub use address::{Address, AddressType, NewAddress};
pub use category::Category;
pub use coupon::Coupon;
pub use item::{Item, ItemFilter};
pub use order::{Order, OrderSummary};
pub use order_item::{LineDecrement, OrderItem, OrderLine};
pub use refund::Refund;
