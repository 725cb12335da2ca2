//! Domain models for the storefront.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartEntry};
pub use order::{Order, OrderItem, OrderWithItems};
pub use product::{Category, NewProduct, Product};
pub use session::{CurrentUser, session_keys};
pub use user::{Profile, User};
