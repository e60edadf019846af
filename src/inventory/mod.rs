// Inventory ledger and availability checking

pub mod availability;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use availability::*;
pub use handlers::*;
pub use models::*;
pub use repository::*;
pub use service::*;
