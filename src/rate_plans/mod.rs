// Rate plans
// Registry, per-date overrides, pricing rules and the rate calculation engine

pub mod calculator;
pub mod handlers;
pub mod models;
pub mod override_repository;
pub mod repository;
pub mod rules;
pub mod service;

pub use calculator::*;
pub use handlers::*;
pub use models::*;
pub use override_repository::*;
pub use repository::*;
pub use service::*;
