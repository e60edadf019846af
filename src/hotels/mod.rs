// Hotel directory
// Read-only view of hotels, room types and rooms owned by other services

pub mod access;
pub mod models;
pub mod repository;

pub use access::*;
pub use models::*;
pub use repository::*;
