// Authentication module
// Validates bearer JWTs and enforces organization and role access rules

pub mod error;
pub mod middleware;
pub mod models;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::AuthenticatedUser;
pub use models::Role;
pub use token::{Claims, TokenService};
