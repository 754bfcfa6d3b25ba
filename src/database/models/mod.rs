pub mod auth;
pub mod company;
pub mod customer;
pub mod macros;
pub mod personnel;
pub mod route;
pub mod stats;
pub mod team;
pub mod user;
pub mod visit;

// Re-export all models for easy importing
pub use auth::*;
pub use company::*;
pub use customer::*;
pub use personnel::*;
pub use route::*;
pub use stats::*;
pub use team::*;
pub use user::*;
pub use visit::*;
