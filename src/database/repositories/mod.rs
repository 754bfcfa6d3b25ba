pub mod company;
pub mod customer;
pub mod password_reset;
pub mod personnel;
pub mod session;
pub mod team;
pub mod user;
pub mod visit;

// Re-export all repositories for easy importing
pub use company::CompanyRepository;
pub use customer::CustomerRepository;
pub use password_reset::PasswordResetTokenRepository;
pub use personnel::PersonnelRepository;
pub use session::SessionRepository;
pub use team::TeamRepository;
pub use user::UserRepository;
pub use visit::VisitRepository;
