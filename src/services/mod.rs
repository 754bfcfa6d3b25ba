pub mod auth;
pub mod customer_directory;
pub mod directions;
pub mod geocoding;
pub mod identity;
pub mod provisioning;
pub mod route_planner;
pub mod route_reconstruction;
pub mod team_directory;
pub mod user_context;
pub mod visit_lifecycle;

pub use auth::{AuthService, Claims};
pub use customer_directory::{CustomerDirectory, CustomerStore};
pub use directions::{DirectionsProvider, GoogleDirectionsClient};
pub use geocoding::{Geocoder, GoogleGeocoder};
pub use identity::{Identity, IdentityProvider, LocalIdentityProvider};
pub use provisioning::{PersonnelProvisioning, PersonnelStore};
pub use route_planner::RoutePlanner;
pub use team_directory::{TeamDirectory, TeamStore};
pub use user_context::{SessionDirectory, UserContext};
pub use visit_lifecycle::{VisitLifecycle, VisitStore};
