pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod personnel;
pub mod routes;
pub mod shared;
pub mod teams;
pub mod visits;
