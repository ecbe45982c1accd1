pub mod auth;
pub mod itineraries;
pub mod users;
