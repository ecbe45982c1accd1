pub mod auth;
pub mod health;
pub mod itineraries;
pub mod users;
