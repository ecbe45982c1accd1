pub mod error;
pub mod itinerary_repo;
pub mod user_repo;
