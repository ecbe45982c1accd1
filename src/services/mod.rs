pub mod blob;
pub mod identity;
pub mod itinerary;
pub mod profile;
