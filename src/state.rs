/*
 * Responsibility
 * - shared context attached to the Router (AppState)
 *   - identity provider, profile + itinerary services
 * - cheap to Clone (Arc inside); everything is built once in app::run and injected
 */
use std::sync::Arc;

use crate::repos::{itinerary_repo::ItineraryRepo, user_repo::UserDirectory};
use crate::services::{
    blob::BlobStore, identity::IdentityProvider, itinerary::ItineraryService,
    profile::ProfileService,
};

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub profiles: Arc<ProfileService>,
    pub itineraries: Arc<ItineraryService>,
}

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserDirectory>,
        itineraries: Arc<dyn ItineraryRepo>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            profiles: Arc::new(ProfileService::new(identity.clone(), users)),
            itineraries: Arc::new(ItineraryService::new(itineraries, blobs)),
            identity,
        }
    }
}
