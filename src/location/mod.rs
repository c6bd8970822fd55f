use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::cli::Args;

/// A resolved position, forwarded with each chat message so the backend can
/// rank doctor recommendations by distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Best-effort source of the user's position. Implementations swallow their
/// own failures; a session without coordinates is still a valid session.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn locate(&self) -> Option<Coordinates>;
}

/// Provider backed by fixed coordinates from configuration.
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Coordinates {
                latitude,
                longitude,
            },
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn locate(&self) -> Option<Coordinates> {
        Some(self.coordinates)
    }
}

/// Provider for sessions with no position source at all.
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn locate(&self) -> Option<Coordinates> {
        None
    }
}

pub fn create_location_provider(args: &Args) -> Arc<dyn LocationProvider> {
    match (args.latitude, args.longitude) {
        (Some(latitude), Some(longitude)) => {
            info!("Location source: fixed coordinates ({}, {})", latitude, longitude);
            Arc::new(FixedLocation::new(latitude, longitude))
        }
        _ => {
            info!("Location source: none (messages go out without coordinates)");
            Arc::new(NoLocation)
        }
    }
}
