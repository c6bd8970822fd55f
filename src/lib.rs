pub mod api;
pub mod cli;
pub mod conversation;
pub mod location;
pub mod models;
pub mod shell;

use std::error::Error;
use std::time::Duration;

use log::{info, warn};

use api::auth::AuthClient;
use api::new_backend;
use cli::Args;
use conversation::ConversationController;
use location::create_location_provider;
use models::user::UserProfile;
use shell::ChatShell;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let signed_in = args.token.as_deref().is_some_and(|token| !token.is_empty());

    info!("--- Core Configuration ---");
    info!("API Base URL: {}", args.api_base_url);
    info!(
        "Session Token: {}",
        if signed_in {
            "configured"
        } else {
            "absent (guest mode)"
        }
    );
    info!("User Id: {}", args.user_id.as_deref().unwrap_or("not set"));
    info!("Request Timeout: {}s", args.request_timeout_secs);
    match (args.latitude, args.longitude) {
        (Some(latitude), Some(longitude)) => {
            info!("Fixed Coordinates: ({}, {})", latitude, longitude)
        }
        _ => info!("Fixed Coordinates: not set"),
    }
    info!("-------------------------");

    let backend = new_backend(&args)?;
    let location = create_location_provider(&args);
    let profile = if signed_in {
        fetch_profile(&args).await
    } else {
        None
    };

    let controller = ConversationController::new(backend, location);
    let mut shell = ChatShell::new(controller, profile, signed_in);
    shell.run().await
}

/// Profile lookup is best-effort: a failure downgrades the greeting, never
/// the chat itself.
async fn fetch_profile(args: &Args) -> Option<UserProfile> {
    let token = args.token.as_deref()?;
    let timeout = Duration::from_secs(args.request_timeout_secs);
    let auth = match AuthClient::new(args.api_base_url.as_str(), timeout) {
        Ok(client) => client,
        Err(err) => {
            warn!("Could not build the auth client: {}", err);
            return None;
        }
    };
    match auth.fetch_profile(token, args.user_id.as_deref()).await {
        Ok(profile) => {
            info!(
                "Signed in as {}",
                profile.name.as_deref().unwrap_or("unknown user")
            );
            Some(profile)
        }
        Err(err) => {
            warn!("Profile lookup failed: {}", err);
            None
        }
    }
}
