use crate::{
    cli::auth::{authenticated_client, client_config},
    error, info,
    spotify::{playlist, profile},
    success,
};

/// Exports the given track URIs as a new private playlist.
pub async fn export(name: Option<String>, tracks: Vec<String>) {
    if tracks.is_empty() {
        error!("No tracks given. Pass at least one --track spotify:track:<id>.");
    }

    let config = client_config();
    let client = authenticated_client(&config);

    let user = match profile::get_user_profile(&client).await {
        Ok(user) => user,
        Err(e) => error!("Failed to load profile: {}", e),
    };

    info!("Exporting {} tracks for {}", tracks.len(), user.id);
    match playlist::export(&client, &user, name.as_deref(), &tracks).await {
        Ok(url) => success!("Playlist created: {}", url),
        Err(e) => error!("Failed to export playlist: {}", e),
    }
}
