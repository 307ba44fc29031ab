use crate::{
    error::AuthError,
    management::KeyValueStore,
    spotify::{
        client::{AuthenticatedClient, RequestOptions},
        exchange::TokenExchanger,
    },
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, UserProfile,
    },
    utils,
};

/// Spotify accepts at most this many URIs per add-tracks call.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Creates a private playlist owned by `user_id`.
pub async fn create<E, S>(
    client: &AuthenticatedClient<E, S>,
    user_id: &str,
    name: &str,
    description: &str,
) -> Result<CreatePlaylistResponse, AuthError>
where
    E: TokenExchanger,
    S: KeyValueStore,
{
    let body = CreatePlaylistRequest {
        name: name.to_string(),
        description: description.to_string(),
        public: false,
    };

    client
        .request(
            &format!("/users/{user_id}/playlists"),
            RequestOptions::post(serde_json::to_value(body)?),
        )
        .await?
        .decode()
}

/// Appends `uris` to a playlist in batches and returns the last snapshot id.
pub async fn add_tracks<E, S>(
    client: &AuthenticatedClient<E, S>,
    playlist_id: &str,
    uris: &[String],
) -> Result<Option<String>, AuthError>
where
    E: TokenExchanger,
    S: KeyValueStore,
{
    let mut snapshot = None;
    for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
        let body = AddTrackToPlaylistRequest {
            uris: chunk.to_vec(),
        };
        let response: AddTrackToPlaylistResponse = client
            .request(
                &format!("/playlists/{playlist_id}/tracks"),
                RequestOptions::post(serde_json::to_value(body)?),
            )
            .await?
            .decode()?;
        snapshot = Some(response.snapshot_id);
    }
    Ok(snapshot)
}

/// Default playlist name, e.g. `Taste Mixer (2026-10-16)`.
pub fn default_name() -> String {
    format!("Taste Mixer ({})", utils::today())
}

/// Exports `uris` as a new private playlist for `user` and returns its
/// Spotify URL (or the playlist id when no URL was returned).
pub async fn export<E, S>(
    client: &AuthenticatedClient<E, S>,
    user: &UserProfile,
    name: Option<&str>,
    uris: &[String],
) -> Result<String, AuthError>
where
    E: TokenExchanger,
    S: KeyValueStore,
{
    if uris.is_empty() {
        return Err(AuthError::EmptyPlaylist);
    }

    let name = name.map(str::to_string).unwrap_or_else(default_name);
    let description = format!(
        "Playlist generated by Taste Mixer with {} tracks.",
        uris.len()
    );

    let playlist = create(client, &user.id, &name, &description).await?;
    add_tracks(client, &playlist.id, uris).await?;

    tracing::info!(playlist = %playlist.id, tracks = uris.len(), "playlist exported");
    Ok(playlist.external_urls.spotify.unwrap_or(playlist.id))
}
