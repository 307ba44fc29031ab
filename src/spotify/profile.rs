use crate::{
    error::AuthError,
    management::KeyValueStore,
    spotify::{
        client::{AuthenticatedClient, RequestOptions},
        exchange::TokenExchanger,
    },
    types::UserProfile,
};

/// Fetches the signed-in user's profile (`GET /me`).
pub async fn get_user_profile<E, S>(
    client: &AuthenticatedClient<E, S>,
) -> Result<UserProfile, AuthError>
where
    E: TokenExchanger,
    S: KeyValueStore,
{
    client.request("/me", RequestOptions::get()).await?.decode()
}
