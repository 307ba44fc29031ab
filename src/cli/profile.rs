use tabled::Table;

use crate::{
    cli::auth::{authenticated_client, client_config},
    error,
    spotify::profile,
    types::ProfileTableRow,
};

pub async fn me() {
    let config = client_config();
    let client = authenticated_client(&config);

    let user = match profile::get_user_profile(&client).await {
        Ok(user) => user,
        Err(e) => error!("Failed to load profile: {}", e),
    };

    let none = || "-".to_string();
    let rows = vec![
        ProfileTableRow {
            field: "id".to_string(),
            value: user.id,
        },
        ProfileTableRow {
            field: "name".to_string(),
            value: user.display_name.unwrap_or_else(none),
        },
        ProfileTableRow {
            field: "email".to_string(),
            value: user.email.unwrap_or_else(none),
        },
        ProfileTableRow {
            field: "country".to_string(),
            value: user.country.unwrap_or_else(none),
        },
        ProfileTableRow {
            field: "product".to_string(),
            value: user.product.unwrap_or_else(none),
        },
        ProfileTableRow {
            field: "url".to_string(),
            value: user.external_urls.spotify.unwrap_or_else(none),
        },
    ];
    println!("{}", Table::new(rows));
}
