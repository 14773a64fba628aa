//! Implicit-grant login: the authorize URL the user opens in a browser.
//!
//! Spotify redirects back to the configured redirect URI with the token in
//! the URL fragment (`#access_token=...&token_type=Bearer&expires_in=3600`).
//! The terminal never sees that navigation, so the user hands the redirect
//! URL over on the command line or in the login prompt.

use crate::config::Config;

pub const SCOPES: &str = "playlist-modify-public playlist-modify-private user-read-private";

const RESPONSE_TYPE: &str = "token";

pub fn authorize_url(config: &Config) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type={}&scope={}",
        config.auth_endpoint,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        RESPONSE_TYPE,
        urlencoding::encode(SCOPES),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_parameters() {
        let url = authorize_url(&Config::default());
        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(url.contains("client_id=5618e6d9904642caabe20dcb8772baeb"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000"));
        assert!(url.contains("response_type=token"));
        assert!(url.contains(
            "scope=playlist-modify-public%20playlist-modify-private%20user-read-private"
        ));
    }
}
