use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with the given user agent and an optional overall
/// request timeout. Certificate verification stays enabled.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client(user_agent: &str, timeout: Option<Duration>) -> reqwest::Result<Client> {
    let builder = Client::builder()
        .user_agent(user_agent)
        .danger_accept_invalid_certs(false);

    match timeout {
        Some(timeout) => builder.timeout(timeout).connect_timeout(timeout).build(),
        None => builder.build(),
    }
}
