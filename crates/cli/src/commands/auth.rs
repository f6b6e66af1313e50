//! Login command.

use pasarku_core::Claims;
use pasarku_storefront::api::{ApiError, PasarkuClient};

/// Log in and print the token with the identity it carries.
///
/// # Errors
///
/// Returns an error if the backend rejects the credentials.
#[allow(clippy::print_stdout)]
pub async fn login(client: &PasarkuClient, email: &str, password: &str) -> Result<(), ApiError> {
    tracing::info!("Logging in as {email}");
    let response = client.login(email, password).await?;

    match Claims::decode_unverified(&response.token) {
        Ok(claims) => tracing::info!(
            uid = %claims.uid,
            role = %claims.role(),
            "Logged in as {}",
            claims.display_name()
        ),
        Err(e) => tracing::warn!(error = %e, "Token payload could not be read"),
    }

    println!("{}", response.token);
    Ok(())
}
