//! Glue around the `openidconnect` crate.
//!
//! All of the hard parts of OIDC (token validation, nonce/state generation,
//! signature verification, JWKS handling) live in the library; this module
//! only configures the client, builds authorization redirects and exchanges
//! the returned code.

use openidconnect::{
    core::{
        CoreAuthenticationFlow, CoreClient, CoreIdToken, CoreIdTokenClaims, CoreProviderMetadata,
    },
    reqwest::async_http_client,
    AccessToken, AccessTokenHash, AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl,
    Nonce, OAuth2TokenResponse, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope,
    TokenResponse,
};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AuthError};

/// Session key for the pending login state.
pub const LOGIN_SESSION_KEY: &str = "oidc-probe.login";

/// State of a login that has been redirected to the identity provider but has
/// not returned yet. Round-trips through the session store.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginSession {
    nonce: Nonce,
    csrf_token: CsrfToken,
    pkce_verifier: PkceCodeVerifier,
}

/// OpenID Connect client configured for a single issuer.
#[derive(Clone)]
pub struct OidcClient {
    client: CoreClient,
    scopes: Vec<String>,
}

impl OidcClient {
    /// Create a client by fetching the issuer's
    /// `/.well-known/openid-configuration` document. The library validates
    /// that the advertised issuer matches the configured one.
    pub async fn discover(config: &Config) -> Result<Self, AuthError> {
        let provider_metadata = CoreProviderMetadata::discover_async(
            IssuerUrl::new(config.issuer.clone())?,
            async_http_client,
        )
        .await?;

        let client = CoreClient::from_provider_metadata(
            provider_metadata,
            ClientId::new(config.client_id.clone()),
            config.client_secret.clone().map(ClientSecret::new),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone())?);

        Ok(Self {
            client,
            scopes: config.scopes.clone(),
        })
    }

    /// Build an authorization redirect url and the matching pending login
    /// state. `extra_params` are appended verbatim to the authorization
    /// request query (used for the `tParams` test parameter).
    pub fn authorize_redirect(
        &self,
        extra_params: &[(&str, String)],
    ) -> (openidconnect::url::Url, LoginSession) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth = self
            .client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            // the test provider answers with a form_post response
            .add_extra_param("response_mode", "form_post");

        for scope in &self.scopes {
            auth = auth.add_scope(Scope::new(scope.clone()));
        }
        for (name, value) in extra_params {
            auth = auth.add_extra_param(*name, value.clone());
        }

        let (url, csrf_token, nonce) = auth.set_pkce_challenge(pkce_challenge).url();

        (
            url,
            LoginSession {
                nonce,
                csrf_token,
                pkce_verifier,
            },
        )
    }

    /// Exchange the authorization code for tokens and return the verified
    /// ID-token claims.
    pub async fn exchange(
        &self,
        login: &LoginSession,
        code: String,
        state: &str,
    ) -> Result<CoreIdTokenClaims, AuthError> {
        if login.csrf_token.secret() != state {
            return Err(AuthError::CsrfTokenInvalid);
        }

        tracing::debug!("exchanging authorization code");
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(
                login.pkce_verifier.secret().to_string(),
            ))
            .request_async(async_http_client)
            .await?;

        // Extract the ID token claims after verifying its authenticity and nonce.
        let id_token = token_response
            .id_token()
            .ok_or(AuthError::IdTokenMissing)?;
        let claims = id_token.claims(&self.client.id_token_verifier(), &login.nonce)?;

        validate_access_token_hash(id_token, token_response.access_token(), claims)?;

        Ok(claims.clone())
    }
}

/// Verify the access token hash to ensure that the access token hasn't been
/// substituted for another user's.
fn validate_access_token_hash(
    id_token: &CoreIdToken,
    access_token: &AccessToken,
    claims: &CoreIdTokenClaims,
) -> Result<(), AuthError> {
    if let Some(expected_access_token_hash) = claims.access_token_hash() {
        let actual_access_token_hash =
            AccessTokenHash::from_token(access_token, &id_token.signing_alg()?)?;
        if actual_access_token_hash == *expected_access_token_hash {
            Ok(())
        } else {
            Err(AuthError::AccessTokenHashInvalid)
        }
    } else {
        Ok(())
    }
}
