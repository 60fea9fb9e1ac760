#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod flash;
pub mod oidc;
pub mod registry;
pub mod routes;
pub mod tparams;
mod views;

use tower_sessions::{
    cookie::{time::Duration, SameSite},
    Expiry, MemoryStore, SessionManagerLayer,
};

pub use config::Config;
pub use oidc::OidcClient;
pub use registry::{MemoryRegistry, UserProfile, UserRegistry};
pub use routes::AppState;

/// Assemble the application router with its session layer.
///
/// Sessions live in memory, like the user registry: both are lost on restart,
/// which is fine for a sample application talking to a test identity provider.
pub fn app(state: AppState) -> axum::Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(120)));

    routes::router(state).layer(session_layer)
}
