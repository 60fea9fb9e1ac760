//! In-memory registry of previously seen identity subjects.
//!
//! A login is a "registration" when the subject has never been seen before
//! and a "return of a known user" otherwise. Records live for the lifetime of
//! the process; nothing is updated, refreshed or expired.

use std::collections::HashMap;

use async_trait::async_trait;
use openidconnect::core::CoreIdTokenClaims;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::AuthError;

/// Profile claims of an authenticated identity, keyed by its stable subject
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub sub: String,
    pub issuer: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserProfile {
    /// Build a profile from ID-token claims that the OIDC client has already
    /// verified.
    pub fn from_claims(claims: &CoreIdTokenClaims) -> Self {
        Self {
            sub: claims.subject().as_str().to_string(),
            issuer: claims.issuer().as_str().to_string(),
            name: claims
                .name()
                .and_then(|name| name.get(None))
                .map(|name| name.as_str().to_string()),
            email: claims.email().map(|email| email.as_str().to_string()),
        }
    }
}

#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// Look up a record by subject. Absence is not an error.
    async fn find_by_subject(&self, sub: &str) -> Option<UserProfile>;

    /// Store a record for a first-time subject and return the stored record.
    /// When two logins of the same new subject race, the first write wins and
    /// both callers get the same record.
    async fn register(&self, profile: UserProfile) -> UserProfile;
}

/// Registry backed by a lock-guarded map.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    users: RwLock<HashMap<String, UserProfile>>,
}

#[async_trait]
impl UserRegistry for MemoryRegistry {
    async fn find_by_subject(&self, sub: &str) -> Option<UserProfile> {
        self.users.read().await.get(sub).cloned()
    }

    async fn register(&self, profile: UserProfile) -> UserProfile {
        let mut users = self.users.write().await;
        users
            .entry(profile.sub.clone())
            .or_insert(profile)
            .clone()
    }
}

/// Resolve verified claims to the registry record owning this session,
/// registering the subject on first sight.
pub async fn complete_login(
    registry: &dyn UserRegistry,
    claims: &CoreIdTokenClaims,
) -> Result<UserProfile, AuthError> {
    let sub = claims.subject().as_str();
    if sub.is_empty() {
        return Err(AuthError::MissingSubject);
    }

    if let Some(user) = registry.find_by_subject(sub).await {
        tracing::debug!(%sub, "returning user");
        return Ok(user);
    }

    tracing::info!(%sub, "registering new user");
    Ok(registry.register(UserProfile::from_claims(claims)).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use openidconnect::{
        Audience, EmptyAdditionalClaims, EndUserEmail, EndUserName, IssuerUrl, LocalizedClaim,
        StandardClaims, SubjectIdentifier,
    };

    use super::*;

    fn profile(sub: &str) -> UserProfile {
        UserProfile {
            sub: sub.to_string(),
            issuer: "https://issuer.example.com".to_string(),
            name: Some("John Doe".to_string()),
            email: Some("john.doe@example.com".to_string()),
        }
    }

    fn claims(sub: &str) -> CoreIdTokenClaims {
        let mut name = LocalizedClaim::new();
        name.insert(None, EndUserName::new("John Doe".to_string()));

        CoreIdTokenClaims::new(
            IssuerUrl::new("https://issuer.example.com".to_string()).unwrap(),
            vec![Audience::new("client-001".to_string())],
            Utc::now() + Duration::minutes(5),
            Utc::now(),
            StandardClaims::new(SubjectIdentifier::new(sub.to_string()))
                .set_name(Some(name))
                .set_email(Some(EndUserEmail::new("john.doe@example.com".to_string()))),
            EmptyAdditionalClaims {},
        )
    }

    #[tokio::test]
    async fn absent_before_first_login_present_after() {
        let registry = MemoryRegistry::default();
        assert_eq!(registry.find_by_subject("subject-1").await, None);

        registry.register(profile("subject-1")).await;
        assert_eq!(
            registry.find_by_subject("subject-1").await,
            Some(profile("subject-1"))
        );
        assert_eq!(registry.find_by_subject("subject-2").await, None);
    }

    #[tokio::test]
    async fn sequential_logins_keep_a_single_record() {
        let registry = MemoryRegistry::default();

        let first = complete_login(&registry, &claims("subject-1")).await.unwrap();
        let second = complete_login(&registry, &claims("subject-1")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.sub, "subject-1");
        assert_eq!(first.name.as_deref(), Some("John Doe"));
        assert_eq!(first.email.as_deref(), Some("john.doe@example.com"));
    }

    #[tokio::test]
    async fn concurrent_registration_does_not_duplicate() {
        let registry = Arc::new(MemoryRegistry::default());

        let tasks = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.register(profile("subject-1")).await })
            })
            .collect::<Vec<_>>();

        for task in tasks {
            assert_eq!(task.await.unwrap(), profile("subject-1"));
        }
        assert_eq!(registry.users.read().await.len(), 1);
    }

    #[tokio::test]
    async fn empty_subject_aborts_the_login() {
        let registry = MemoryRegistry::default();
        let result = complete_login(&registry, &claims("")).await;
        assert!(matches!(result, Err(AuthError::MissingSubject)));
        assert!(registry.users.read().await.is_empty());
    }
}
