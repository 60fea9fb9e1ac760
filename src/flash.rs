//! One-shot flashed messages, stored in the session and consumed by the next
//! render of the landing page.

use tower_sessions::{session::Error, Session};

const FLASH_KEY: &str = "oidc-probe.flash";

pub async fn set(session: &Session, message: impl Into<String>) -> Result<(), Error> {
    session.insert(FLASH_KEY, message.into()).await
}

/// Read and clear the flashed message, if any.
pub async fn take(session: &Session) -> Result<Option<String>, Error> {
    session.remove::<String>(FLASH_KEY).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::{MemoryStore, Session};

    use super::*;

    #[tokio::test]
    async fn message_is_consumed_on_first_take() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        assert_eq!(take(&session).await.unwrap(), None);

        set(&session, "login failed").await.unwrap();
        assert_eq!(
            take(&session).await.unwrap().as_deref(),
            Some("login failed")
        );
        assert_eq!(take(&session).await.unwrap(), None);
    }
}
