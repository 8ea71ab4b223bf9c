use async_trait::async_trait;
use uuid::Uuid;

use crate::traits::{IdentityError, IdentityProvider, Session};

/// Issues a random anonymous user id without contacting any service.
///
/// Used with the memory and local stores, which do not authorize requests.
#[derive(Debug, Default, Clone)]
pub struct LocalAnonymousIdentity;

impl LocalAnonymousIdentity {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityProvider for LocalAnonymousIdentity {
    async fn sign_in(&self) -> Result<Session, IdentityError> {
        Ok(Session {
            user_id: Uuid::new_v4().to_string(),
            id_token: None,
            refresh_token: None,
            expires_at: None,
            anonymous: true,
        })
    }

    fn provider_name(&self) -> &'static str {
        "local-anonymous"
    }
}
