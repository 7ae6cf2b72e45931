//! Identity payload providers.
//!
//! The service authenticates an account with the signed init data of the
//! Telegram mini app. Producing it is out of the client's hands, so it sits
//! behind [`IdentityProvider`].

use anyhow::bail;

/// Trait for obtaining the identity payload of an account.
pub trait IdentityProvider {
    /// Returns the payload sent to the auth provider endpoint.
    ///
    /// # Arguments
    ///
    /// * `referral_code` - The referral code the payload is requested for, if any.
    async fn payload(&self, referral_code: Option<&str>) -> anyhow::Result<String>;
}

/// Serves a payload captured beforehand and stored in the configuration.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    query: String,
}

impl StaticIdentity {
    pub fn new(query: &str) -> Self {
        StaticIdentity {
            query: query.trim().to_owned(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    async fn payload(&self, _referral_code: Option<&str>) -> anyhow::Result<String> {
        if self.query.is_empty() {
            bail!("no identity payload configured");
        }
        Ok(self.query.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_identity() {
        let identity = StaticIdentity::new(" query_id=AAA&user=%7B%7D \n");

        assert_eq!(identity.payload(None).await.unwrap(), "query_id=AAA&user=%7B%7D");
        assert_eq!(
            identity.payload(Some("ref_abcd")).await.unwrap(),
            "query_id=AAA&user=%7B%7D"
        );
    }

    #[tokio::test]
    async fn test_static_identity_empty() {
        let identity = StaticIdentity::new("   ");
        assert!(identity.payload(None).await.is_err());
    }
}
