//! Verification of tokens issued by an external identity provider.
//!
//! Signing keys are fetched from the provider's JWKS endpoint and cached for
//! a configurable TTL. Only RS256 is accepted.

use chrono::Utc;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

const JWKS_SUFFIX: &str = "jwks.json";
const WELL_KNOWN_PATH: &str = "/.well-known/jwks.json";
const FETCH_TIMEOUT_SECS: u64 = 5;
const MIN_REFETCH_INTERVAL_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("Failed to fetch signing keys: {0}")]
    KeyFetchError(String),

    #[error("Invalid token format")]
    InvalidTokenFormat,

    #[error("Key not found for kid: {0}")]
    KeyNotFound(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token validation failed: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    /// RSA modulus (base64url encoded)
    n: String,
    /// RSA exponent (base64url encoded)
    e: String,
}

/// Claims this service reads from external tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub email: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: i64,
}

impl CachedKeys {
    fn find(&self, kid: &str) -> Option<Jwk> {
        self.keys.keys.iter().find(|k| k.kid == kid).cloned()
    }
}

/// JWKS client with a TTL cache, held once in application state.
pub struct JwksVerifier {
    http_client: reqwest::Client,
    url: String,
    cache_ttl_secs: i64,
    cache: RwLock<Option<CachedKeys>>,
}

impl std::fmt::Debug for JwksVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksVerifier")
            .field("url", &self.url)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish()
    }
}

impl JwksVerifier {
    /// `issuer_url` may be the key set URL itself or the issuer base URL.
    pub fn new(issuer_url: &str, cache_ttl_secs: u64) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            url: jwks_endpoint(issuer_url),
            cache_ttl_secs: i64::try_from(cache_ttl_secs).unwrap_or(i64::MAX),
            cache: RwLock::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Verifies an RS256 token against the provider's keys.
    pub async fn verify(&self, token: &str) -> Result<ExternalClaims, JwksError> {
        let header = decode_header(token).map_err(|_| JwksError::InvalidTokenFormat)?;
        if header.alg != Algorithm::RS256 {
            return Err(JwksError::InvalidTokenFormat);
        }
        let kid = header.kid.ok_or(JwksError::InvalidTokenFormat)?;

        let jwk = self.get_jwk(&kid).await?;
        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| JwksError::ValidationError(format!("Invalid key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        let token_data = decode::<ExternalClaims>(token, &decoding_key, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwksError::TokenExpired,
                _ => JwksError::ValidationError(e.to_string()),
            },
        )?;

        Ok(token_data.claims)
    }

    async fn get_jwk(&self, kid: &str) -> Result<Jwk, JwksError> {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                let age = Utc::now().timestamp() - cached.fetched_at;
                if age < self.cache_ttl_secs {
                    if let Some(jwk) = cached.find(kid) {
                        return Ok(jwk);
                    }
                    // Unknown kids refetch at most once per interval
                    if age < MIN_REFETCH_INTERVAL_SECS {
                        return Err(JwksError::KeyNotFound(kid.to_string()));
                    }
                }
            }
        }

        let keys = self.fetch_keys().await?;
        let cached = CachedKeys {
            keys,
            fetched_at: Utc::now().timestamp(),
        };
        let jwk = cached.find(kid);
        *self.cache.write().await = Some(cached);

        jwk.ok_or_else(|| JwksError::KeyNotFound(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<JwkSet, JwksError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| JwksError::KeyFetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JwksError::KeyFetchError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| JwksError::KeyFetchError(e.to_string()))?;

        tracing::debug!(url = %self.url, key_count = keys.keys.len(), "Fetched JWKS");
        Ok(keys)
    }
}

fn jwks_endpoint(issuer_url: &str) -> String {
    let url = issuer_url.trim();
    if url.ends_with(JWKS_SUFFIX) {
        url.to_string()
    } else {
        format!("{}{}", url.trim_end_matches('/'), WELL_KNOWN_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwks_endpoint() {
        assert_eq!(
            jwks_endpoint("https://auth.example.com"),
            "https://auth.example.com/.well-known/jwks.json"
        );
        assert_eq!(
            jwks_endpoint("https://auth.example.com/"),
            "https://auth.example.com/.well-known/jwks.json"
        );
        assert_eq!(
            jwks_endpoint("https://auth.example.com/keys/jwks.json"),
            "https://auth.example.com/keys/jwks.json"
        );
    }

    #[tokio::test]
    async fn test_rejects_non_rs256_tokens() {
        let verifier = JwksVerifier::new("http://127.0.0.1:1", 60);
        let jwt = shared::jwt::JwtConfig::new("an-hs256-secret-that-is-32-bytes!!", 60, 0).unwrap();
        let (token, _) = jwt.generate_access_token(uuid::Uuid::new_v4()).unwrap();

        assert!(matches!(
            verifier.verify(&token).await,
            Err(JwksError::InvalidTokenFormat)
        ));
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let verifier = JwksVerifier::new("http://127.0.0.1:1", 60);
        assert!(matches!(
            verifier.verify("not-a-jwt").await,
            Err(JwksError::InvalidTokenFormat)
        ));
    }

    async fn seed_cache(verifier: &JwksVerifier, kid: &str, fetched_at: i64) {
        *verifier.cache.write().await = Some(CachedKeys {
            keys: JwkSet {
                keys: vec![Jwk {
                    kid: kid.to_string(),
                    n: "modulus".into(),
                    e: "AQAB".into(),
                }],
            },
            fetched_at,
        });
    }

    #[tokio::test]
    async fn test_cached_key_is_reused() {
        let verifier = JwksVerifier::new("http://127.0.0.1:1", 3600);
        seed_cache(&verifier, "known", Utc::now().timestamp()).await;

        assert_eq!(verifier.get_jwk("known").await.unwrap().kid, "known");
    }

    #[tokio::test]
    async fn test_unknown_kid_does_not_refetch_fresh_cache() {
        // The endpoint is unreachable, so any refetch would surface as a fetch error
        let verifier = JwksVerifier::new("http://127.0.0.1:1", 3600);
        seed_cache(&verifier, "known", Utc::now().timestamp()).await;

        for _ in 0..3 {
            assert!(matches!(
                verifier.get_jwk("rotated").await,
                Err(JwksError::KeyNotFound(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_unknown_kid_refetches_after_interval() {
        let verifier = JwksVerifier::new("http://127.0.0.1:1", 3600);
        let stale = Utc::now().timestamp() - MIN_REFETCH_INTERVAL_SECS - 1;
        seed_cache(&verifier, "known", stale).await;

        assert!(matches!(
            verifier.get_jwk("rotated").await,
            Err(JwksError::KeyFetchError(_))
        ));
    }

    #[test]
    fn test_error_display() {
        assert!(JwksError::KeyNotFound("abc".into()).to_string().contains("abc"));
        assert!(JwksError::TokenExpired.to_string().contains("expired"));
    }
}
