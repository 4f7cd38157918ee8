use std::path::Path;

use anyhow::{bail, Context};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::config::Credentials;

pub const ANALYTICS_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: Duration = Duration::hours(1);
const REFRESH_MARGIN: Duration = Duration::seconds(60);

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Inline JSON first, then the key file.
    pub fn load(credentials: &Credentials) -> anyhow::Result<Self> {
        if let Some(json) = &credentials.inline_json {
            match serde_json::from_str(json) {
                Ok(key) => return Ok(key),
                Err(e) => error!(error = %e, "GOOGLE_APPLICATION_CREDENTIALS_JSON is not a valid key"),
            }
        }
        Self::from_file(&credentials.key_file)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading credentials file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing credentials file {}", path.display()))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

struct CachedToken {
    value: String,
    expires_at: OffsetDateTime,
}

pub struct TokenProvider {
    http: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, key: ServiceAccountKey) -> anyhow::Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("service account private_key is not an RSA PEM key")?;
        Ok(Self { http, key, encoding_key, cached: Mutex::new(None) })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub async fn access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.cached.lock().await;
        let now = OffsetDateTime::now_utc();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - REFRESH_MARGIN > now {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.signed_assertion(now)?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT)
            .append_pair("assertion", &assertion)
            .finish();
        let res = self
            .http
            .post(&self.key.token_uri)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .context("token exchange request failed")?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            bail!("token exchange rejected ({}): {}", status.as_u16(), body.trim());
        }
        let token: TokenResponse = res.json().await.context("decoding token response")?;

        debug!(client_email = %self.key.client_email, expires_in = token.expires_in, "obtained access token");
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        });
        Ok(value)
    }

    fn signed_assertion(&self, now: OffsetDateTime) -> anyhow::Result<String> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: ANALYTICS_SCOPE,
            aud: &self.key.token_uri,
            iat: now.unix_timestamp(),
            exp: (now + ASSERTION_LIFETIME).unix_timestamp(),
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key).context("signing token assertion")
    }
}
