//! Google OAuth token acquisition
//!
//! Two modes, chosen by the credential's `auth.mode` parameter:
//! - `jwt`: a service-account key signs an RS256 assertion which is exchanged
//!   for an access token without user interaction
//! - `oauth2`: an installed-application client secret; the user authorises
//!   once in a browser and the token is cached per collector instance

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Scopes requested for every token
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/analytics",
    "https://www.googleapis.com/auth/analytics.readonly",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// tokens this close to expiry are treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid key file: {0}")]
    KeyFile(#[from] serde_json::Error),

    #[error("Invalid private key: {0}")]
    PrivateKey(String),

    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Token cache {path}: {cause}")]
    Cache { path: String, cause: String },

    #[error("Unable to read the authorization code: {0}")]
    Prompt(std::io::Error),
}

/// Authentication mode named by `auth.mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Jwt,
    OAuth2,
}

impl AuthMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "jwt" => Some(AuthMode::Jwt),
            "oauth2" => Some(AuthMode::OAuth2),
            _ => None,
        }
    }
}

/// OAuth access token as cached on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Token {
    /// Tokens without an expiry never expire
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry <= now + Duration::seconds(EXPIRY_MARGIN_SECS))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    // refresh responses usually omit the refresh token; keep the one we had
    fn into_token(self, previous_refresh: Option<String>) -> Token {
        Token {
            access_token: self.access_token,
            token_type: self.token_type,
            refresh_token: self.refresh_token.or(previous_refresh),
            expiry: self
                .expires_in
                .map(|seconds| Utc::now() + Duration::seconds(seconds)),
        }
    }
}

async fn request_token(
    http: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    log::debug!("Requesting access token from {}", token_uri);

    let response = http
        .post(token_uri)
        .header("Accept", "application/json")
        .form(form)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(AuthError::Rejected { status, body });
    }

    Ok(response.json().await?)
}

/// Service-account key file as downloaded from the Google console
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(contents: &str) -> Result<Self, AuthError> {
        Ok(serde_json::from_str(contents)?)
    }
}

fn pem_to_der(pem: &str) -> Result<Vec<u8>, AuthError> {
    let body: String = pem
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect();
    if body.is_empty() {
        return Err(AuthError::PrivateKey("no PEM body found".to_string()));
    }
    STANDARD
        .decode(body)
        .map_err(|e| AuthError::PrivateKey(e.to_string()))
}

/// Build the signed JWT assertion for a service account
pub fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, AuthError> {
    use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};

    let der = pem_to_der(&key.private_key)?;
    let key_pair =
        RsaKeyPair::from_pkcs8(&der).map_err(|e| AuthError::PrivateKey(e.to_string()))?;

    let mut header = serde_json::json!({"alg": "RS256", "typ": "JWT"});
    if let Some(kid) = &key.private_key_id {
        header["kid"] = serde_json::Value::String(kid.clone());
    }
    let claims = serde_json::json!({
        "iss": key.client_email,
        "scope": SCOPES.join(" "),
        "aud": key.token_uri,
        "iat": now.timestamp(),
        "exp": now.timestamp() + ASSERTION_LIFETIME_SECS,
    });

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    );

    let rng = ring::rand::SystemRandom::new();
    let mut signature = vec![0u8; key_pair.public().modulus_len()];
    key_pair
        .sign(&RSA_PKCS1_SHA256, &rng, signing_input.as_bytes(), &mut signature)
        .map_err(|_| AuthError::PrivateKey("signing failed".to_string()))?;

    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

/// Exchange a signed assertion for an access token
pub async fn service_account_token(
    http: &reqwest::Client,
    key: &ServiceAccountKey,
) -> Result<Token, AuthError> {
    let assertion = sign_assertion(key, Utc::now())?;
    let response = request_token(
        http,
        &key.token_uri,
        &[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)],
    )
    .await?;
    log::debug!("Service account token issued for {}", key.client_email);
    Ok(response.into_token(None))
}

/// OAuth client of an installed application
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    /// Parse a client secret file with an `installed` or `web` section
    pub fn from_json(contents: &str) -> Result<Self, AuthError> {
        let file: ClientSecretFile = serde_json::from_str(contents)?;
        file.installed.or(file.web).ok_or_else(|| {
            AuthError::KeyFile(serde::de::Error::custom(
                "expected an 'installed' or 'web' client section",
            ))
        })
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(OOB_REDIRECT_URI)
    }

    /// Consent page URL requesting offline access
    pub fn auth_code_url(&self, state: &str) -> Result<reqwest::Url, AuthError> {
        let scope = SCOPES.join(" ");
        reqwest::Url::parse_with_params(
            &self.auth_uri,
            &[
                ("access_type", "offline"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| AuthError::KeyFile(serde::de::Error::custom(format!("auth_uri: {}", e))))
    }

    pub async fn exchange_code(
        &self,
        http: &reqwest::Client,
        code: &str,
    ) -> Result<Token, AuthError> {
        let response = request_token(
            http,
            &self.token_uri,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
                ("redirect_uri", self.redirect_uri()),
            ],
        )
        .await?;
        Ok(response.into_token(None))
    }

    pub async fn refresh(
        &self,
        http: &reqwest::Client,
        refresh_token: &str,
    ) -> Result<Token, AuthError> {
        let response = request_token(
            http,
            &self.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ],
        )
        .await?;
        Ok(response.into_token(Some(refresh_token.to_string())))
    }
}

/// On-disk token cache for one collector instance
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// `~/.pickman/google/credentials`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".pickman").join("google").join("credentials"))
    }

    /// Cache file named after the URL-escaped instance name
    pub fn for_instance(dir: &Path, instance_name: &str) -> Self {
        let file_name = urlencoding::encode(&format!("{}.json", instance_name)).into_owned();
        Self {
            path: dir.join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Token, AuthError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        serde_json::from_str(&contents).map_err(|e| self.error(e))
    }

    pub fn save(&self, token: &Token) -> Result<(), AuthError> {
        log::info!("Saving credential file to: {}", self.path.display());

        if let Some(dir) = self.path.parent() {
            create_private_dir(dir).map_err(|e| self.error(e))?;
        }
        let contents = serde_json::to_string(token).map_err(|e| self.error(e))?;
        write_private_file(&self.path, &contents).map_err(|e| self.error(e))
    }

    fn error(&self, cause: impl std::fmt::Display) -> AuthError {
        AuthError::Cache {
            path: self.path.display().to_string(),
            cause: cause.to_string(),
        }
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?
        .write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

/// Token for an installed application, using the cache when possible
///
/// Order: valid cached token, refreshed cached token, interactive
/// authorisation. A token obtained from the network is written back to the
/// cache; failing to write it is logged but not fatal.
pub async fn installed_app_token(
    http: &reqwest::Client,
    secret: &ClientSecret,
    cache: &TokenCache,
) -> Result<Token, AuthError> {
    match cache.load() {
        Ok(token) if !token.is_expired(Utc::now()) => return Ok(token),
        Ok(token) => {
            if let Some(refresh_token) = token.refresh_token.as_deref() {
                match secret.refresh(http, refresh_token).await {
                    Ok(fresh) => {
                        store(cache, &fresh);
                        return Ok(fresh);
                    }
                    Err(e) => log::warn!("Refreshing cached token failed: {}", e),
                }
            }
        }
        Err(e) => log::debug!("No usable cached token: {}", e),
    }

    let token = token_from_web(http, secret).await?;
    store(cache, &token);
    Ok(token)
}

fn store(cache: &TokenCache, token: &Token) {
    if let Err(e) = cache.save(token) {
        log::warn!("Unable to cache oauth token: {}", e);
    }
}

async fn token_from_web(
    http: &reqwest::Client,
    secret: &ClientSecret,
) -> Result<Token, AuthError> {
    // the stdin lock is released before awaiting
    let code = prompt_for_code(secret, &mut std::io::stdin().lock())?;
    secret.exchange_code(http, &code).await
}

/// Point the user at the consent page and read the code they paste back
fn prompt_for_code(secret: &ClientSecret, input: &mut impl BufRead) -> Result<String, AuthError> {
    let url = secret.auth_code_url("state-token")?;
    log::info!(
        "Go to the following link in your browser then type the authorization code: {}",
        url
    );
    read_authorization_code(input)
}

fn read_authorization_code(input: &mut impl BufRead) -> Result<String, AuthError> {
    let mut line = String::new();
    input.read_line(&mut line).map_err(AuthError::Prompt)?;
    let code = line.trim();
    if code.is_empty() {
        return Err(AuthError::Prompt(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "no authorization code entered",
        )));
    }
    Ok(code.to_string())
}
