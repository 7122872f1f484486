//! Autenticação por conta de serviço (OAuth2 JWT bearer)
//!
//! A conta de serviço assina uma asserção RS256 com a chave privada do arquivo
//! de credenciais e a troca por um access token no `token_uri`. O token fica em
//! cache até um minuto antes de expirar.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;

use crate::error::{Result, SheetsError};

/// Escopo de leitura e escrita de planilhas
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECONDS: i64 = 3600;
const EXPIRY_MARGIN_SECONDS: i64 = 60;

/// Conteúdo relevante do JSON de credenciais baixado do console do Google Cloud
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_TTL_SECONDS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECONDS) < self.expires_at
    }
}

/// Provedor de access tokens para uma conta de serviço
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scopes: Vec<String>,
    http_client: reqwest::Client,
    cache: RwLock<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Carrega o arquivo JSON de credenciais
    pub fn from_file(path: impl AsRef<Path>, scopes: &[&str]) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)?;
        Self::from_key(key, scopes)
    }

    /// Cria a partir de uma chave já carregada
    ///
    /// A chave privada é validada aqui para que credenciais corrompidas
    /// falhem na inicialização e não no primeiro acesso à planilha.
    pub fn from_key(key: ServiceAccountKey, scopes: &[&str]) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsError::AuthError(format!("chave privada inválida: {}", e)))?;

        tracing::info!(
            "🔑 Conta de serviço carregada: {} (projeto: {})",
            key.client_email,
            key.project_id.as_deref().unwrap_or("desconhecido")
        );

        Ok(Self {
            key,
            encoding_key,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            http_client: reqwest::Client::new(),
            cache: RwLock::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Obtém um access token válido (cache → troca de asserção)
    pub async fn access_token(&self) -> Result<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_fresh(Utc::now()) {
                    return Ok(cached.token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;
        // Outra task pode ter renovado enquanto esperávamos o lock
        if let Some(cached) = cache.as_ref() {
            if cached.is_fresh(Utc::now()) {
                return Ok(cached.token.clone());
            }
        }

        tracing::debug!("🔄 Renovando access token da conta de serviço");
        let fresh = self.exchange_assertion().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: self.scopes.join(" "),
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_TTL_SECONDS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SheetsError::AuthError(format!("falha ao assinar asserção JWT: {}", e)))
    }

    async fn exchange_assertion(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.signed_assertion(now)?;

        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!("❌ Troca de token recusada ({}): {}", status.as_u16(), body);
            return Err(SheetsError::AuthError(format!(
                "token endpoint respondeu {}: {}",
                status.as_u16(),
                body
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)?;
        Ok(CachedToken {
            token: parsed.access_token,
            expires_at: now + Duration::seconds(parsed.expires_in),
        })
    }
}

impl std::fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("client_email", &self.key.client_email)
            .field("scopes", &self.scopes)
            .finish()
    }
}
