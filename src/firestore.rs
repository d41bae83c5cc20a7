//! Firestore REST client implementing [`DocumentStore`].
//!
//! Authentication uses a self-signed service-account JWT (RS256, key id from
//! the key file, audience fixed to the Firestore service), sent as a bearer
//! token on every request. The token is minted once at construction; a batch
//! run finishes well inside its one-hour validity.
//!
//! Writes go through `PATCH .../documents/{collection}/{document_id}` with
//! the record encoded into Firestore's typed value wire format. A PATCH
//! without an update mask replaces the whole document, which gives the
//! last-write-wins overwrite semantics the uploader relies on.
//!
//! The base URL can be overridden through the `FIRESTORE_BASE_URL`
//! environment variable (emulator and test use).

use crate::credentials::ServiceAccountKey;
use crate::store::{DocumentStore, StoreError};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, info};

const PROD_BASE_URL: &str = "https://firestore.googleapis.com";
const JWT_AUDIENCE: &str = "https://firestore.googleapis.com/";
const TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Environment variable overriding the Firestore endpoint.
pub const BASE_URL_ENV: &str = "FIRESTORE_BASE_URL";

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

pub struct FirestoreClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    bearer: String,
}

impl FirestoreClient {
    /// Constructs a client against the production endpoint, or against
    /// `FIRESTORE_BASE_URL` when set.
    pub fn new(key: &ServiceAccountKey) -> Result<Self, StoreError> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| PROD_BASE_URL.to_string());
        Self::with_base_url(key, base_url)
    }

    /// Constructs a client against an explicit endpoint.
    pub fn with_base_url(
        key: &ServiceAccountKey,
        base_url: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let bearer = mint_token(key)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(
            project_id = %key.project_id,
            client_email = %key.client_email,
            base_url = %base_url,
            "initialized Firestore client"
        );
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            project_id: key.project_id.clone(),
            bearer,
        })
    }

    fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url, self.project_id, collection, document_id
        )
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn put_document(
        &self,
        collection: &str,
        document_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let url = self.document_url(collection, document_id);
        let body = json!({ "fields": encode_fields(fields) });

        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.bearer)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(collection, document_id, "document written");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(collection, document_id, status = %status, "document store rejected write");
            Err(StoreError::Api { status, body })
        }
    }
}

/// Signs the service-account JWT used as the bearer token.
fn mint_token(key: &ServiceAccountKey) -> Result<String, StoreError> {
    let iat = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let claims = Claims {
        iss: &key.client_email,
        sub: &key.client_email,
        aud: JWT_AUDIENCE,
        iat,
        exp: iat + TOKEN_TTL.as_secs(),
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(key.private_key_id.clone());
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| StoreError::InvalidCredentials(e.to_string()))?;
    encode(&header, &claims, &encoding_key)
        .map_err(|e| StoreError::InvalidCredentials(e.to_string()))
}

/// Encodes a JSON object into Firestore's `fields` wire representation.
pub fn encode_fields(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            // Firestore carries 64-bit integers as strings on the wire.
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}
