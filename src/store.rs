use crate::db_types::CallRecord;
use crate::error::StoreError;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::{debug, error, info};

/// Somewhere finished call records go.
#[async_trait]
pub trait CallStore: Send + Sync {
    async fn insert(&self, record: &CallRecord) -> Result<(), StoreError>;
}

/// Direct Postgres connection.
#[derive(Clone)]
pub struct PgCallStore {
    pool: Pool<Postgres>,
}

impl PgCallStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| {
                error!(error=%e, "failed to connect to database");
                StoreError::Database(e)
            })?;
        sqlx::migrate!().run(&pool).await?;
        info!("connected to postgres and applied migrations");
        Ok(Self { pool })
    }
}

#[async_trait]
impl CallStore for PgCallStore {
    async fn insert(&self, record: &CallRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            insert into vapi_call (
              created_at,
              caller_name,
              phone_number,
              "order",
              quantity,
              business_name,
              call_length,
              raw_transcript
            ) values (
              $1,
              $2,
              $3,
              $4,
              $5,
              $6,
              $7,
              $8
            )
            "#,
        )
        .bind(record.created_at)
        .bind(&record.extraction.caller_name)
        .bind(&record.extraction.phone_number)
        .bind(&record.extraction.order)
        .bind(record.extraction.quantity)
        .bind(&record.business_name)
        .bind(record.call_length)
        .bind(&record.raw_transcript)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(error=%e, "failed to insert vapi_call row");
            StoreError::Database(e)
        })?;
        Ok(())
    }
}

/// Hosted Postgres reached through its PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    http_client: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

#[derive(Deserialize)]
struct PostgrestError {
    message: String,
}

impl SupabaseStore {
    pub fn new(http_client: reqwest::Client, base_url: &str, service_role_key: String) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key,
        }
    }
}

#[async_trait]
impl CallStore for SupabaseStore {
    async fn insert(&self, record: &CallRecord) -> Result<(), StoreError> {
        let url = format!("{}/rest/v1/vapi_call", self.base_url);
        let resp = self
            .http_client
            .post(url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await
            .map_err(|e| {
                error!(error=%e, "failed to send insert to supabase");
                StoreError::Request(e)
            })?;

        let status = resp.status();
        if status.is_success() {
            debug!(status=%status, "supabase insert accepted");
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PostgrestError>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        error!(status=%status, message=%message, "supabase rejected insert");
        Err(StoreError::Rejected(message))
    }
}
