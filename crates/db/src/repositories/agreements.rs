use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};
use vaulted_core::domain::agreement::{Agreement, AgreementId, AgreementStatus};
use vaulted_core::domain::quote::QuoteId;

use crate::repositories::RepositoryError;
use crate::DbPool;

#[async_trait]
pub trait AgreementStore: Send + Sync {
    async fn insert(&self, agreement: &Agreement) -> Result<(), RepositoryError>;
    async fn find_by_envelope(&self, envelope_id: &str) -> Result<Agreement, RepositoryError>;
    async fn latest_for_session(&self, session_id: &str) -> Result<Agreement, RepositoryError>;
    async fn mark_signed(
        &self,
        envelope_id: &str,
        signed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
    async fn mark_declined(&self, envelope_id: &str) -> Result<(), RepositoryError>;
}

pub struct SqlAgreementRepository {
    pool: DbPool,
}

impl SqlAgreementRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn agreement_from_row(row: &SqliteRow) -> Result<Agreement, RepositoryError> {
        let id: String = row.try_get("id")?;
        let session_id: String = row.try_get("session_id")?;
        let quote_id: String = row.try_get("quote_id")?;
        let applicant_name: String = row.try_get("applicant_name")?;
        let applicant_email: String = row.try_get("applicant_email")?;
        let envelope_id: String = row.try_get("envelope_id")?;
        let signing_url: String = row.try_get("signing_url")?;
        let status_label: String = row.try_get("status")?;
        let terms_version: String = row.try_get("terms_version")?;
        let accepted_at_text: String = row.try_get("accepted_at")?;
        let signed_at_text: Option<String> = row.try_get("signed_at")?;

        let status = AgreementStatus::from_label(&status_label).ok_or_else(|| {
            RepositoryError::Decode(format!("unknown agreement status `{status_label}`"))
        })?;

        Ok(Agreement {
            id: AgreementId(id),
            session_id,
            quote_id: QuoteId(quote_id),
            applicant_name,
            applicant_email,
            envelope_id,
            signing_url,
            status,
            terms_version,
            accepted_at: parse_timestamp("accepted_at", &accepted_at_text)?,
            signed_at: signed_at_text
                .map(|text| parse_timestamp("signed_at", &text))
                .transpose()?,
        })
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|error| {
            RepositoryError::Decode(format!("invalid timestamp for {field}: {error}"))
        })
}

const SELECT_AGREEMENT: &str = r#"
    SELECT
        id,
        session_id,
        quote_id,
        applicant_name,
        applicant_email,
        envelope_id,
        signing_url,
        status,
        terms_version,
        accepted_at,
        signed_at
    FROM agreement
"#;

#[async_trait]
impl AgreementStore for SqlAgreementRepository {
    async fn insert(&self, agreement: &Agreement) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO agreement (
                id,
                session_id,
                quote_id,
                applicant_name,
                applicant_email,
                envelope_id,
                signing_url,
                status,
                terms_version,
                accepted_at,
                signed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&agreement.id.0)
        .bind(&agreement.session_id)
        .bind(&agreement.quote_id.0)
        .bind(&agreement.applicant_name)
        .bind(&agreement.applicant_email)
        .bind(&agreement.envelope_id)
        .bind(&agreement.signing_url)
        .bind(agreement.status.as_str())
        .bind(&agreement.terms_version)
        .bind(agreement.accepted_at.to_rfc3339())
        .bind(agreement.signed_at.map(|timestamp| timestamp.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_envelope(&self, envelope_id: &str) -> Result<Agreement, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_AGREEMENT} WHERE envelope_id = ?"))
            .bind(envelope_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Self::agreement_from_row(&row)
    }

    async fn latest_for_session(&self, session_id: &str) -> Result<Agreement, RepositoryError> {
        let row = sqlx::query(&format!(
            "{SELECT_AGREEMENT} WHERE session_id = ? ORDER BY accepted_at DESC, id DESC LIMIT 1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Self::agreement_from_row(&row)
    }

    async fn mark_signed(
        &self,
        envelope_id: &str,
        signed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE agreement SET status = 'signed', signed_at = ? WHERE envelope_id = ?",
        )
        .bind(signed_at.to_rfc3339())
        .bind(envelope_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn mark_declined(&self, envelope_id: &str) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE agreement SET status = 'declined' WHERE envelope_id = ?")
                .bind(envelope_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// In-memory double for handler tests and development without a database.
#[derive(Default)]
pub struct InMemoryAgreementRepository {
    rows: Mutex<Vec<Agreement>>,
}

impl InMemoryAgreementRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AgreementStore for InMemoryAgreementRepository {
    async fn insert(&self, agreement: &Agreement) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().map_err(|_| {
            RepositoryError::Decode("in-memory agreement store lock poisoned".to_string())
        })?;
        rows.push(agreement.clone());
        Ok(())
    }

    async fn find_by_envelope(&self, envelope_id: &str) -> Result<Agreement, RepositoryError> {
        let rows = self.rows.lock().map_err(|_| {
            RepositoryError::Decode("in-memory agreement store lock poisoned".to_string())
        })?;
        rows.iter()
            .find(|agreement| agreement.envelope_id == envelope_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn latest_for_session(&self, session_id: &str) -> Result<Agreement, RepositoryError> {
        let rows = self.rows.lock().map_err(|_| {
            RepositoryError::Decode("in-memory agreement store lock poisoned".to_string())
        })?;
        rows.iter()
            .rev()
            .find(|agreement| agreement.session_id == session_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn mark_signed(
        &self,
        envelope_id: &str,
        signed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().map_err(|_| {
            RepositoryError::Decode("in-memory agreement store lock poisoned".to_string())
        })?;
        let agreement = rows
            .iter_mut()
            .find(|agreement| agreement.envelope_id == envelope_id)
            .ok_or(RepositoryError::NotFound)?;
        agreement.status = AgreementStatus::Signed;
        agreement.signed_at = Some(signed_at);
        Ok(())
    }

    async fn mark_declined(&self, envelope_id: &str) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock().map_err(|_| {
            RepositoryError::Decode("in-memory agreement store lock poisoned".to_string())
        })?;
        let agreement = rows
            .iter_mut()
            .find(|agreement| agreement.envelope_id == envelope_id)
            .ok_or(RepositoryError::NotFound)?;
        agreement.status = AgreementStatus::Declined;
        Ok(())
    }
}
