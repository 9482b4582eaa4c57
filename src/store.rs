use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::given_name::GivenName;
use crate::domain::subscriber::Subscriber;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_id::SubscriberId;
use crate::domain::subscriber_status::SubscriberStatus;

// Postgres error code for violating a unique constraint.
const UNIQUE_VIOLATION: &str = "23505";

/// Persistence layer for subscriber records. Every operation is a single
/// database round trip; existence is verified from the write result rather
/// than with a separate lookup.
pub struct SubscriberStore {
    db_pool: PgPool,
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("A subscriber with the same email or id already exists.")]
    Conflict(#[source] sqlx::Error),
    #[error("Subscriber does not exist.")]
    NotFound,
    #[error("Stored subscriber row has an unexpected shape: {0}")]
    MalformedRecord(String),
    #[error("Failed to execute the query.")]
    Database(#[source] sqlx::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl SubscriberStore {
    pub fn new(db_pool: PgPool) -> SubscriberStore {
        SubscriberStore { db_pool }
    }

    #[tracing::instrument(
        name = "Insert a new subscriber into the database",
        skip(self, subscriber),
        fields(subscriber_id = %subscriber.subscriber_id.as_ref())
    )]
    pub async fn create(&self, subscriber: &Subscriber) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO subscribers (subscriber_id, email, given_name, status, created, updated, ttl)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(subscriber.subscriber_id.as_ref())
        .bind(subscriber.email.as_ref())
        .bind(subscriber.given_name.as_ref())
        .bind(subscriber.status.as_ref())
        .bind(subscriber.created)
        .bind(subscriber.updated)
        .bind(subscriber.ttl)
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            into_store_error(err)
        })?;

        Ok(())
    }

    #[tracing::instrument(
        name = "Fetch a subscriber from the database",
        skip(self),
        fields(subscriber_id = %subscriber_id.as_ref())
    )]
    pub async fn get(
        &self,
        subscriber_id: &SubscriberId,
    ) -> Result<Option<Subscriber>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT subscriber_id, email, given_name, status, created, updated, ttl
            FROM subscribers
            WHERE subscriber_id = $1
            "#,
        )
        .bind(subscriber_id.as_ref())
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::Database(err)
        })?;

        row.map(|row| subscriber_from_row(&row)).transpose()
    }

    #[tracing::instrument(
        name = "Update a subscriber status in the database",
        skip(self),
        fields(
            subscriber_id = %subscriber_id.as_ref(),
            new_status = %new_status
        )
    )]
    pub async fn update_status(
        &self,
        subscriber_id: &SubscriberId,
        new_status: SubscriberStatus,
    ) -> Result<Subscriber, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE subscribers
            SET status = $2, updated = $3
            WHERE subscriber_id = $1
            RETURNING subscriber_id, email, given_name, status, created, updated, ttl
            "#,
        )
        .bind(subscriber_id.as_ref())
        .bind(new_status.as_ref())
        .bind(Utc::now())
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::Database(err)
        })?;

        match row {
            Some(row) => subscriber_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }

    #[tracing::instrument(
        name = "Delete a subscriber from the database",
        skip(self),
        fields(subscriber_id = %subscriber_id.as_ref())
    )]
    pub async fn delete(&self, subscriber_id: &SubscriberId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE subscriber_id = $1")
            .bind(subscriber_id.as_ref())
            .execute(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                StoreError::Database(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

fn into_store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::Conflict(err);
        }
    }

    StoreError::Database(err)
}

// The table shape drifted more than once while the service was alive, so
// decoding refuses to coerce: any column that does not match the declared
// schema version surfaces as MalformedRecord.
fn subscriber_from_row(row: &PgRow) -> Result<Subscriber, StoreError> {
    let subscriber_id: String = try_column(row, "subscriber_id")?;
    let email: String = try_column(row, "email")?;
    let given_name: String = try_column(row, "given_name")?;
    let status: String = try_column(row, "status")?;

    Ok(Subscriber {
        subscriber_id: SubscriberId::parse(subscriber_id).map_err(StoreError::MalformedRecord)?,
        email: SubscriberEmail::parse(email).map_err(StoreError::MalformedRecord)?,
        given_name: GivenName::parse(given_name).map_err(StoreError::MalformedRecord)?,
        status: SubscriberStatus::parse(status).map_err(StoreError::MalformedRecord)?,
        created: try_column(row, "created")?,
        updated: try_column(row, "updated")?,
        ttl: try_column(row, "ttl")?,
    })
}

fn try_column<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|err| StoreError::MalformedRecord(format!("column {}: {}", column, err)))
}
