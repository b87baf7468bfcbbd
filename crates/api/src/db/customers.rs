//! `PostgreSQL` customer repository.
//!
//! Queries are plain parameterized statements against the `customers`
//! table. Email uniqueness comes from the `customers_email_key` index; a
//! unique violation is reported as `RepositoryError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use customers_core::{Customer, CustomerId, CustomerPatch, Email, NewCustomer, PageRequest};

use super::{CustomerRepository, RepositoryError};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, address, country, region, postal_zip, \
                                numberrange, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    name: String,
    email: String,
    phone: String,
    address: String,
    country: String,
    region: Option<String>,
    postal_zip: Option<String>,
    numberrange: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid email in database for customer {}: {e}",
                row.id
            ))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            address: row.address,
            country: row.country,
            region: row.region,
            postal_zip: row.postal_zip,
            numberrange: row.numberrange,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map a unique violation on the email index to a conflict.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("email already exists".to_owned());
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
#[derive(Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    /// Create a new customer repository over an open pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn count(&self) -> Result<u64, RepositoryError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative row count {total}")))
    }

    #[instrument(skip(self), fields(page = request.page(), size = request.size()))]
    async fn list(&self, request: PageRequest) -> Result<Vec<Customer>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(request.limit())
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Fetched customer page");
        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name_key: &str) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE LOWER(name) = $1 ORDER BY id ASC LIMIT 1"
        ))
        .bind(name_key)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self, customer), fields(email = %customer.email))]
    async fn insert(&self, customer: &NewCustomer) -> Result<CustomerId, RepositoryError> {
        let id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO customers
                (name, phone, email, address, country, region, postal_zip, numberrange,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING id
            ",
        )
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.country)
        .bind(customer.region.as_deref())
        .bind(customer.postal_zip.as_deref())
        .bind(customer.numberrange)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        debug!(id, "Inserted customer");
        Ok(CustomerId::new(id))
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    async fn update(&self, id: CustomerId, patch: &CustomerPatch) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE customers
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                address = COALESCE($5, address),
                country = COALESCE($6, country),
                region = COALESCE($7, region),
                postal_zip = COALESCE($8, postal_zip),
                numberrange = COALESCE($9, numberrange),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.email.as_ref().map(Email::as_str))
        .bind(patch.address.as_deref())
        .bind(patch.country.as_deref())
        .bind(patch.region.as_deref())
        .bind(patch.postal_zip.as_deref())
        .bind(patch.numberrange)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
