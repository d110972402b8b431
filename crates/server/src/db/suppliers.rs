//! Supplier repository.

use sqlx::PgPool;

use simple_shop_core::validation::SupplierInput;
use simple_shop_core::{Supplier, SupplierId};

use super::RepositoryError;

const SUPPLIER_COLUMNS: &str = "id, name, contact, address, created_at";

/// Repository for supplier database operations.
pub struct SupplierRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SupplierRepository<'a> {
    /// Create a new supplier repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All suppliers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Supplier>, RepositoryError> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM catalog.supplier ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Get a supplier by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: SupplierId) -> Result<Option<Supplier>, RepositoryError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM catalog.supplier WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(supplier)
    }

    /// Create a supplier. Expects validated input with every field present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &SupplierInput) -> Result<Supplier, RepositoryError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "INSERT INTO catalog.supplier (name, contact, address)
             VALUES ($1, $2, $3)
             RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(input.name.as_deref().unwrap_or_default())
        .bind(input.contact.as_deref().unwrap_or_default())
        .bind(input.address.as_deref().unwrap_or_default())
        .fetch_one(self.pool)
        .await?;

        tracing::info!(supplier_id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    /// Update the fields present in `input`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the supplier does not exist.
    pub async fn update(
        &self,
        id: SupplierId,
        input: &SupplierInput,
    ) -> Result<Supplier, RepositoryError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "UPDATE catalog.supplier SET
                 name = COALESCE($2, name),
                 contact = COALESCE($3, contact),
                 address = COALESCE($4, address)
             WHERE id = $1
             RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(id)
        .bind(input.name.as_deref())
        .bind(input.contact.as_deref())
        .bind(input.address.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tracing::info!(supplier_id = %id, "Supplier updated");
        Ok(supplier)
    }

    /// Delete a supplier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the supplier does not exist.
    pub async fn delete(&self, id: SupplierId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM catalog.supplier WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::info!(supplier_id = %id, "Supplier deleted");
        Ok(())
    }
}
