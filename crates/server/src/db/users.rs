//! User repository for database operations.
//!
//! Users are created on first social sign-in. Each provider identity is an
//! `account` row pointing at a user; an identity whose email matches an
//! existing user is linked to that user instead of creating a new one.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use simple_shop_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::{ProviderIdentity, User};

const USER_COLUMNS: &str = "id, email, name, image, role, created_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: Option<String>,
    name: Option<String>,
    image: Option<String>,
    role: UserRole,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))?;

        Ok(Self {
            id: row.id,
            email,
            name: row.name,
            image: row.image,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        sqlx::query_as::<_, UserRow>(&format!(
            r#"SELECT {USER_COLUMNS} FROM catalog."user" WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    /// Find or create the user behind a provider identity.
    ///
    /// Refreshes the stored name and avatar on every sign-in. The role is
    /// never changed here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn upsert_from_identity(
        &self,
        identity: &ProviderIdentity,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let linked = sqlx::query_scalar::<_, UserId>(
            r"
            SELECT user_id FROM catalog.account
            WHERE provider = $1 AND provider_account_id = $2
            ",
        )
        .bind(identity.provider.slug())
        .bind(&identity.provider_account_id)
        .fetch_optional(&mut *tx)
        .await?;

        let user_id = match linked {
            Some(user_id) => user_id,
            None => {
                let user_id = find_or_create_user(&mut tx, identity).await?;
                // A concurrent first sign-in with the same identity may have
                // linked it already; the row that won decides the user.
                let user_id = sqlx::query_scalar::<_, UserId>(
                    r"
                    INSERT INTO catalog.account (user_id, provider, provider_account_id)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (provider, provider_account_id)
                        DO UPDATE SET provider = EXCLUDED.provider
                    RETURNING user_id
                    ",
                )
                .bind(user_id)
                .bind(identity.provider.slug())
                .bind(&identity.provider_account_id)
                .fetch_one(&mut *tx)
                .await?;

                tracing::info!(
                    user_id = %user_id,
                    provider = %identity.provider,
                    "Linked provider account"
                );
                user_id
            }
        };

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE catalog."user" SET
                name = COALESCE($2, name),
                image = COALESCE($3, image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(identity.name.as_deref())
        .bind(identity.image.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        User::try_from(row)
    }

    /// Set a user's role, looked up by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this email.
    pub async fn set_role(&self, email: &Email, role: UserRole) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE catalog."user" SET role = $2, updated_at = NOW()
            WHERE email = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(role)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        User::try_from(row)
    }

    /// Number of registered users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM catalog."user""#)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// Existing user with the identity's email, or a new user.
///
/// The upsert keeps two simultaneous first sign-ins with one email on the
/// same row instead of failing the second on the unique index.
async fn find_or_create_user(
    conn: &mut PgConnection,
    identity: &ProviderIdentity,
) -> Result<UserId, RepositoryError> {
    let (id, created) = sqlx::query_as::<_, (UserId, bool)>(
        r#"
        INSERT INTO catalog."user" (email, name, image)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING id, (xmax = 0) AS created
        "#,
    )
    .bind(identity.email.as_ref())
    .bind(identity.name.as_deref())
    .bind(identity.image.as_deref())
    .fetch_one(&mut *conn)
    .await?;

    if created {
        tracing::info!(user_id = %id, provider = %identity.provider, "User created");
    }
    Ok(id)
}
