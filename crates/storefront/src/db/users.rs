//! User repository for database operations.
//!
//! Users and their profiles are created together in one transaction, so
//! every [`User`] this module returns carries its [`Profile`].

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use pizzeria_core::{Email, ProfileId, Role, UserId};

use super::RepositoryError;
use crate::models::user::{Profile, User};

const SELECT_USER: &str = r"
    SELECT u.id AS user_id, u.email, u.created_at, u.updated_at,
           p.id AS profile_id, p.role, p.phone_number, p.address
    FROM users u
    JOIN profiles p ON p.user_id = u.id
";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user with email and password hash.
    ///
    /// The customer profile is created in the same transaction; the
    /// returned [`User`] has it attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;
        let user_id = UserId::new(result.last_insert_rowid());

        let result = sqlx::query(
            "INSERT INTO profiles (user_id, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(Role::Customer.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let profile_id = ProfileId::new(result.last_insert_rowid());

        tx.commit().await?;

        Ok(User {
            id: user_id,
            email: email.clone(),
            profile: Profile {
                id: profile_id,
                user_id,
                role: Role::Customer,
                phone_number: None,
                address: None,
            },
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE u.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_user_row).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored role is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE u.email = ?"))
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_user_row).transpose()
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no user has this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT u.id AS user_id, u.email, u.created_at, u.updated_at,
                   p.id AS profile_id, p.role, p.phone_number, p.address,
                   u.password_hash
            FROM users u
            JOIN profiles p ON p.user_id = u.id
            WHERE u.email = ?
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = map_user_row(&row)?;
        let password_hash: String = row.try_get("password_hash")?;

        Ok(Some((user, password_hash)))
    }

    /// Change a user's role.
    ///
    /// There is no self-service path to this; it is operator tooling.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_role(&self, user_id: UserId, role: Role) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE profiles SET role = ?, updated_at = ? WHERE user_id = ?")
                .bind(role.to_string())
                .bind(Utc::now())
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Map a joined users/profiles row into a domain [`User`].
fn map_user_row(row: &SqliteRow) -> Result<User, RepositoryError> {
    let user_id: UserId = row.try_get("user_id")?;

    let role: String = row.try_get("role")?;
    let role = role
        .parse::<Role>()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

    Ok(User {
        id: user_id,
        email: row.try_get("email")?,
        profile: Profile {
            id: row.try_get("profile_id")?,
            user_id,
            role,
            phone_number: row.try_get("phone_number")?,
            address: row.try_get("address")?,
        },
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}
