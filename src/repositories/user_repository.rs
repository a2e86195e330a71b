use async_trait::async_trait;

use crate::models::{NewUser, User, UserChanges, UserRole};
use crate::repositories::{PgRepository, UserRepository};
use crate::services::authorization_service::ensure_super_admin_remains;
use crate::utils::errors::{map_db_error, not_found_error, AppResult};

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_user(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn count_users(&self) -> AppResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, email, name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.email)
        .bind(user.name)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(user)
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        // Bloquear a los super admins activos para contar sin carreras
        let super_admins: Vec<(i32,)> = sqlx::query_as(
            "SELECT id FROM users WHERE role = $1 AND is_active ORDER BY id FOR UPDATE",
        )
        .bind(UserRole::SuperAdmin)
        .fetch_all(&mut *tx)
        .await?;

        let target = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("User", id))?;

        ensure_super_admin_remains(&target, &changes, super_admins.len() as i64)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                email = COALESCE($4, email),
                name = COALESCE($5, name),
                role = COALESCE($6, role),
                is_active = COALESCE($7, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.username)
        .bind(changes.password_hash)
        .bind(changes.email)
        .bind(changes.name)
        .bind(changes.role)
        .bind(changes.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await?;
        Ok(user)
    }
}
