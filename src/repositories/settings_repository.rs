use async_trait::async_trait;

use crate::dto::settings_dto::UpdateSettingRequest;
use crate::models::SystemSetting;
use crate::repositories::{PgRepository, SettingsRepository};
use crate::utils::errors::{map_db_error, AppResult};

#[async_trait]
impl SettingsRepository for PgRepository {
    async fn list_settings(&self) -> AppResult<Vec<SystemSetting>> {
        let settings = sqlx::query_as::<_, SystemSetting>("SELECT * FROM system_settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(settings)
    }

    async fn find_setting(&self, key: &str) -> AppResult<Option<SystemSetting>> {
        let setting = sqlx::query_as::<_, SystemSetting>("SELECT * FROM system_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(setting)
    }

    async fn upsert_setting(
        &self,
        key: &str,
        request: &UpdateSettingRequest,
        updated_by: i32,
    ) -> AppResult<SystemSetting> {
        let setting = sqlx::query_as::<_, SystemSetting>(
            r#"
            INSERT INTO system_settings (key, value, description, updated_by, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                description = COALESCE(EXCLUDED.description, system_settings.description),
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(key)
        .bind(&request.value)
        .bind(&request.description)
        .bind(updated_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(setting)
    }
}
