use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::models::{AssignmentRecord, Driver, DriverFilter, DriverStatus};
use crate::repositories::assignment_repository::{lock_driver, release_vehicle};
use crate::repositories::{DriverRepository, PgRepository};
use crate::services::assignment_service::release_reason_for_driver;
use crate::utils::errors::{map_db_error, AppResult};

#[async_trait]
impl DriverRepository for PgRepository {
    async fn find_driver(&self, id: i32) -> AppResult<Option<Driver>> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    async fn list_drivers(&self, filter: &DriverFilter) -> AppResult<Vec<Driver>> {
        let drivers = sqlx::query_as::<_, Driver>(
            r#"
            SELECT * FROM drivers d
            WHERE ($1::driver_status IS NULL OR d.status = $1)
              AND (NOT $2 OR NOT EXISTS (
                  SELECT 1 FROM vehicle_assignments a
                  WHERE a.driver_id = d.id AND a.is_active
              ))
            ORDER BY d.name, d.id
            "#,
        )
        .bind(filter.status)
        .bind(filter.unassigned_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn create_driver(&self, request: &CreateDriverRequest) -> AppResult<Driver> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (name, email, phone, license_number, license_expiry_date, experience, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.license_number)
        .bind(request.license_expiry_date)
        .bind(request.experience)
        .bind(request.status.unwrap_or(DriverStatus::Active))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        info!("🧑‍✈️ Conductor creado: {} (id {})", driver.name, driver.id);
        Ok(driver)
    }

    async fn update_driver(&self, id: i32, request: &UpdateDriverRequest) -> AppResult<Driver> {
        let mut tx = self.pool.begin().await?;

        // Los vehículos se bloquean antes que el conductor, igual que en Assign
        let _vehicles: Vec<(i32,)> = sqlx::query_as(
            "SELECT id FROM vehicles WHERE assigned_driver_id = $1 ORDER BY id FOR UPDATE",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let mut driver = lock_driver(&mut tx, id).await?;
        let release = request
            .status
            .and_then(|status| release_reason_for_driver(&driver, status));
        request.apply_to(&mut driver);

        if let Some(reason) = release {
            let closed = sqlx::query_as::<_, AssignmentRecord>(
                r#"
                UPDATE vehicle_assignments
                SET is_active = FALSE, unassigned_date = $2, reason = $3
                WHERE driver_id = $1 AND is_active
                RETURNING *
                "#,
            )
            .bind(id)
            .bind(Utc::now())
            .bind(&reason)
            .fetch_all(&mut *tx)
            .await?;

            for record in &closed {
                release_vehicle(&mut tx, record.vehicle_id).await?;
                info!("↩️ Vehículo {} liberado: {}", record.vehicle_id, reason);
            }
        }

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers SET
                name = $2, email = $3, phone = $4, license_number = $5,
                license_expiry_date = $6, experience = $7, status = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(driver.id)
        .bind(&driver.name)
        .bind(&driver.email)
        .bind(&driver.phone)
        .bind(&driver.license_number)
        .bind(driver.license_expiry_date)
        .bind(driver.experience)
        .bind(driver.status)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await?;
        Ok(driver)
    }
}
