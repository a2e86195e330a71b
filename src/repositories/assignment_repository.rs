//! Historial de asignaciones sobre PostgreSQL
//!
//! Orden de bloqueo: fila del vehículo, después fila del conductor. Los
//! índices únicos parciales `uq_active_assignment_*` respaldan los
//! invariantes aunque una transacción concurrente se salte las reglas.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgConnection;
use tracing::info;

use crate::models::{AssignCommand, AssignmentFilter, AssignmentRecord, Driver, Vehicle, VehicleStatus};
use crate::repositories::{AssignmentRepository, PgRepository};
use crate::services::assignment_service::{check_assignable, REASSIGNED_REASON};
use crate::utils::errors::{map_db_error, not_found_error, AppError, AppResult};

/// Bloquear la fila de un vehículo activo
pub(super) async fn lock_vehicle(conn: &mut PgConnection, id: i32) -> AppResult<Vehicle> {
    sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 AND is_active FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found_error("Vehicle", id))
}

pub(super) async fn lock_driver(conn: &mut PgConnection, id: i32) -> AppResult<Driver> {
    sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found_error("Driver", id))
}

async fn active_for_driver(
    conn: &mut PgConnection,
    driver_id: i32,
) -> AppResult<Option<AssignmentRecord>> {
    let record = sqlx::query_as::<_, AssignmentRecord>(
        "SELECT * FROM vehicle_assignments WHERE driver_id = $1 AND is_active",
    )
    .bind(driver_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(record)
}

/// Cerrar el registro activo de un vehículo, si existe
pub(super) async fn close_active_for_vehicle(
    conn: &mut PgConnection,
    vehicle_id: i32,
    reason: &str,
) -> AppResult<Option<AssignmentRecord>> {
    let record = sqlx::query_as::<_, AssignmentRecord>(
        r#"
        UPDATE vehicle_assignments
        SET is_active = FALSE, unassigned_date = $2, reason = $3
        WHERE vehicle_id = $1 AND is_active
        RETURNING *
        "#,
    )
    .bind(vehicle_id)
    .bind(Utc::now())
    .bind(reason)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(record)
}

/// Dejar el vehículo disponible y sin conductor
pub(super) async fn release_vehicle(conn: &mut PgConnection, vehicle_id: i32) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE vehicles
        SET assigned_driver_id = NULL, status = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(vehicle_id)
    .bind(VehicleStatus::Available)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[async_trait]
impl AssignmentRepository for PgRepository {
    async fn list_assignments(&self, filter: &AssignmentFilter) -> AppResult<Vec<AssignmentRecord>> {
        let records = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            SELECT * FROM vehicle_assignments
            WHERE ($1::BOOLEAN IS NULL OR is_active = $1)
              AND ($2::INTEGER IS NULL OR vehicle_id = $2)
              AND ($3::INTEGER IS NULL OR driver_id = $3)
            ORDER BY assigned_date DESC, id DESC
            "#,
        )
        .bind(filter.active)
        .bind(filter.vehicle_id)
        .bind(filter.driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn assign(&self, command: &AssignCommand) -> AppResult<AssignmentRecord> {
        let mut tx = self.pool.begin().await?;

        let vehicle = lock_vehicle(&mut tx, command.vehicle_id).await?;
        let driver = lock_driver(&mut tx, command.driver_id).await?;
        let driver_assignment = active_for_driver(&mut tx, driver.id).await?;
        check_assignable(&vehicle, &driver, driver_assignment.as_ref())?;

        if let Some(previous) = close_active_for_vehicle(&mut tx, vehicle.id, REASSIGNED_REASON).await? {
            info!(
                "🔁 Vehículo {} reasignado: conductor {} -> {}",
                vehicle.id, previous.driver_id, driver.id
            );
        }

        let record = sqlx::query_as::<_, AssignmentRecord>(
            r#"
            INSERT INTO vehicle_assignments (vehicle_id, driver_id, assigned_date, reason, assigned_by, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(driver.id)
        .bind(Utc::now())
        .bind(&command.reason)
        .bind(command.assigned_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r#"
            UPDATE vehicles
            SET assigned_driver_id = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(vehicle.id)
        .bind(driver.id)
        .bind(VehicleStatus::Assigned)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "✅ Vehículo {} asignado al conductor {} (registro {})",
            record.vehicle_id, record.driver_id, record.id
        );
        Ok(record)
    }

    async fn unassign(&self, vehicle_id: i32, reason: &str) -> AppResult<AssignmentRecord> {
        let mut tx = self.pool.begin().await?;

        let vehicle = lock_vehicle(&mut tx, vehicle_id).await?;
        let record = close_active_for_vehicle(&mut tx, vehicle.id, reason)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No active assignment for vehicle '{}'", vehicle.id))
            })?;
        release_vehicle(&mut tx, vehicle.id).await?;

        tx.commit().await?;

        info!(
            "↩️ Vehículo {} desasignado del conductor {}: {}",
            vehicle.id, record.driver_id, reason
        );
        Ok(record)
    }
}
