use async_trait::async_trait;
use sqlx::PgConnection;
use tracing::info;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::{UserRole, Vehicle, VehicleFilter, VehicleStatus};
use crate::repositories::assignment_repository::{close_active_for_vehicle, lock_vehicle};
use crate::repositories::{PgRepository, VehicleRepository};
use crate::services::assignment_service::{release_reason_for_vehicle, VEHICLE_REMOVED_REASON};
use crate::services::authorization_service::authorize_vehicle_update;
use crate::utils::errors::{map_db_error, AppResult};

/// Persistir todos los campos editables de un vehículo ya modificado en memoria
async fn save_vehicle(conn: &mut PgConnection, vehicle: &Vehicle) -> AppResult<Vehicle> {
    let saved = sqlx::query_as::<_, Vehicle>(
        r#"
        UPDATE vehicles SET
            make = $2, model = $3, year = $4, registration_number = $5,
            chassis_number = $6, engine_number = $7, fuel_type = $8,
            horsepower = $9, seats = $10, mileage = $11, location = $12,
            registration_expiry = $13, insurance_expiry = $14,
            roadworthiness_expiry = $15, annual_fee_expiry = $16,
            status = $17, assigned_driver_id = $18, is_active = $19,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(vehicle.id)
    .bind(&vehicle.make)
    .bind(&vehicle.model)
    .bind(vehicle.year)
    .bind(&vehicle.registration_number)
    .bind(&vehicle.chassis_number)
    .bind(&vehicle.engine_number)
    .bind(&vehicle.fuel_type)
    .bind(vehicle.horsepower)
    .bind(vehicle.seats)
    .bind(vehicle.mileage)
    .bind(&vehicle.location)
    .bind(vehicle.registration_expiry)
    .bind(vehicle.insurance_expiry)
    .bind(vehicle.roadworthiness_expiry)
    .bind(vehicle.annual_fee_expiry)
    .bind(vehicle.status)
    .bind(vehicle.assigned_driver_id)
    .bind(vehicle.is_active)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)?;

    Ok(saved)
}

#[async_trait]
impl VehicleRepository for PgRepository {
    async fn find_vehicle(&self, id: i32) -> AppResult<Option<Vehicle>> {
        let vehicle =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 AND is_active")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(vehicle)
    }

    async fn list_vehicles(&self, filter: &VehicleFilter) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE ($1 OR is_active)
              AND ($2::vehicle_status IS NULL OR status = $2)
              AND ($3::INTEGER IS NULL OR assigned_driver_id = $3)
            ORDER BY id
            "#,
        )
        .bind(filter.include_inactive)
        .bind(filter.status)
        .bind(filter.assigned_driver_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    async fn create_vehicle(&self, request: &CreateVehicleRequest) -> AppResult<Vehicle> {
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                make, model, year, registration_number, chassis_number, engine_number,
                fuel_type, horsepower, seats, mileage, location,
                registration_expiry, insurance_expiry, roadworthiness_expiry, annual_fee_expiry,
                status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(&request.make)
        .bind(&request.model)
        .bind(request.year)
        .bind(&request.registration_number)
        .bind(&request.chassis_number)
        .bind(&request.engine_number)
        .bind(&request.fuel_type)
        .bind(request.horsepower)
        .bind(request.seats)
        .bind(request.mileage)
        .bind(&request.location)
        .bind(request.registration_expiry)
        .bind(request.insurance_expiry)
        .bind(request.roadworthiness_expiry)
        .bind(request.annual_fee_expiry)
        .bind(request.status.unwrap_or(VehicleStatus::Available))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        info!("🚗 Vehículo creado: {} (id {})", vehicle.label(), vehicle.id);
        Ok(vehicle)
    }

    async fn update_vehicle(
        &self,
        id: i32,
        request: &UpdateVehicleRequest,
        actor: UserRole,
    ) -> AppResult<Vehicle> {
        let mut tx = self.pool.begin().await?;

        let mut vehicle = lock_vehicle(&mut tx, id).await?;
        authorize_vehicle_update(actor, &vehicle, request.status)?;
        let release = request
            .status
            .and_then(|status| release_reason_for_vehicle(&vehicle, status));

        request.apply_to(&mut vehicle);
        if let Some(reason) = release {
            close_active_for_vehicle(&mut tx, id, &reason).await?;
            info!("↩️ Vehículo {} liberado: {}", id, reason);
        }
        let vehicle = save_vehicle(&mut tx, &vehicle).await?;

        tx.commit().await?;
        Ok(vehicle)
    }

    async fn remove_vehicle(&self, id: i32) -> AppResult<Vehicle> {
        let mut tx = self.pool.begin().await?;

        let mut vehicle = lock_vehicle(&mut tx, id).await?;
        close_active_for_vehicle(&mut tx, id, VEHICLE_REMOVED_REASON).await?;
        vehicle.status = VehicleStatus::Retired;
        vehicle.assigned_driver_id = None;
        vehicle.is_active = false;
        let vehicle = save_vehicle(&mut tx, &vehicle).await?;

        tx.commit().await?;

        info!("🗑️ Vehículo {} dado de baja", id);
        Ok(vehicle)
    }
}
