use async_trait::async_trait;

use crate::dto::record_dto::{
    CreateFuelRequest, CreateMaintenanceRequest, UpdateFuelRequest, UpdateMaintenanceRequest,
};
use crate::models::{FuelRecord, MaintenanceRecord, RecordFilter};
use crate::repositories::{PgRepository, RecordRepository};
use crate::utils::errors::{map_db_error, not_found_error, AppResult};

impl PgRepository {
    /// Los registros solo pueden referenciar vehículos activos y conductores existentes
    async fn ensure_references(&self, vehicle_id: i32, driver_id: Option<i32>) -> AppResult<()> {
        let (vehicle_exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = $1 AND is_active)")
                .bind(vehicle_id)
                .fetch_one(&self.pool)
                .await?;
        if !vehicle_exists {
            return Err(not_found_error("Vehicle", vehicle_id));
        }

        if let Some(driver_id) = driver_id {
            let (driver_exists,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM drivers WHERE id = $1)")
                    .bind(driver_id)
                    .fetch_one(&self.pool)
                    .await?;
            if !driver_exists {
                return Err(not_found_error("Driver", driver_id));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RecordRepository for PgRepository {
    async fn list_maintenance(&self, filter: RecordFilter) -> AppResult<Vec<MaintenanceRecord>> {
        let records = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            SELECT * FROM maintenance_records
            WHERE ($1::INTEGER IS NULL OR vehicle_id = $1)
            ORDER BY service_date DESC, id DESC
            "#,
        )
        .bind(filter.vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn create_maintenance(&self, request: &CreateMaintenanceRequest) -> AppResult<MaintenanceRecord> {
        self.ensure_references(request.vehicle_id, None).await?;

        let record = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            INSERT INTO maintenance_records (
                vehicle_id, service_type, description, cost, service_date,
                next_service_date, mileage_at_service, performed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.vehicle_id)
        .bind(&request.service_type)
        .bind(&request.description)
        .bind(request.cost)
        .bind(request.service_date)
        .bind(request.next_service_date)
        .bind(request.mileage_at_service)
        .bind(&request.performed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(record)
    }

    async fn update_maintenance(
        &self,
        id: i32,
        request: &UpdateMaintenanceRequest,
    ) -> AppResult<MaintenanceRecord> {
        let mut record = sqlx::query_as::<_, MaintenanceRecord>(
            "SELECT * FROM maintenance_records WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| not_found_error("Maintenance record", id))?;

        request.apply_to(&mut record);

        let record = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            UPDATE maintenance_records SET
                service_type = $2, description = $3, cost = $4, service_date = $5,
                next_service_date = $6, mileage_at_service = $7, performed_by = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.service_type)
        .bind(&record.description)
        .bind(record.cost)
        .bind(record.service_date)
        .bind(record.next_service_date)
        .bind(record.mileage_at_service)
        .bind(&record.performed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(record)
    }

    async fn list_fuel(&self, filter: RecordFilter) -> AppResult<Vec<FuelRecord>> {
        let records = sqlx::query_as::<_, FuelRecord>(
            r#"
            SELECT * FROM fuel_records
            WHERE ($1::INTEGER IS NULL OR vehicle_id = $1)
            ORDER BY fuel_date DESC, id DESC
            "#,
        )
        .bind(filter.vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn create_fuel(&self, request: &CreateFuelRequest) -> AppResult<FuelRecord> {
        self.ensure_references(request.vehicle_id, request.driver_id).await?;

        let record = sqlx::query_as::<_, FuelRecord>(
            r#"
            INSERT INTO fuel_records (vehicle_id, driver_id, fuel_date, liters, cost, mileage, station)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.vehicle_id)
        .bind(request.driver_id)
        .bind(request.fuel_date)
        .bind(request.liters)
        .bind(request.cost)
        .bind(request.mileage)
        .bind(&request.station)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(record)
    }

    async fn update_fuel(&self, id: i32, request: &UpdateFuelRequest) -> AppResult<FuelRecord> {
        let mut record = sqlx::query_as::<_, FuelRecord>("SELECT * FROM fuel_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Fuel record", id))?;

        request.apply_to(&mut record);

        let record = sqlx::query_as::<_, FuelRecord>(
            r#"
            UPDATE fuel_records SET
                fuel_date = $2, liters = $3, cost = $4, mileage = $5, station = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.fuel_date)
        .bind(record.liters)
        .bind(record.cost)
        .bind(record.mileage)
        .bind(&record.station)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(record)
    }
}
