//! Servicio de autorización
//!
//! Tabla única de permisos (acción → roles). Todas las rutas consultan esta
//! tabla; el cliente solo la recibe como información para su interfaz.
//! La decisión por rol se toma antes de cualquier lectura del repositorio, de
//! modo que un rechazo nunca revela si el recurso existe. Las reglas que
//! dependen del estado del recurso se evalúan dentro de la transacción.

use crate::models::{User, UserChanges, UserRole, Vehicle, VehicleStatus};
use crate::utils::errors::{invalid_state_error, unauthorized_error, AppResult};

/// Acciones protegidas por rol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Consultar vehículos, conductores, asignaciones, registros y alertas
    ViewFleet,
    CreateVehicle,
    /// Cambiar status, mileage o location
    UpdateVehicle,
    /// Cambiar cualquier otro campo del vehículo
    EditVehicleDetails,
    RetireVehicle,
    DeleteVehicle,
    CreateDriver,
    /// Cambiar phone o email
    UpdateDriver,
    /// Cambiar cualquier otro campo del conductor, incluido el estado
    EditDriverDetails,
    DeleteDriver,
    ManageAssignments,
    AddRecord,
    UpdateRecord,
    ManageUsers,
    ManageSettings,
}

const EVERYONE: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin, UserRole::User];
const STAFF: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin];
const SUPER_ADMIN_ONLY: &[UserRole] = &[UserRole::SuperAdmin];

impl Action {
    pub const ALL: [Action; 15] = [
        Action::ViewFleet,
        Action::CreateVehicle,
        Action::UpdateVehicle,
        Action::EditVehicleDetails,
        Action::RetireVehicle,
        Action::DeleteVehicle,
        Action::CreateDriver,
        Action::UpdateDriver,
        Action::EditDriverDetails,
        Action::DeleteDriver,
        Action::ManageAssignments,
        Action::AddRecord,
        Action::UpdateRecord,
        Action::ManageUsers,
        Action::ManageSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewFleet => "view_fleet",
            Action::CreateVehicle => "create_vehicle",
            Action::UpdateVehicle => "update_vehicle",
            Action::EditVehicleDetails => "edit_vehicle_details",
            Action::RetireVehicle => "retire_vehicle",
            Action::DeleteVehicle => "delete_vehicle",
            Action::CreateDriver => "create_driver",
            Action::UpdateDriver => "update_driver",
            Action::EditDriverDetails => "edit_driver_details",
            Action::DeleteDriver => "delete_driver",
            Action::ManageAssignments => "manage_assignments",
            Action::AddRecord => "add_record",
            Action::UpdateRecord => "update_record",
            Action::ManageUsers => "manage_users",
            Action::ManageSettings => "manage_settings",
        }
    }
}

/// Roles autorizados para cada acción
pub fn allowed_roles(action: Action) -> &'static [UserRole] {
    match action {
        Action::ViewFleet | Action::UpdateVehicle | Action::UpdateDriver | Action::AddRecord => {
            EVERYONE
        }
        Action::CreateVehicle
        | Action::EditVehicleDetails
        | Action::RetireVehicle
        | Action::DeleteVehicle
        | Action::CreateDriver
        | Action::EditDriverDetails
        | Action::DeleteDriver
        | Action::ManageAssignments
        | Action::UpdateRecord => STAFF,
        Action::ManageUsers | Action::ManageSettings => SUPER_ADMIN_ONLY,
    }
}

pub fn is_allowed(role: UserRole, action: Action) -> bool {
    allowed_roles(action).contains(&role)
}

/// Decidir si un rol puede ejecutar una acción
pub fn authorize(role: UserRole, action: Action) -> AppResult<()> {
    if is_allowed(role, action) {
        Ok(())
    } else {
        Err(unauthorized_error())
    }
}

/// Permisos de un rol, en el formato que consume el cliente
pub fn permissions_for_role(role: UserRole) -> Vec<String> {
    Action::ALL
        .iter()
        .filter(|action| is_allowed(role, **action))
        .map(|action| action.as_str().to_string())
        .collect()
}

/// Impedir que el sistema se quede sin super admin activo
pub fn ensure_super_admin_remains(
    target: &User,
    changes: &UserChanges,
    active_super_admins: i64,
) -> AppResult<()> {
    if changes.removes_super_admin(target) && active_super_admins <= 1 {
        return Err(invalid_state_error("Cannot remove the last active super admin"));
    }
    Ok(())
}

/// Permisos que dependen del estado actual del vehículo
///
/// Se evalúa sobre la fila bloqueada dentro de la transacción de
/// actualización. Sacar de `assigned` a un vehículo cierra su registro
/// activo, así que exige `manage_assignments`; salir de `retired` exige
/// `retire_vehicle`.
pub fn authorize_vehicle_update(
    role: UserRole,
    current: &Vehicle,
    new_status: Option<VehicleStatus>,
) -> AppResult<()> {
    let Some(status) = new_status else {
        return Ok(());
    };

    if current.status == VehicleStatus::Retired && status != VehicleStatus::Retired {
        authorize(role, Action::RetireVehicle)?;
    }
    if current.assigned_driver_id.is_some() && status != VehicleStatus::Assigned {
        authorize(role, Action::ManageAssignments)?;
    }
    Ok(())
}
