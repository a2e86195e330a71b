use serde::Deserialize;
use validator::Validate;

/// Request para asignar un vehículo a un conductor
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    #[validate(range(min = 1))]
    pub vehicle_id: i32,

    #[validate(range(min = 1))]
    pub driver_id: i32,

    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Cuerpo opcional de la desasignación
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UnassignRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}
