use serde::Deserialize;
use validator::Validate;

/// Request para crear o actualizar una entrada de configuración
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSettingRequest {
    #[validate(length(min = 1, max = 2000))]
    pub value: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}
