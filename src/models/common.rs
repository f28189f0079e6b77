use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
            error: None,
        }
    }

    pub fn error(code: String, message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: None,
            error: Some(ApiError { code, message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_envelope_shape() {
        let body = ApiResponse::<()>::error("CONFLICT".to_string(), "duplicate".to_string());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": false,
                "error": { "code": "CONFLICT", "message": "duplicate" }
            })
        );
    }

    #[test]
    fn test_success_envelope_omits_empty_fields() {
        let body = ApiResponse::success(json!({"id": 1}));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "success": true, "data": { "id": 1 } })
        );
    }
}
