use serde::{Deserialize, Serialize};

// -- Auth --

/// Fields are optional so a missing value can be reported as a validation
/// error instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
}

// -- Activities --

#[derive(Debug, Default, Deserialize)]
pub struct AddActivityRequest {
    pub idea: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddActivityResponse {
    pub id: i64,
    pub idea: String,
}

// -- Generic --

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
