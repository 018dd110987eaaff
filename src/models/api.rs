use crate::models::question::ExamType;
use crate::models::user::Role;
use serde::{Deserialize, Serialize};

// Request payloads

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub year_of_study: Option<u8>,
    #[serde(default)]
    pub speciality: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub email: String,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct DeviceRegisterRequest {
    pub device_fingerprint: String,
    pub device_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentUpdateRequest {
    pub is_paid: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

// Query parameters

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct AdminUserListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub role: Option<Role>,
    pub is_paid: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct KeyListQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub is_used: Option<bool>,
}

/// Filter dimensions for the question bank. All optional; combined with AND.
#[derive(Debug, Default, Deserialize)]
pub struct QuestionFilter {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    pub year: Option<u16>,
    pub study_year: Option<u8>,
    pub module: Option<String>,
    pub unite: Option<String>,
    pub speciality: Option<String>,
    /// Substring match against any of the question's course labels.
    pub cours: Option<String>,
    pub exam_type: Option<ExamType>,
}

#[derive(Debug, Deserialize)]
pub struct ModulesQuery {
    pub study_year: u8,
}

fn default_limit() -> usize {
    100
}

// Response bodies

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivateResponse {
    pub message: String,
    pub user_id: u32,
    pub is_paid: bool,
    pub expires_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportItemError {
    /// Zero-based position of the failed item in the submitted array.
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportReport {
    pub total: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportItemError>,
}

/// The current account plus its subscription window.
///
/// `is_paid` and the key-derived validity are reported side by side; the
/// flag is not recomputed from the expiry.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: crate::models::user::User,
    pub access_valid: bool,
    pub access_valid_until: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct YearsResponse {
    pub years: Vec<u16>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModulesResponse {
    pub study_year: u8,
    pub modules: Vec<String>,
}

// Admin dashboard statistics

#[derive(Debug, Serialize, Deserialize)]
pub struct UserStats {
    pub total_users: usize,
    pub paid_users: usize,
    pub unpaid_users: usize,
    pub owner_users: usize,
    pub admin_users: usize,
    pub manager_users: usize,
    pub student_users: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionStats {
    pub total_questions: usize,
    pub total_answers: usize,
    pub average_answers_per_question: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeyStats {
    pub total_keys: usize,
    pub used_keys: usize,
    pub unused_keys: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModuleCount {
    pub module: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct YearCount {
    pub year: u16,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub user_stats: UserStats,
    pub question_stats: QuestionStats,
    pub activation_key_stats: KeyStats,
    pub module_stats: Vec<ModuleCount>,
    pub year_stats: Vec<YearCount>,
}
