//! Data Transfer Objects
//!
//! Request and response types for the backend endpoints. Field names
//! follow the backend's wire format, including the Portuguese form-field
//! names on record submission.

use serde::{Deserialize, Serialize};

// ============================================
// RESPONSE TYPES
// ============================================

/// One stored glycemia measurement, as returned by `GET /api/records`.
///
/// `timestamp` is the backend's raw string: either a UTC instant for the
/// server-generated measurement time, or a naive `datetime-local` string
/// echoed back for meal/exercise times. Immutable once fetched.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MeasurementRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub value: f64,
    pub timestamp: String,
    #[serde(default)]
    pub meal_time: Option<String>,
    #[serde(default)]
    pub exercise_time: Option<String>,
    #[serde(default)]
    pub symptoms: Option<String>,
}

/// One public chat message, as returned by `GET /api/chat/messages`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub username: String,
    pub content: String,
    pub timestamp: String,
}

/// Profile data from `GET /api/user/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub telegram_chat_id: Option<String>,
    #[serde(default)]
    pub trusted_telegram_id: Option<String>,
}

/// Login response; `token` is present only on success.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Analysis result from `GET /api/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalysisResponse {
    pub message: String,
    #[serde(default)]
    pub risk_level: Option<String>,
}

// ============================================
// REQUEST TYPES
// ============================================

/// Credentials for `POST /api/register` and `POST /api/login`.
#[derive(Debug, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// New measurement for `POST /api/record`. The backend expects the
/// original form-field names.
#[derive(Debug, Serialize)]
pub struct RecordRequest {
    #[serde(rename = "valorGlicemia")]
    pub value: f64,
    #[serde(rename = "ultimaRefeicao")]
    pub meal_time: String,
    #[serde(rename = "ultimoExercicio")]
    pub exercise_time: String,
    #[serde(rename = "sintomas")]
    pub symptoms: String,
}

/// Message body for `POST /api/chat/messages`.
#[derive(Debug, Serialize)]
pub struct ChatPost {
    pub content: String,
}

/// Trigger body for `POST /api/emergency`.
#[derive(Debug, Serialize)]
pub struct EmergencyRequest {
    pub include_last_report: bool,
}

/// Telegram contact update for `POST /api/user/telegram`. Empty strings
/// clear the stored ids server-side.
#[derive(Debug, Serialize)]
pub struct TelegramUpdate {
    pub telegram_chat_id: String,
    pub trusted_telegram_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_deserializes_with_missing_optionals() {
        let json = r#"{"value": 110.0, "timestamp": "2024-01-01T10:00:00.000000"}"#;
        let record: MeasurementRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.value, 110.0);
        assert!(record.meal_time.is_none());
        assert!(record.symptoms.is_none());
    }

    #[test]
    fn record_request_uses_backend_field_names() {
        let req = RecordRequest {
            value: 98.5,
            meal_time: "2024-01-01T08:30".to_string(),
            exercise_time: String::new(),
            symptoms: "tontura".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["valorGlicemia"], 98.5);
        assert_eq!(json["ultimaRefeicao"], "2024-01-01T08:30");
        assert_eq!(json["sintomas"], "tontura");
    }

    #[test]
    fn login_response_tolerates_error_shape() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"message": "Invalid credentials"}"#).unwrap();
        assert!(resp.token.is_none());
    }
}
