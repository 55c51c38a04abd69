//! Session Operations
//!
//! Account and record workflows built on the API client: registration,
//! login/logout, measurement submission, analysis, the emergency
//! trigger and the Telegram contact settings. Client-side validation
//! runs before any network call and short-circuits with a user-facing
//! message.

use thiserror::Error;

use crate::api::{
    AnalysisResponse, ApiClient, Credentials, EmergencyRequest, LoginResponse, RecordRequest,
    TelegramUpdate, UserProfile,
};
use crate::store::{StoreError, EMAIL_KEY};

/// Failures surfaced to the user. Nothing here ever panics the client.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// Rejected before any network call.
    #[error("{0}")]
    Validation(String),

    /// Backend or transport failure, with the backend's message when it
    /// sent one.
    #[error("{0}")]
    Api(String),

    #[error("Local store error: {0}")]
    Store(String),
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        SessionError::Store(e.to_string())
    }
}

/// Account and record operations against one backend.
pub struct Session {
    api: ApiClient,
}

impl Session {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), SessionError> {
        require_credentials(email, password)?;

        let response = self
            .api
            .post_json("/api/register", credentials(email, password))
            .await;
        if response.success {
            Ok(())
        } else {
            Err(SessionError::Api(response.describe_failure()))
        }
    }

    /// Log in and persist the bearer token and email.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionError> {
        require_credentials(email, password)?;

        let response = self
            .api
            .post_json("/api/login", credentials(email, password))
            .await;
        if !response.success {
            return Err(SessionError::Api(response.describe_failure()));
        }

        let token = response
            .decode::<LoginResponse>()
            .and_then(|r| r.token)
            .ok_or_else(|| SessionError::Api("login response carried no token".to_string()))?;

        let store = self.api.store();
        let mut store = store.write().await;
        store.set_token(Some(&token))?;
        store.set(EMAIL_KEY, email)?;
        Ok(())
    }

    /// Clear the stored token. Always succeeds against the backend
    /// because there is nothing to tell it.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let store = self.api.store();
        store.write().await.set_token(None)?;
        Ok(())
    }

    /// Whether a token is present. Never validated client-side; an
    /// expired token surfaces as a failed call later.
    pub async fn logged_in(&self) -> bool {
        let store = self.api.store();
        let logged = store.read().await.token().is_some();
        logged
    }

    /// Submit one measurement. `raw_value` accepts a comma decimal
    /// separator; meal/exercise times are naive `datetime-local` strings
    /// passed through verbatim.
    pub async fn save_record(
        &self,
        raw_value: &str,
        meal_time: &str,
        exercise_time: &str,
        symptoms: &str,
    ) -> Result<(), SessionError> {
        let value = parse_glycemia_value(raw_value)?;

        let response = self
            .api
            .post_json(
                "/api/record",
                RecordRequest {
                    value,
                    meal_time: meal_time.to_string(),
                    exercise_time: exercise_time.to_string(),
                    symptoms: symptoms.to_string(),
                },
            )
            .await;
        if response.success {
            Ok(())
        } else {
            Err(SessionError::Api(response.describe_failure()))
        }
    }

    /// Fetch the risk analysis for the stored records.
    pub async fn analyze(&self) -> Result<AnalysisResponse, SessionError> {
        let response = self.api.get("/api/analyze").await;
        if !response.success {
            return Err(SessionError::Api(response.describe_failure()));
        }
        response
            .decode()
            .ok_or_else(|| SessionError::Api("analysis response was not understood".to_string()))
    }

    /// Fire the manual emergency alert. Returns the backend's
    /// confirmation message.
    pub async fn emergency(&self, include_last_report: bool) -> Result<String, SessionError> {
        let response = self
            .api
            .post_json("/api/emergency", EmergencyRequest { include_last_report })
            .await;
        if response.success {
            Ok(response
                .message()
                .unwrap_or("Emergency alert sent.")
                .to_string())
        } else {
            Err(SessionError::Api(response.describe_failure()))
        }
    }

    /// Fetch the profile and cache the email locally.
    pub async fn user_me(&self) -> Result<UserProfile, SessionError> {
        let response = self.api.get("/api/user/me").await;
        if !response.success {
            return Err(SessionError::Api(response.describe_failure()));
        }
        let profile: UserProfile = response
            .decode()
            .ok_or_else(|| SessionError::Api("profile response was not understood".to_string()))?;

        let store = self.api.store();
        store.write().await.set(EMAIL_KEY, &profile.email)?;
        Ok(profile)
    }

    /// Update the Telegram contact ids. Both must be digit-only (or
    /// empty, which clears them server-side); checked before the call.
    pub async fn update_telegram(
        &self,
        telegram_chat_id: &str,
        trusted_telegram_id: &str,
    ) -> Result<(), SessionError> {
        let chat = telegram_chat_id.trim();
        let trusted = trusted_telegram_id.trim();

        if !is_valid_chat_id(chat) {
            return Err(SessionError::Validation(
                "Your chat_id must contain only digits.".to_string(),
            ));
        }
        if !is_valid_chat_id(trusted) {
            return Err(SessionError::Validation(
                "The trusted contact's chat_id must contain only digits.".to_string(),
            ));
        }

        let response = self
            .api
            .post_json(
                "/api/user/telegram",
                TelegramUpdate {
                    telegram_chat_id: chat.to_string(),
                    trusted_telegram_id: trusted.to_string(),
                },
            )
            .await;
        if response.success {
            Ok(())
        } else {
            Err(SessionError::Api(response.describe_failure()))
        }
    }
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn require_credentials(email: &str, password: &str) -> Result<(), SessionError> {
    if email.is_empty() || password.is_empty() {
        return Err(SessionError::Validation(
            "Email and password are required.".to_string(),
        ));
    }
    Ok(())
}

/// Parse a user-entered glycemia value. Accepts a comma as the decimal
/// separator; rejects non-numeric and negative input.
fn parse_glycemia_value(raw: &str) -> Result<f64, SessionError> {
    let value: f64 = raw
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| SessionError::Validation("Invalid glycemia value.".to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(SessionError::Validation(
            "Invalid glycemia value.".to_string(),
        ));
    }
    Ok(value)
}

/// Digit-only check; empty clears the id and is allowed.
fn is_valid_chat_id(id: &str) -> bool {
    id.is_empty() || id.chars().all(|c| c.is_ascii_digit())
}
