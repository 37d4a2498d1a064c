//! Two-step login: password, then emailed OTP. Also the OTP resend and the three-step
//! password reset, which reuses the login OTP.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::RequestClient;
use crate::auth::Session;
use crate::errors::ClientError;
use crate::forms::FieldError;

pub const LOGIN_PATH: &str = "/api/auth/login/";
pub const VERIFY_OTP_PATH: &str = "/api/auth/verify-otp/";
pub const SEND_OTP_PATH: &str = "/api/auth/send-otp/";
pub const REQUEST_PASSWORD_RESET_PATH: &str = "/api/auth/request-password-reset/";
pub const VERIFY_RESET_OTP_PATH: &str = "/api/auth/verify-reset-otp/";
pub const RESET_PASSWORD_PATH: &str = "/api/auth/reset-password/";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    user_id: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyOtpRequest<'a> {
    user_id: &'a str,
    otp: &'a str,
}

#[derive(Debug, Serialize)]
struct UserIdRequest<'a> {
    user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct ResetPasswordRequest<'a> {
    user_id: &'a str,
    otp: &'a str,
    new_password: &'a str,
}

/// Plain `{"status", "message"}` answer of the reset endpoints.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthNotice {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    /// Masked address an OTP was sent to, when one was sent
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VerifyResetOtpResponse {
    #[serde(default)]
    verified: bool,
}

/// Answer to a successful password check; an OTP has been emailed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoginChallenge {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub user_id: String,
    /// Masked address the OTP was sent to
    #[serde(default)]
    pub email: Option<String>,
}

/// Logged-in user as described by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Debug, Deserialize)]
struct VerifyOtpResponse {
    token: String,
    #[serde(default)]
    refresh: Option<String>,
    user: AuthUser,
}

/// Login, OTP verification and logout against the session context of `client`.
#[derive(Clone)]
pub struct AuthApi {
    client: RequestClient,
}

impl AuthApi {
    pub fn new(client: RequestClient) -> Self {
        Self { client }
    }

    /// Check the password; the backend then emails an OTP.
    pub async fn login(&self, user_id: &str, password: &str) -> Result<LoginChallenge, ClientError> {
        let user_id = user_id.trim().to_uppercase();
        require(&[
            ("user_id", "User ID", user_id.as_str()),
            ("password", "Password", password),
        ])?;

        let challenge: LoginChallenge = self
            .client
            .post_anonymous(LOGIN_PATH, &LoginRequest { user_id: &user_id, password })
            .await?;

        tracing::info!("OTP requested for {}", challenge.user_id);
        Ok(challenge)
    }

    /// Exchange the OTP for a token and establish the session.
    pub async fn verify_otp(&self, user_id: &str, otp: &str) -> Result<AuthUser, ClientError> {
        let user_id = user_id.trim().to_uppercase();
        let otp = otp.trim();
        require(&[
            ("user_id", "User ID", user_id.as_str()),
            ("otp", "OTP", otp),
        ])?;

        let response: VerifyOtpResponse = self
            .client
            .post_anonymous(VERIFY_OTP_PATH, &VerifyOtpRequest { user_id: &user_id, otp })
            .await?;

        let session = Session {
            token: response.token,
            refresh: response.refresh,
            user_id: response.user.user_id.clone(),
            username: response.user.username.clone(),
            established_at: Utc::now(),
        };
        self.client.session().establish(session).await?;

        Ok(response.user)
    }

    pub async fn logout(&self) {
        self.client.session().invalidate().await;
    }

    /// Email a fresh login OTP without checking the password again.
    pub async fn resend_otp(&self, user_id: &str) -> Result<LoginChallenge, ClientError> {
        let user_id = user_id.trim().to_uppercase();
        require(&[("user_id", "User ID", user_id.as_str())])?;

        let challenge: LoginChallenge = self
            .client
            .post_anonymous(SEND_OTP_PATH, &UserIdRequest { user_id: &user_id })
            .await?;

        tracing::info!("OTP resent for {}", challenge.user_id);
        Ok(challenge)
    }

    /// Email a password reset OTP.
    pub async fn request_password_reset(&self, user_id: &str) -> Result<AuthNotice, ClientError> {
        let user_id = user_id.trim().to_uppercase();
        require(&[("user_id", "User ID", user_id.as_str())])?;

        let notice: AuthNotice = self
            .client
            .post_anonymous(REQUEST_PASSWORD_RESET_PATH, &UserIdRequest { user_id: &user_id })
            .await?;

        tracing::info!("Password reset requested for {}", user_id);
        Ok(notice)
    }

    /// Check a reset OTP before asking for the new password.
    ///
    /// A wrong or expired OTP comes back as an error, not as `false`.
    pub async fn verify_reset_otp(&self, user_id: &str, otp: &str) -> Result<bool, ClientError> {
        let user_id = user_id.trim().to_uppercase();
        let otp = otp.trim();
        require(&[
            ("user_id", "User ID", user_id.as_str()),
            ("otp", "OTP", otp),
        ])?;

        let response: VerifyResetOtpResponse = self
            .client
            .post_anonymous(VERIFY_RESET_OTP_PATH, &VerifyOtpRequest { user_id: &user_id, otp })
            .await?;
        Ok(response.verified)
    }

    /// Set a new password. The OTP is checked again by the backend.
    pub async fn reset_password(
        &self,
        user_id: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<AuthNotice, ClientError> {
        let user_id = user_id.trim().to_uppercase();
        let otp = otp.trim();
        require(&[
            ("user_id", "User ID", user_id.as_str()),
            ("otp", "OTP", otp),
            ("new_password", "New Password", new_password),
        ])?;

        let notice: AuthNotice = self
            .client
            .post_anonymous(
                RESET_PASSWORD_PATH,
                &ResetPasswordRequest {
                    user_id: &user_id,
                    otp,
                    new_password,
                },
            )
            .await?;

        tracing::info!("Password reset for {}", user_id);
        Ok(notice)
    }
}

fn require(values: &[(&'static str, &'static str, &str)]) -> Result<(), ClientError> {
    let missing: Vec<FieldError> = values
        .iter()
        .filter(|(_, _, value)| value.trim().is_empty())
        .map(|&(field, label, _)| FieldError::Missing { field, label })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Validation(missing))
    }
}
