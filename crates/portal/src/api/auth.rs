//! `/api/auth/*` endpoints: sign-in, registration, recovery, own profile.

use reqwest::Method;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use silver_connect_core::{BearerToken, Email, Role};
use tracing::instrument;

use super::{ApiClient, ApiError, SecureFetch};
use crate::models::SessionUser;

/// Successful sign-in answer.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub user: SessionUser,
    pub token: BearerToken,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleLoginRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetPasswordRequest<'a> {
    password: &'a str,
}

/// Fields a member can edit on their own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    pub work_area: String,
    pub summary: String,
    pub specialty: String,
    pub experience: String,
}

/// A client's application to join the registry as a helper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperApplication {
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub experience: String,
    pub work_area: String,
    pub aadhar: String,
    pub resume_link: String,
    #[serde(default)]
    pub linkedin: String,
    pub summary: String,
    pub agreed: bool,
}

impl ApiClient {
    /// Exchange email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` for bad credentials.
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<AuthResponse, ApiError> {
        self.send_json(
            Method::POST,
            "/api/auth/login",
            &LoginRequest {
                email: email.as_str(),
                password,
            },
        )
        .await
    }

    /// Create a client account. The backend does not sign the account in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the email is taken or input is refused.
    #[instrument(skip(self, email, password), fields(email = %email))]
    pub async fn register(&self, name: &str, email: &Email, password: &str) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send_json(
                Method::POST,
                "/api/auth/register",
                &RegisterRequest {
                    name,
                    email: email.as_str(),
                    password,
                    role: Role::User,
                },
            )
            .await?;
        Ok(())
    }

    /// Forward a Google Identity ID token.
    ///
    /// Registration sends `role: "user"` so new Google accounts are clients.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the backend refuses the token.
    #[instrument(skip(self, id_token))]
    pub async fn google_login(
        &self,
        id_token: &str,
        registering: bool,
    ) -> Result<AuthResponse, ApiError> {
        self.send_json(
            Method::POST,
            "/api/auth/google-login",
            &GoogleLoginRequest {
                id_token,
                role: registering.then_some(Role::User),
            },
        )
        .await
    }

    /// Ask the backend to email a recovery link.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` for unknown addresses and
    /// `ApiError::Decode` when the answer is not JSON.
    #[instrument(skip(self, email), fields(email = %email))]
    pub async fn forgot_password(&self, email: &Email) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .send_json(
                Method::POST,
                "/api/auth/forgot-password",
                &ForgotPasswordRequest {
                    email: email.as_str(),
                },
            )
            .await?;
        Ok(())
    }

    /// Set a new password with a recovery token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the token is expired or invalid.
    #[instrument(skip(self, token, password))]
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let path = format!("/api/auth/reset-password/{}", urlencoding::encode(token));
        let _: IgnoredAny = self
            .send_json(Method::PUT, &path, &ResetPasswordRequest { password })
            .await?;
        Ok(())
    }
}

impl SecureFetch {
    /// The signed-in account as the backend currently sees it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn me(&self) -> Result<Option<SessionUser>, ApiError> {
        self.get("/api/auth/me").await
    }

    /// Save profile edits.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Option<()>, ApiError> {
        let answer: Option<IgnoredAny> = self.put("/api/auth/update-profile", update).await?;
        Ok(answer.map(|_| ()))
    }

    /// File a helper application.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or rejection.
    pub async fn upgrade_to_helper(
        &self,
        application: &HelperApplication,
    ) -> Result<Option<()>, ApiError> {
        let answer: Option<IgnoredAny> =
            self.post("/api/auth/upgrade-to-helper", application).await?;
        Ok(answer.map(|_| ()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_google_request_adds_role_only_when_registering() {
        let login = serde_json::to_value(GoogleLoginRequest {
            id_token: "gis-token",
            role: None,
        })
        .unwrap();
        assert_eq!(login, json!({"idToken": "gis-token"}));

        let register = serde_json::to_value(GoogleLoginRequest {
            id_token: "gis-token",
            role: Some(Role::User),
        })
        .unwrap();
        assert_eq!(register, json!({"idToken": "gis-token", "role": "user"}));
    }

    #[test]
    fn test_register_request_is_always_a_client() {
        let body = serde_json::to_value(RegisterRequest {
            name: "Kamala",
            email: "kamala@example.in",
            password: "pw",
            role: Role::User,
        })
        .unwrap();
        assert_eq!(body["role"], json!("user"));
    }

    #[test]
    fn test_helper_application_wire_names() {
        let body = serde_json::to_value(HelperApplication {
            work_area: "Aliganj".to_string(),
            resume_link: "https://drive.example/cv".to_string(),
            agreed: true,
            ..HelperApplication::default()
        })
        .unwrap();
        assert_eq!(body["workArea"], json!("Aliganj"));
        assert_eq!(body["resumeLink"], json!("https://drive.example/cv"));
        assert_eq!(body["agreed"], json!(true));
    }

    #[test]
    fn test_auth_response_decodes_user_and_token() {
        let response: AuthResponse = serde_json::from_value(json!({
            "user": {"_id": "u1", "name": "Asha", "email": "asha@x.in", "role": "helper", "isVerified": true},
            "token": "a.b.c"
        }))
        .unwrap();
        assert_eq!(response.user.role, Role::Helper);
        assert!(response.user.is_verified);
        assert_eq!(response.token.expose(), "a.b.c");
    }
}
