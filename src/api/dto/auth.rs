/*
 * Responsibility
 * - /auth request/response DTOs
 * - validate() turns the loose JSON body into a service-level value
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::UserRow;
use crate::services::identity::Claims;
use crate::services::profile::Registration;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: Option<String>,
}

impl TokenRequest {
    pub fn validate(self) -> Result<String, &'static str> {
        match self.token {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err("Token is required"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "name")]
    pub username: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, &'static str> {
        let email = non_blank(self.email).map(|e| e.trim().to_lowercase());
        let password = non_blank(self.password);
        let display_name = non_blank(self.username).map(|n| n.trim().to_string());

        match (email, password, display_name) {
            (Some(email), Some(password), Some(display_name)) => {
                if !email.contains('@') {
                    return Err("A valid email is required");
                }
                Ok(Registration {
                    email,
                    password,
                    display_name,
                })
            }
            _ => Err("All fields are required"),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub message: &'static str,
    pub user: Claims,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub uid: String,
    pub name: Option<String>,
    pub email: String,
}

impl From<UserRow> for LoginUser {
    fn from(row: UserRow) -> Self {
        Self {
            uid: row.uid,
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: LoginUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_normalizes_email_and_accepts_name_alias() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"email":"  Al@X.com ","password":"pw1234","name":"Al"}"#,
        )
        .unwrap();

        let registration = req.validate().unwrap();

        assert_eq!(registration.email, "al@x.com");
        assert_eq!(registration.display_name, "Al");
    }

    #[test]
    fn register_requires_every_field() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":" ","username":"Al"}"#).unwrap();

        assert_eq!(req.validate().unwrap_err(), "All fields are required");
    }

    #[test]
    fn blank_token_is_missing() {
        let req = TokenRequest {
            token: Some("  ".into()),
        };
        assert_eq!(req.validate().unwrap_err(), "Token is required");
    }
}
