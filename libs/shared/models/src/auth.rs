use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Role of a verified caller as seen by the consultation core.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    Patient,
    Doctor,
    Admin,
}

impl User {
    /// Anything other than an explicit doctor or admin role is treated as a patient.
    pub fn caller_role(&self) -> CallerRole {
        match self.role.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("doctor") => CallerRole::Doctor,
            Some("admin") => CallerRole::Admin,
            _ => CallerRole::Patient,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.caller_role() == CallerRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: Option<&str>) -> User {
        User {
            id: "user-1".to_string(),
            email: None,
            role: role.map(String::from),
            metadata: None,
            created_at: None,
        }
    }

    #[test]
    fn test_caller_role_mapping() {
        assert_eq!(user_with_role(Some("doctor")).caller_role(), CallerRole::Doctor);
        assert_eq!(user_with_role(Some("Admin")).caller_role(), CallerRole::Admin);
        assert_eq!(user_with_role(Some("patient")).caller_role(), CallerRole::Patient);
        assert_eq!(user_with_role(Some("authenticated")).caller_role(), CallerRole::Patient);
        assert_eq!(user_with_role(None).caller_role(), CallerRole::Patient);
    }
}
