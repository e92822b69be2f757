use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Access tags attached to a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    User,
    Admin,
    SuperUser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperUser => "super-user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super-user" => Ok(Role::SuperUser),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Persisted user account. The password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub full_name: String,
    pub is_active: bool,
    pub roles: Vec<Role>,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            is_active: self.is_active,
            roles: self.roles.clone(),
        }
    }
}

/// Public projection of a user, embedded in product responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub roles: Vec<Role>,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

/// Emails are stored and compared lower-cased and trimmed
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_use_kebab_case_tags() {
        assert_eq!(serde_json::to_string(&Role::SuperUser).unwrap(), "\"super-user\"");
        assert_eq!("super-user".parse::<Role>().unwrap(), Role::SuperUser);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test1@google.com".to_string(),
            password: "$2b$10$hash".to_string(),
            full_name: "Test One".to_string(),
            is_active: true,
            roles: vec![Role::User],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["fullName"], "Test One");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Test1@Google.COM "), "test1@google.com");
    }
}
