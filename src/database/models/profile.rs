use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account role, stored as lowercase text in the profiles table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => Err(format!("invalid role: {}", other)),
        }
    }
}

/// Public profile record; the password hash never leaves the auth service
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert!("admin".parse::<Role>().is_err());
        assert!("Teacher".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"student\"");
        let role: Role = serde_json::from_str("\"teacher\"").unwrap();
        assert_eq!(role, Role::Teacher);
    }
}
