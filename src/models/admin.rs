// src/models/admin.rs

//! Admin (librarian) identity and credential payloads.

use serde::{Deserialize, Serialize};

/// A librarian account as shown on the profile screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(default, alias = "username")]
    pub name: String,

    pub email: String,

    #[serde(default)]
    pub gender: String,

    #[serde(default, alias = "phoneNo")]
    pub phone_number: String,
}

/// Login form payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-up form payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub gender: String,
    pub phone_number: String,
    pub password: String,
    /// Checked locally, never sent to the backend
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

impl SignupRequest {
    /// The admin identity this request creates.
    pub fn admin(&self) -> Admin {
        Admin {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            gender: self.gender.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
        }
    }
}
