use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Cliente,
    Profesional,
}

impl Role {
    pub fn is_administrator(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn is_professional(&self) -> bool {
        matches!(self, Role::Profesional)
    }

    /// Staff roles get the management views. Professionals and admins are
    /// treated alike here.
    pub fn has_admin_view(&self) -> bool {
        matches!(self, Role::Admin | Role::Profesional)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Cliente => write!(f, "cliente"),
            Role::Profesional => write!(f, "profesional"),
        }
    }
}

/// A user record as served by the users backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub especialidad: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role.has_admin_view()
    }
}
