//! Role labels and the role catalog.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authority tier of an identity.
///
/// The set is closed: every role the platform knows about is listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleLabel {
    /// Regular member.
    User,
    /// Administrator.
    Admin,
    /// Super administrator.
    SuperAdmin,
}

impl RoleLabel {
    /// Every known label, highest authority first.
    pub const ALL: [RoleLabel; 3] = [Self::SuperAdmin, Self::Admin, Self::User];

    /// Returns the wire name of the label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for RoleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleLabel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// Role document as stored in the role collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Storage key, absent until persisted.
    pub key: Option<String>,
    /// Label the engine matches against.
    pub name_en: RoleLabel,
    /// Localized display name.
    pub name_ru: String,
    /// Optional icon reference.
    pub name_icon: Option<String>,
}

impl RoleRecord {
    /// Creates an unsaved record.
    pub fn new(name_en: RoleLabel, name_ru: impl Into<String>) -> Self {
        Self {
            key: None,
            name_en,
            name_ru: name_ru.into(),
            name_icon: None,
        }
    }

    /// Sets the storage key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Seed catalog installed into an empty role collection.
#[must_use]
pub fn default_catalog() -> Vec<RoleRecord> {
    vec![
        RoleRecord::new(RoleLabel::SuperAdmin, "супер-администратор"),
        RoleRecord::new(RoleLabel::Admin, "администратор"),
        RoleRecord::new(RoleLabel::User, "пользователь"),
    ]
}
