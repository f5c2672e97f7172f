//! User role definitions.
//!
//! The acting role is always passed explicitly into the business rules;
//! nothing in this crate reads session state.

use obra_shared::types::UserId;
use serde::{Deserialize, Serialize};

/// User roles within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Highest privilege. Bypasses closed months and is the only role that reopens them.
    Direction,
    /// Administrative staff, can close months.
    Administration,
    /// Bookkeeping staff, can record manual ledger entries.
    Accounting,
    /// Site manager, records expenses and incomes for their works.
    WorkManager,
    /// Read-only access.
    Viewer,
}

impl UserRole {
    /// All roles, from most to least privileged.
    pub const ALL: [Self; 5] = [
        Self::Direction,
        Self::Administration,
        Self::Accounting,
        Self::WorkManager,
        Self::Viewer,
    ];

    /// Returns true if this role can close accounting months.
    #[must_use]
    pub const fn can_close_periods(&self) -> bool {
        matches!(self, Self::Direction | Self::Administration)
    }

    /// Returns true if this role can reopen closed accounting months.
    #[must_use]
    pub const fn can_reopen_periods(&self) -> bool {
        matches!(self, Self::Direction)
    }

    /// Returns true if this role may mutate entries of a closed month.
    #[must_use]
    pub const fn bypasses_period_lock(&self) -> bool {
        matches!(self, Self::Direction)
    }

    /// Returns true if this role can submit expenses/incomes and edit entries.
    #[must_use]
    pub const fn can_record_movements(&self) -> bool {
        !matches!(self, Self::Viewer)
    }

    /// Returns true if this role can create ledger entries by hand.
    #[must_use]
    pub const fn can_record_manual_entries(&self) -> bool {
        matches!(
            self,
            Self::Direction | Self::Administration | Self::Accounting
        )
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Direction => "direction",
            Self::Administration => "administration",
            Self::Accounting => "accounting",
            Self::WorkManager => "work_manager",
            Self::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    /// Accepts canonical names and the Spanish role names used by the frontend.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "direction" | "direccion" | "dirección" => Ok(Self::Direction),
            "administration" | "admin" | "administracion" | "administración" => {
                Ok(Self::Administration)
            }
            "accounting" | "contable" | "contabilidad" => Ok(Self::Accounting),
            "work_manager" | "jefe_obra" | "jefe_de_obra" => Ok(Self::WorkManager),
            "viewer" | "lectura" | "consulta" => Ok(Self::Viewer),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// The user performing an operation, with the role they act under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Acting user.
    pub user_id: UserId,
    /// Role for this request.
    pub role: UserRole,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }
}
