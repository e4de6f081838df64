use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;

/// Staff role. Fixed enumeration stored as a Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Sales,
    Accounting,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Sales => "sales",
            Role::Accounting => "accounting",
        }
    }
}

/// Role-gated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ViewInventory,
    ViewPricing,
    AddTire,
    EditTire,
    DeleteTire,
    ManageUsers,
}

/// Static role/permission table. Stateless lookup, evaluated anew on every
/// request; a decision is never carried across requests.
pub fn authorize(role: Role, op: Operation) -> bool {
    use Operation::*;
    match role {
        Role::Admin => true,
        Role::Sales => matches!(op, ViewInventory | ViewPricing | AddTire | EditTire),
        Role::Accounting => matches!(op, ViewInventory | ViewPricing),
    }
}

/// Guard form of [`authorize`]: a denial becomes `Forbidden`.
pub fn require(role: Role, op: Operation) -> Result<(), AppError> {
    if authorize(role, op) {
        Ok(())
    } else {
        warn!(role = role.as_str(), operation = ?op, "operation denied");
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::Operation::*;
    use super::*;

    #[test]
    fn permission_table_is_exact() {
        // (operation, admin, sales, accounting)
        let table = [
            (ViewInventory, true, true, true),
            (ViewPricing, true, true, true),
            (AddTire, true, true, false),
            (EditTire, true, true, false),
            (DeleteTire, true, false, false),
            (ManageUsers, true, false, false),
        ];
        for (op, admin, sales, accounting) in table {
            assert_eq!(authorize(Role::Admin, op), admin, "admin / {op:?}");
            assert_eq!(authorize(Role::Sales, op), sales, "sales / {op:?}");
            assert_eq!(
                authorize(Role::Accounting, op),
                accounting,
                "accounting / {op:?}"
            );
        }
    }

    #[test]
    fn require_maps_denial_to_forbidden() {
        assert!(require(Role::Sales, DeleteTire).is_err());
        assert!(matches!(
            require(Role::Accounting, AddTire),
            Err(AppError::Forbidden)
        ));
        assert!(require(Role::Admin, ManageUsers).is_ok());
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"accounting\"").unwrap(),
            Role::Accounting
        );
    }
}
