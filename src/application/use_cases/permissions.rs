//! Static role → operation permission map.
//!
//! Every action names its operation string and calls [`require`]
//! before touching the database. Under-permissioned calls
//! short-circuit with an Unauthorized error, the same as missing
//! authentication.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use crate::domain::auth::{AuthContext, Role};
use crate::domain::error::{AppError, Result};

pub mod ops {
    pub const DESTINATIONS_VIEW: &str = "destinations.view";
    pub const DESTINATIONS_MANAGE: &str = "destinations.manage";
    pub const PROPERTIES_VIEW: &str = "properties.view";
    pub const PROPERTIES_CREATE: &str = "properties.create";
    pub const PROPERTIES_UPDATE: &str = "properties.update";
    pub const PROPERTIES_DELETE: &str = "properties.delete";
    pub const BOOKINGS_VIEW: &str = "bookings.view";
    pub const BOOKINGS_CREATE: &str = "bookings.create";
    pub const BOOKINGS_UPDATE: &str = "bookings.update";
    pub const AVAILABILITY_VIEW: &str = "availability.view";
    pub const AVAILABILITY_CREATE: &str = "availability.create";
    pub const AVAILABILITY_UPDATE: &str = "availability.update";
    pub const CONTACTS_VIEW: &str = "contacts.view";
    pub const CONTACTS_CREATE: &str = "contacts.create";
    pub const CONTACTS_UPDATE: &str = "contacts.update";
    pub const CONTACTS_DELETE: &str = "contacts.delete";
    pub const DOCUMENTS_VIEW: &str = "documents.view";
    pub const DOCUMENTS_MANAGE: &str = "documents.manage";
    pub const EQUIPMENT_VIEW: &str = "equipment.view";
    pub const EQUIPMENT_CREATE: &str = "equipment.create";
    pub const EQUIPMENT_UPDATE: &str = "equipment.update";
    pub const EQUIPMENT_DELETE: &str = "equipment.delete";
    pub const PRICING_VIEW: &str = "pricing.view";
    pub const PRICING_MANAGE: &str = "pricing.manage";
    pub const ACTIVITIES_VIEW: &str = "activities.view";
    pub const ACTIVITIES_MANAGE: &str = "activities.manage";
    pub const IMPORTS_RUN: &str = "imports.run";
    pub const AUDIT_VIEW: &str = "audit.view";
    pub const USERS_MANAGE: &str = "users.manage";
}

const VIEW_OPS: &[&str] = &[
    ops::DESTINATIONS_VIEW,
    ops::PROPERTIES_VIEW,
    ops::BOOKINGS_VIEW,
    ops::AVAILABILITY_VIEW,
    ops::CONTACTS_VIEW,
    ops::DOCUMENTS_VIEW,
    ops::EQUIPMENT_VIEW,
    ops::PRICING_VIEW,
    ops::ACTIVITIES_VIEW,
];

const AGENT_WRITE_OPS: &[&str] = &[
    ops::BOOKINGS_CREATE,
    ops::BOOKINGS_UPDATE,
    ops::AVAILABILITY_CREATE,
    ops::AVAILABILITY_UPDATE,
    ops::CONTACTS_CREATE,
    ops::CONTACTS_UPDATE,
    ops::EQUIPMENT_CREATE,
    ops::EQUIPMENT_UPDATE,
];

const MANAGER_EXTRA_OPS: &[&str] = &[
    ops::DESTINATIONS_MANAGE,
    ops::PROPERTIES_CREATE,
    ops::PROPERTIES_UPDATE,
    ops::PROPERTIES_DELETE,
    ops::CONTACTS_DELETE,
    ops::EQUIPMENT_DELETE,
    ops::DOCUMENTS_MANAGE,
    ops::PRICING_MANAGE,
    ops::ACTIVITIES_MANAGE,
    ops::IMPORTS_RUN,
    ops::AUDIT_VIEW,
];

const ADMIN_EXTRA_OPS: &[&str] = &[ops::USERS_MANAGE];

static PERMISSIONS: Lazy<HashMap<Role, HashSet<&'static str>>> = Lazy::new(|| {
    let viewer: HashSet<&'static str> = VIEW_OPS.iter().copied().collect();

    let mut agent = viewer.clone();
    agent.extend(AGENT_WRITE_OPS);

    let mut manager = agent.clone();
    manager.extend(MANAGER_EXTRA_OPS);

    let mut admin = manager.clone();
    admin.extend(ADMIN_EXTRA_OPS);

    HashMap::from([
        (Role::Viewer, viewer),
        (Role::Agent, agent),
        (Role::Manager, manager),
        (Role::Admin, admin),
    ])
});

pub fn allowed(role: Role, operation: &str) -> bool {
    PERMISSIONS
        .get(&role)
        .map(|ops| ops.contains(operation))
        .unwrap_or(false)
}

pub fn require(ctx: &AuthContext, operation: &str) -> Result<()> {
    if allowed(ctx.role, operation) {
        Ok(())
    } else {
        Err(AppError::Unauthorized(format!(
            "Role '{}' may not perform '{}'",
            ctx.role.as_str(),
            operation
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> AuthContext {
        AuthContext {
            user_id: 1,
            account_id: 1,
            email: "user@test".to_string(),
            role,
        }
    }

    #[test]
    fn test_viewer_is_read_only() {
        assert!(allowed(Role::Viewer, ops::PROPERTIES_VIEW));
        assert!(!allowed(Role::Viewer, ops::PROPERTIES_CREATE));
        assert!(!allowed(Role::Viewer, ops::BOOKINGS_CREATE));
        assert!(!allowed(Role::Viewer, ops::AUDIT_VIEW));
    }

    #[test]
    fn test_agent_writes_operational_entities_only() {
        assert!(allowed(Role::Agent, ops::BOOKINGS_CREATE));
        assert!(allowed(Role::Agent, ops::CONTACTS_UPDATE));
        assert!(!allowed(Role::Agent, ops::PROPERTIES_CREATE));
        assert!(!allowed(Role::Agent, ops::IMPORTS_RUN));
        assert!(!allowed(Role::Agent, ops::CONTACTS_DELETE));
    }

    #[test]
    fn test_manager_misses_user_management() {
        assert!(allowed(Role::Manager, ops::PROPERTIES_DELETE));
        assert!(allowed(Role::Manager, ops::AUDIT_VIEW));
        assert!(allowed(Role::Manager, ops::IMPORTS_RUN));
        assert!(!allowed(Role::Manager, ops::USERS_MANAGE));
        assert!(allowed(Role::Admin, ops::USERS_MANAGE));
    }

    #[test]
    fn test_require_reports_unauthorized() {
        let err = require(&ctx(Role::Viewer), ops::PROPERTIES_CREATE).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(require(&ctx(Role::Admin), ops::PROPERTIES_CREATE).is_ok());
    }
}
