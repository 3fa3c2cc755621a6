use serde::{Deserialize, Serialize};

use crate::models::Employee;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capabilities {
    pub view_org_wide: bool,
    pub manage_settings: bool,
    pub is_owner: bool,
}

/// Derive the capability set from stored flags. An account owner bypasses
/// every stored restriction; unset flags default to false.
pub fn capabilities_of(employee: &Employee) -> Capabilities {
    if employee.is_account_owner == Some(true) {
        return Capabilities {
            view_org_wide: true,
            manage_settings: true,
            is_owner: true,
        };
    }

    let flags = employee.permissions.clone().unwrap_or_default();
    Capabilities {
        view_org_wide: flags.can_view_organization_wide,
        manage_settings: flags.can_manage_settings,
        is_owner: false,
    }
}
