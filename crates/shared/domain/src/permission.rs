//! Role based permission matrix.
//!
//! Every dispatchable operation names one `(Module, Verb)` pair; a role is
//! allowed to run it only when the pair is granted in the matrix.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_ADMIN, ROLE_OPERATOR, ROLE_VIEWER};

/// Roles a session can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operator,
    Viewer,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_OPERATOR => Ok(Role::Operator),
            ROLE_VIEWER => Ok(Role::Viewer),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "{}", ROLE_ADMIN),
            Role::Operator => write!(f, "{}", ROLE_OPERATOR),
            Role::Viewer => write!(f, "{}", ROLE_VIEWER),
        }
    }
}

/// Functional areas guarded by the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Directorates,
    WorkUnits,
    Affairs,
    Positions,
    Assignments,
    AuditLogs,
    Organization,
}

impl Module {
    pub const ALL: [Module; 7] = [
        Module::Directorates,
        Module::WorkUnits,
        Module::Affairs,
        Module::Positions,
        Module::Assignments,
        Module::AuditLogs,
        Module::Organization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Directorates => "directorates",
            Module::WorkUnits => "work units",
            Module::Affairs => "affairs",
            Module::Positions => "positions",
            Module::Assignments => "assignments",
            Module::AuditLogs => "audit logs",
            Module::Organization => "organization",
        }
    }

    /// Modules holding editable organization data
    fn is_org_data(&self) -> bool {
        !matches!(self, Module::AuditLogs | Module::Organization)
    }
}

/// Kind of access an operation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    View,
    Create,
    Update,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::View, Verb::Create, Verb::Update, Verb::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::View => "view",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
        }
    }
}

/// A single `(module, verb)` grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub module: Module,
    pub verb: Verb,
}

impl Permission {
    pub const fn new(module: Module, verb: Verb) -> Self {
        Self { module, verb }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.verb.as_str(), self.module.as_str())
    }
}

/// Grants per role
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl PermissionMatrix {
    /// Matrix with no grants at all
    pub fn empty() -> Self {
        Self {
            grants: HashMap::new(),
        }
    }

    pub fn grant(mut self, role: Role, permission: Permission) -> Self {
        self.grants.entry(role).or_default().insert(permission);
        self
    }

    pub fn allows(&self, role: Role, permission: Permission) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|set| set.contains(&permission))
    }
}

impl Default for PermissionMatrix {
    /// Admin: everything. Operator: view everything, create/update
    /// organization data. Viewer: view organization data only.
    fn default() -> Self {
        let mut matrix = Self::empty();
        for module in Module::ALL {
            for verb in Verb::ALL {
                matrix = matrix.grant(Role::Admin, Permission::new(module, verb));
            }

            matrix = matrix.grant(Role::Operator, Permission::new(module, Verb::View));
            if module.is_org_data() {
                matrix = matrix
                    .grant(Role::Operator, Permission::new(module, Verb::Create))
                    .grant(Role::Operator, Permission::new(module, Verb::Update));
            }

            if module != Module::AuditLogs {
                matrix = matrix.grant(Role::Viewer, Permission::new(module, Verb::View));
            }
        }
        matrix
    }
}
