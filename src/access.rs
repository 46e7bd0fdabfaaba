use serde::{Deserialize, Serialize};

/// Role allow-lists granting each capability. Two historically deployed
/// shapes exist; deployment picks one via configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccessConfig {
    /// One independent allow-list per capability.
    Granular {
        portal: Vec<String>,
        dashboard: Vec<String>,
        remove_logs: Vec<String>,
        reset_stats: Vec<String>,
    },
    /// Portal roles may log in; admin roles get every privileged capability.
    AdminTier {
        portal: Vec<String>,
        admin: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_login: bool,
    pub can_view_dashboard: bool,
    pub can_remove_logs: bool,
    pub can_reset_stats: bool,
}

/// Pure mapping from a caller's guild roles to capability flags.
/// An empty allow-list is an open policy: the capability is granted to all.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    config: AccessConfig,
}

impl AccessPolicy {
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    pub fn capabilities_for(&self, roles: &[String]) -> Capabilities {
        match &self.config {
            AccessConfig::Granular {
                portal,
                dashboard,
                remove_logs,
                reset_stats,
            } => Capabilities {
                can_login: has_any_role(roles, portal),
                can_view_dashboard: has_any_role(roles, dashboard),
                can_remove_logs: has_any_role(roles, remove_logs),
                can_reset_stats: has_any_role(roles, reset_stats),
            },
            AccessConfig::AdminTier { portal, admin } => {
                let is_admin = has_any_role(roles, admin);
                Capabilities {
                    can_login: is_admin || has_any_role(roles, portal),
                    can_view_dashboard: is_admin,
                    can_remove_logs: is_admin,
                    can_reset_stats: is_admin,
                }
            }
        }
    }
}

fn has_any_role(roles: &[String], allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    roles.iter().any(|role| allowed.contains(role))
}
