//! Role registry
//!
//! Roles are named personas that supply the system prompt for chat
//! requests. The built-in set is embedded at build time; the user config
//! can add or shadow roles without a code change.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

use crate::core::config::Config;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize)]
struct BuiltinRoleEntry {
    name: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct BuiltinRolesConfig {
    roles: Vec<BuiltinRoleEntry>,
}

/// Requested role is not in the registry.
#[derive(Debug)]
pub struct UnknownRoleError {
    pub name: String,
    pub available: Vec<String>,
}

impl fmt::Display for UnknownRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Role '{}' not found. Available roles: {}",
            self.name,
            self.available.join(", ")
        )
    }
}

impl StdError for UnknownRoleError {}

/// Read-only after construction; the interaction loop only ever offers
/// names that are listed here.
pub struct RoleRegistry {
    roles: Vec<Role>,
}

fn load_builtin_roles() -> Vec<Role> {
    const CONFIG_CONTENT: &str = include_str!("../builtin_roles.toml");

    let config: BuiltinRolesConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtin_roles.toml");

    config
        .roles
        .into_iter()
        .map(|entry| Role {
            name: entry.name,
            system_prompt: entry.prompt,
        })
        .collect()
}

impl RoleRegistry {
    /// Build the registry from the built-in roles plus the config's custom
    /// roles. A custom role whose name matches a built-in (case-insensitive)
    /// replaces it in place; new names are appended.
    pub fn from_config(config: &Config) -> Self {
        let mut roles = load_builtin_roles();

        for custom in &config.custom_roles {
            let replacement = Role {
                name: custom.name.clone(),
                system_prompt: custom.prompt.clone(),
            };
            match roles
                .iter_mut()
                .find(|r| r.name.eq_ignore_ascii_case(&custom.name))
            {
                Some(existing) => *existing = replacement,
                None => roles.push(replacement),
            }
        }

        Self { roles }
    }

    pub fn lookup(&self, name: &str) -> Result<&Role, UnknownRoleError> {
        self.roles
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownRoleError {
                name: name.to_string(),
                available: self.names().iter().map(|n| n.to_string()).collect(),
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }

    /// The role selected at startup: the configured default if it resolves,
    /// otherwise the first built-in.
    pub fn default_role(&self, config: &Config) -> &Role {
        config
            .default_role
            .as_deref()
            .and_then(|name| self.lookup(name).ok())
            .unwrap_or(&self.roles[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CustomRole;

    #[test]
    fn builtin_roles_are_present() {
        let registry = RoleRegistry::from_config(&Config::default());
        let names = registry.names();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&"Film Critic"));
        assert!(names.contains(&"Creative Writing Mentor"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = RoleRegistry::from_config(&Config::default());
        let role = registry.lookup("film critic").unwrap();
        assert_eq!(role.name, "Film Critic");
        assert!(role.system_prompt.contains("film critic"));
    }

    #[test]
    fn unknown_role_lists_available_names() {
        let registry = RoleRegistry::from_config(&Config::default());
        let err = registry.lookup("Barista").unwrap_err();
        assert_eq!(err.name, "Barista");
        assert!(err.to_string().contains("Film Critic"));
    }

    #[test]
    fn custom_roles_extend_and_shadow() {
        let config = Config {
            custom_roles: vec![
                CustomRole {
                    name: "Poet".to_string(),
                    prompt: "You are a poet.".to_string(),
                },
                CustomRole {
                    name: "dance coach".to_string(),
                    prompt: "You teach tango only.".to_string(),
                },
            ],
            ..Config::default()
        };

        let registry = RoleRegistry::from_config(&config);
        assert_eq!(registry.names().len(), 6);
        assert_eq!(registry.lookup("Poet").unwrap().system_prompt, "You are a poet.");
        // Shadowed built-in keeps its position but takes the custom prompt.
        assert_eq!(
            registry.lookup("Dance Coach").unwrap().system_prompt,
            "You teach tango only."
        );
    }

    #[test]
    fn default_role_falls_back_to_first_builtin() {
        let registry = RoleRegistry::from_config(&Config::default());
        assert_eq!(registry.default_role(&Config::default()).name, "Film Critic");

        let config = Config {
            default_role: Some("Digital Artist".to_string()),
            ..Config::default()
        };
        let registry = RoleRegistry::from_config(&config);
        assert_eq!(registry.default_role(&config).name, "Digital Artist");

        let config = Config {
            default_role: Some("Nonexistent".to_string()),
            ..Config::default()
        };
        let registry = RoleRegistry::from_config(&config);
        assert_eq!(registry.default_role(&config).name, "Film Critic");
    }
}
