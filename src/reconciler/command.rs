//! Management commands, the unit of change.
//!
//! A reconciliation produces an ordered sequence of commands; each renders
//! to the CLI grammar `<address>:<operation>(<key=value pairs>)`.

use crate::model::Address;

/// A single management command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Creates a resource with the given pre-encoded parameter list.
    Add {
        /// Target resource address.
        address: Address,
        /// Comma-joined `key=value` parameter fragments.
        params: String,
    },

    /// Removes a resource.
    Remove {
        /// Target resource address.
        address: Address,
    },

    /// Sets one attribute to a pre-encoded value.
    WriteAttribute {
        /// Target resource address.
        address: Address,
        /// Attribute name.
        name: String,
        /// Encoded attribute value.
        value: String,
    },

    /// Unsets one attribute.
    UndefineAttribute {
        /// Target resource address.
        address: Address,
        /// Attribute name.
        name: String,
    },

    /// Reads a resource and, optionally, its whole subtree.
    ReadResource {
        /// Target resource address.
        address: Address,
        /// Whether to include nested child resources.
        recursive: bool,
    },

    /// Registers a server module from a local JAR.
    ModuleAdd {
        /// Module name, e.g. `com.oracle.jdbc`.
        name: String,
        /// Local path of the JAR.
        resources: String,
        /// Module dependencies.
        dependencies: Vec<String>,
    },

    /// Unregisters a server module.
    ModuleRemove {
        /// Module name.
        name: String,
    },

    /// Lists the JDBC drivers the datasources subsystem has loaded.
    ///
    /// Used to probe whether a driver module is registered and usable.
    InstalledDriversList,
}

impl Command {
    /// The resource address this command targets, if it targets one.
    ///
    /// Module commands operate on the module path, not the management
    /// model, and have no address.
    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        match self {
            Self::Add { address, .. }
            | Self::Remove { address }
            | Self::WriteAttribute { address, .. }
            | Self::UndefineAttribute { address, .. }
            | Self::ReadResource { address, .. } => Some(address),
            Self::ModuleAdd { .. } | Self::ModuleRemove { .. } | Self::InstalledDriversList => {
                None
            }
        }
    }

    /// Returns true for commands that mutate server state.
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        !matches!(self, Self::ReadResource { .. } | Self::InstalledDriversList)
    }

    /// Returns true for commands whose output is a management response.
    ///
    /// Module commands speak the plain `module` CLI syntax and print no
    /// decodable outcome record.
    #[must_use]
    pub const fn has_management_outcome(&self) -> bool {
        !matches!(self, Self::ModuleAdd { .. } | Self::ModuleRemove { .. })
    }

    /// Renders the command into the CLI grammar.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Add { address, params } => format!("{address}:add({params})"),
            Self::Remove { address } => format!("{address}:remove()"),
            Self::WriteAttribute {
                address,
                name,
                value,
            } => format!("{address}:write-attribute(name={name},value={value})"),
            Self::UndefineAttribute { address, name } => {
                format!("{address}:undefine-attribute(name={name})")
            }
            Self::ReadResource { address, recursive } => {
                if *recursive {
                    format!("{address}:read-resource(recursive=true)")
                } else {
                    format!("{address}:read-resource()")
                }
            }
            Self::ModuleAdd {
                name,
                resources,
                dependencies,
            } => {
                if dependencies.is_empty() {
                    format!("module add --name={name} --resources={resources}")
                } else {
                    format!(
                        "module add --name={name} --resources={resources} --dependencies=\"{}\"",
                        dependencies.join(",")
                    )
                }
            }
            Self::ModuleRemove { name } => format!("module remove --name={name}"),
            Self::InstalledDriversList => {
                String::from("/subsystem=datasources:installed-drivers-list")
            }
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle_ds() -> Address {
        Address::new("subsystem", "datasources").child("xa-data-source", "OracleDS")
    }

    #[test]
    fn test_render_add() {
        let cmd = Command::Add {
            address: oracle_ds(),
            params: String::from("jndi-name=\"java:/OracleDS\",min-pool-size=5"),
        };
        assert_eq!(
            cmd.render(),
            "/subsystem=datasources/xa-data-source=OracleDS:add(jndi-name=\"java:/OracleDS\",min-pool-size=5)"
        );
    }

    #[test]
    fn test_render_remove() {
        let cmd = Command::Remove { address: oracle_ds() };
        assert_eq!(
            cmd.render(),
            "/subsystem=datasources/xa-data-source=OracleDS:remove()"
        );
    }

    #[test]
    fn test_render_write_attribute() {
        let cmd = Command::WriteAttribute {
            address: Address::new("subsystem", "logging").child("logger", "com.example"),
            name: String::from("level"),
            value: String::from("\"DEBUG\""),
        };
        assert_eq!(
            cmd.render(),
            "/subsystem=logging/logger=com.example:write-attribute(name=level,value=\"DEBUG\")"
        );
    }

    #[test]
    fn test_render_undefine_attribute() {
        let cmd = Command::UndefineAttribute {
            address: oracle_ds(),
            name: String::from("query-timeout"),
        };
        assert_eq!(
            cmd.render(),
            "/subsystem=datasources/xa-data-source=OracleDS:undefine-attribute(name=query-timeout)"
        );
    }

    #[test]
    fn test_render_module_add_with_dependencies() {
        let cmd = Command::ModuleAdd {
            name: String::from("com.oracle.jdbc"),
            resources: String::from("/tmp/ojdbc8.jar"),
            dependencies: vec![
                String::from("javax.api"),
                String::from("javax.transaction.api"),
            ],
        };
        assert_eq!(
            cmd.render(),
            "module add --name=com.oracle.jdbc --resources=/tmp/ojdbc8.jar --dependencies=\"javax.api,javax.transaction.api\""
        );
        assert!(cmd.address().is_none());
        assert!(!cmd.has_management_outcome());
    }

    #[test]
    fn test_render_installed_drivers_list() {
        let cmd = Command::InstalledDriversList;
        assert_eq!(cmd.render(), "/subsystem=datasources:installed-drivers-list");
        assert!(!cmd.is_mutating());
    }

    #[test]
    fn test_render_read_resource_recursive() {
        let cmd = Command::ReadResource {
            address: oracle_ds(),
            recursive: true,
        };
        assert_eq!(
            cmd.render(),
            "/subsystem=datasources/xa-data-source=OracleDS:read-resource(recursive=true)"
        );
        assert!(!cmd.is_mutating());
    }
}
