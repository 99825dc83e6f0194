//! Module identities and descriptors of known modules.

use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::types::TypeKind;

/// Identity of a module: `{org}/{name}:{version}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    pub org: SmolStr,
    pub name: SmolStr,
    #[serde(default)]
    pub version: SmolStr,
}

impl ModuleId {
    pub fn new(org: impl Into<SmolStr>, name: impl Into<SmolStr>, version: impl Into<SmolStr>) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// `{org}/{name}`, the part of the identity that decides package equality.
    pub fn package_key(&self) -> String {
        format!("{}/{}", self.org, self.name)
    }

    /// Organization and name match. The version is not compared.
    pub fn same_package(&self, other: &ModuleId) -> bool {
        self.org == other.org && self.name == other.name
    }

    /// Default import prefix: the last `.`-separated segment of the name.
    pub fn default_prefix(&self) -> SmolStr {
        self.name
            .rsplit('.')
            .next()
            .map(SmolStr::new)
            .unwrap_or_else(|| self.name.clone())
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}/{}", self.org, self.name)
        } else {
            write!(f, "{}/{}:{}", self.org, self.name, self.version)
        }
    }
}

/// What the extractor knows about a module it cannot see the source of.
///
/// Supplied per request through the extractor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub org: SmolStr,
    pub name: SmolStr,
    #[serde(default)]
    pub version: SmolStr,
    /// Overrides the default prefix derived from the module name.
    #[serde(default)]
    pub prefix: Option<SmolStr>,
    /// Exported client classes
    #[serde(default)]
    pub clients: Vec<SmolStr>,
    #[serde(default)]
    pub listeners: Vec<SmolStr>,
    /// Exported records and other named types
    #[serde(default)]
    pub types: Vec<SmolStr>,
}

impl ModuleDescriptor {
    pub fn new(org: impl Into<SmolStr>, name: impl Into<SmolStr>, version: impl Into<SmolStr>) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
            version: version.into(),
            prefix: None,
            clients: Vec::new(),
            listeners: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn with_clients<I, S>(mut self, clients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.clients.extend(clients.into_iter().map(Into::into));
        self
    }

    pub fn with_listeners<I, S>(mut self, listeners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.listeners.extend(listeners.into_iter().map(Into::into));
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn id(&self) -> ModuleId {
        ModuleId::new(self.org.clone(), self.name.clone(), self.version.clone())
    }

    pub fn prefix(&self) -> SmolStr {
        self.prefix.clone().unwrap_or_else(|| self.id().default_prefix())
    }

    /// Kind of an exported type, `None` if the module does not declare it.
    pub fn kind_of(&self, name: &str) -> Option<TypeKind> {
        if self.clients.iter().any(|c| c == name) {
            Some(TypeKind::ClientClass)
        } else if self.listeners.iter().any(|l| l == name) {
            Some(TypeKind::Listener)
        } else if self.types.iter().any(|t| t == name) {
            Some(TypeKind::Other)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_package_ignores_version() {
        let a = ModuleId::new("acme", "orders", "1.0.0");
        let b = ModuleId::new("acme", "orders", "2.3.1");
        let c = ModuleId::new("acme", "billing", "1.0.0");
        assert!(a.same_package(&b));
        assert!(!a.same_package(&c));
        assert!(!a.same_package(&ModuleId::new("other", "orders", "1.0.0")));
    }

    #[test]
    fn test_display_and_prefix() {
        let id = ModuleId::new("ballerina", "http", "2.10.0");
        assert_eq!(id.to_string(), "ballerina/http:2.10.0");
        assert_eq!(ModuleId::new("acme", "util.strings", "").to_string(), "acme/util.strings");
        assert_eq!(ModuleId::new("acme", "util.strings", "").default_prefix(), "strings");
    }

    #[test]
    fn test_descriptor_kind_lookup() {
        let http = ModuleDescriptor::new("ballerina", "http", "2.10.0")
            .with_clients(["Client"])
            .with_listeners(["Listener"])
            .with_types(["Response"]);
        assert_eq!(http.kind_of("Client"), Some(TypeKind::ClientClass));
        assert_eq!(http.kind_of("Listener"), Some(TypeKind::Listener));
        assert_eq!(http.kind_of("Response"), Some(TypeKind::Other));
        assert_eq!(http.kind_of("Missing"), None);
        assert_eq!(http.prefix(), "http");
    }
}
