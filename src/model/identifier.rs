use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A namespaced identifier of the form `namespace:path`.
///
/// Identifiers name recipes, components, recipe kinds and rule documents.
/// They are cheap to clone, ordered and hashable, and serialize as their
/// string form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    namespace: String,
    path: String,
}

impl Identifier {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Parses `namespace:path`. Both parts must be non-empty and the string
    /// must contain exactly one separator.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let mut parts = s.splitn(2, ':');
        match (parts.next(), parts.next()) {
            (Some(ns), Some(path)) if !ns.is_empty() && !path.is_empty() && !path.contains(':') => {
                Ok(Self::new(ns, path))
            }
            _ => Err(ParseError::InvalidIdentifier(s.to_string())),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> String {
        id.to_string()
    }
}

/// A named category of components, written `#namespace:path` in rule
/// documents. Membership is resolved through a
/// [`RegistryContext`](crate::model::RegistryContext).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(pub Identifier);

impl TagId {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self(Identifier::new(namespace, path))
    }

    /// Parses the `namespace:path` part of a tag reference (without the
    /// leading `#`).
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Identifier::parse(s).map(Self)
    }

    pub fn id(&self) -> &Identifier {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Debug for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
