use std::fmt;

use crate::error::KitnError;

pub const DEFAULT_NAMESPACE: &str = "@kitn";

/// A parsed `[@namespace/]name[@version]` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    pub namespace: String,
    pub name: String,
    pub version: Option<String>,
}

impl ComponentRef {
    /// Parse a user-supplied reference.
    ///
    /// A leading `@` always introduces a namespace that runs up to the first
    /// `/`. In what remains, the first `@` separates name from version.
    /// Input is taken as-is: callers pass trimmed tokens.
    /// An empty name (`@ns/`, `@ns/@1.0`) or an empty version (`name@`) is
    /// rejected as well.
    pub fn parse(input: &str) -> Result<Self, KitnError> {
        let (namespace, rest) = if input.starts_with('@') {
            let slash = input.find('/').ok_or_else(|| invalid(input, "expected @namespace/name"))?;
            (&input[..slash], &input[slash + 1..])
        } else {
            (DEFAULT_NAMESPACE, input)
        };

        let (name, version) = match rest.find('@') {
            Some(at) => (&rest[..at], Some(&rest[at + 1..])),
            None => (rest, None),
        };

        if name.is_empty() {
            return Err(invalid(input, "missing component name"));
        }
        if version.is_some_and(str::is_empty) {
            return Err(invalid(input, "empty version after '@'"));
        }

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }

    pub fn is_default_namespace(&self) -> bool {
        self.namespace == DEFAULT_NAMESPACE
    }

    /// Key under which the component is recorded in `_installed`.
    ///
    /// Default-namespace components use the bare name; others keep their
    /// namespace so the key parses back into the same reference.
    pub fn install_key(&self) -> String {
        if self.is_default_namespace() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }

    /// Identity used for graph bookkeeping; ignores the version.
    pub fn graph_key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_default_namespace() {
            write!(f, "{}/", self.namespace)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(v) = &self.version {
            write!(f, "@{v}")?;
        }
        Ok(())
    }
}

fn invalid(input: &str, reason: &str) -> KitnError {
    KitnError::InvalidReference {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
