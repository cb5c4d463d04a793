//! Function identifiers

use std::fmt;

/// The key naming a function within a namespace
///
/// Two identifiers are equal when both the name and the arity match, so
/// `log/1` and `log/2` are distinct functions that may coexist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    name: String,
    arity: usize,
}

impl Identifier {
    pub fn new<S: Into<String>>(name: S, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of arguments the function accepts
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

#[cfg(test)]
mod test_identifier {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_needs_name_and_arity() {
        assert_eq!(Identifier::new("log", 1), Identifier::new("log", 1));
        assert_ne!(Identifier::new("log", 1), Identifier::new("log", 2));
        assert_ne!(Identifier::new("log", 1), Identifier::new("ln", 1));
    }

    #[test]
    fn test_overloads_hash_separately() {
        let set: HashSet<Identifier> = vec![
            Identifier::new("log", 1),
            Identifier::new("log", 2),
            Identifier::new("log", 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(Identifier::new("atan2", 2).to_string(), "atan2/2");
    }
}
