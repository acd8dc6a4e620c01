//! The seven canonical REST operations and the two fixed method tables.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use nestr_core::http::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Index,
    Show,
    Create,
    Update,
    Delete,
    UpdateMany,
    DeleteMany,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Index,
        Operation::Show,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::UpdateMany,
        Operation::DeleteMany,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Index => "index",
            Operation::Show => "show",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::UpdateMany => "update_many",
            Operation::DeleteMany => "delete_many",
        }
    }

    pub(crate) fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation `{}`", self.0)
    }
}

impl std::error::Error for UnknownOperation {}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

/// Whether a request addresses a collection path or an item path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Collection,
    Item,
}

impl Scope {
    /// Translate an HTTP verb through this scope's method table.
    pub fn operation_for(self, method: &Method) -> Option<Operation> {
        match self {
            Scope::Collection => collection_operation(method),
            Scope::Item => item_operation(method),
        }
    }

    /// Verbs that map to `op` in this scope's table.
    pub fn methods_for(self, op: Operation) -> Vec<Method> {
        [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ]
        .into_iter()
        .filter(|m| self.operation_for(m) == Some(op))
        .collect()
    }
}

/// `GET→index, POST→create, PUT/PATCH→update_many, DELETE→delete_many`
pub fn collection_operation(method: &Method) -> Option<Operation> {
    match *method {
        Method::GET => Some(Operation::Index),
        Method::POST => Some(Operation::Create),
        Method::PUT | Method::PATCH => Some(Operation::UpdateMany),
        Method::DELETE => Some(Operation::DeleteMany),
        _ => None,
    }
}

/// `GET→show, POST→create, PUT/PATCH→update, DELETE→delete`
pub fn item_operation(method: &Method) -> Option<Operation> {
    match *method {
        Method::GET => Some(Operation::Show),
        Method::POST => Some(Operation::Create),
        Method::PUT | Method::PATCH => Some(Operation::Update),
        Method::DELETE => Some(Operation::Delete),
        _ => None,
    }
}

/// Derive the operation set of a resource from the HTTP verbs declared on its
/// collection path and on its `/{id}` item path.
///
/// A singular resource has no collection semantics, so its own verbs go
/// through the item table. Verbs outside both tables are ignored.
pub fn allowed_operations_from_methods(
    collection_methods: &[Method],
    item_methods: &[Method],
    singular: bool,
) -> BTreeSet<Operation> {
    let own_scope = if singular { Scope::Item } else { Scope::Collection };
    collection_methods
        .iter()
        .filter_map(|m| own_scope.operation_for(m))
        .chain(item_methods.iter().filter_map(item_operation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_table() {
        assert_eq!(collection_operation(&Method::GET), Some(Operation::Index));
        assert_eq!(collection_operation(&Method::POST), Some(Operation::Create));
        assert_eq!(collection_operation(&Method::PUT), Some(Operation::UpdateMany));
        assert_eq!(collection_operation(&Method::PATCH), Some(Operation::UpdateMany));
        assert_eq!(collection_operation(&Method::DELETE), Some(Operation::DeleteMany));
        assert_eq!(collection_operation(&Method::HEAD), None);
    }

    #[test]
    fn item_table() {
        assert_eq!(item_operation(&Method::GET), Some(Operation::Show));
        assert_eq!(item_operation(&Method::POST), Some(Operation::Create));
        assert_eq!(item_operation(&Method::PUT), Some(Operation::Update));
        assert_eq!(item_operation(&Method::PATCH), Some(Operation::Update));
        assert_eq!(item_operation(&Method::DELETE), Some(Operation::Delete));
        assert_eq!(item_operation(&Method::OPTIONS), None);
    }

    #[test]
    fn names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>(), Ok(op));
        }
        assert!("destroy".parse::<Operation>().is_err());
    }

    #[test]
    fn derives_from_collection_and_item_methods() {
        let ops = allowed_operations_from_methods(
            &[Method::GET, Method::POST, Method::OPTIONS],
            &[Method::GET, Method::PATCH],
            false,
        );
        assert_eq!(
            ops.into_iter().collect::<Vec<_>>(),
            vec![Operation::Index, Operation::Show, Operation::Create, Operation::Update]
        );
    }

    #[test]
    fn singular_uses_item_table_for_own_methods() {
        let ops = allowed_operations_from_methods(&[Method::GET, Method::DELETE], &[], true);
        assert_eq!(
            ops.into_iter().collect::<Vec<_>>(),
            vec![Operation::Show, Operation::Delete]
        );
    }

    #[test]
    fn methods_for_reverses_tables() {
        assert_eq!(
            Scope::Collection.methods_for(Operation::UpdateMany),
            vec![Method::PUT, Method::PATCH]
        );
        assert!(Scope::Item.methods_for(Operation::Index).is_empty());
    }
}
