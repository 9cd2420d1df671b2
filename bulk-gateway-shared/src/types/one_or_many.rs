//! Single-item-or-list arguments.

use crate::types::document::Document;

/// An argument that is either a single item or a list of items.
///
/// Gateway batch operations take `impl Into<OneOrMany<T>>` so callers can pass a
/// lone id or document without wrapping it in a `Vec`.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Flatten into a list, preserving order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Document> for OneOrMany<Document> {
    fn from(doc: Document) -> Self {
        Self::One(doc)
    }
}

impl From<Vec<Document>> for OneOrMany<Document> {
    fn from(docs: Vec<Document>) -> Self {
        Self::Many(docs)
    }
}

impl From<&[Document]> for OneOrMany<Document> {
    fn from(docs: &[Document]) -> Self {
        Self::Many(docs.to_vec())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(id: String) -> Self {
        Self::One(id)
    }
}

impl From<&String> for OneOrMany<String> {
    fn from(id: &String) -> Self {
        Self::One(id.clone())
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(id: &str) -> Self {
        Self::One(id.to_string())
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(ids: Vec<String>) -> Self {
        Self::Many(ids)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(ids: Vec<&str>) -> Self {
        Self::Many(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for OneOrMany<String> {
    fn from(ids: &[String]) -> Self {
        Self::Many(ids.to_vec())
    }
}

impl From<&[&str]> for OneOrMany<String> {
    fn from(ids: &[&str]) -> Self {
        Self::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany<String> {
    fn from(ids: [&str; N]) -> Self {
        Self::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}
