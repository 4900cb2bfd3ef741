use thiserror::Error;

/// Errors returned by queries that need at least one element.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The tree has no root, so there is no first/last element and no height.
    #[error("the collection is empty")]
    EmptyCollection,
}

/// Shorthand for results of [`Tree`][crate::Tree] queries.
pub type Result<T> = std::result::Result<T, Error>;
