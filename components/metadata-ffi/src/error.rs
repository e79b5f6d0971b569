use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("path {0} does not refer to an item")]
    UnknownPath(usize),

    #[error("item `{0}` is declared more than once")]
    DuplicateItem(String),

    #[error("struct `{0}` has no fields")]
    EmptyStruct(String),

    #[error("field `{field}` of `{item}` has type void")]
    VoidField { item: String, field: String },

    #[error("function `{0}` takes a void argument")]
    VoidInput(String),

    #[error("`{0}` contains itself by value")]
    InfiniteTypeSize(String),

    #[error("unknown target `{0}`")]
    UnknownTarget(String),
}
