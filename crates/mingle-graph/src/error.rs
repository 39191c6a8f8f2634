#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("edge references an unknown node: {id}")]
    UnknownNode { id: String },
}

pub type Result<T> = std::result::Result<T, Error>;
