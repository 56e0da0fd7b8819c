#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The iterative simulator was handed a previous-position map that lacks
    /// an entry for a node present in the topology. This is a programmer
    /// error at the integration boundary, not a data-quality condition, so it
    /// is surfaced instead of defaulted.
    #[error("previous-position map is missing an entry for node: {node_id}")]
    MissingPosition { node_id: String },

    /// No layout algorithm is registered under the requested name.
    #[error("unknown layout algorithm: {name}")]
    UnknownAlgorithm { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
