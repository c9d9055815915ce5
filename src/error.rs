use thiserror::Error;

pub type TypeResult<T = ()> = Result<T, TypeError>;

/// Everything that can go wrong while creating, finalizing, or publishing a
/// type object. Finalization failures are wrapped in [`TypeError::Ready`]
/// with the identity of the type that was being readied.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("cannot allocate heap type: budget of {limit} type objects exhausted")]
    Allocation { limit: usize },

    #[error("type '{name}' is not ready")]
    UnreadyBase { name: String },

    #[error("type '{name}' is finalized; its layout is immutable")]
    Finalized { name: String },

    #[error("type '{name}' is not a heap type and has no ht_name slot")]
    NotHeapType { name: String },

    #[error("readying type '{name}' already failed; retrying cannot succeed")]
    Failed { name: String },

    #[error("a type named '{name}' is already exported")]
    DuplicateName { name: String },

    #[error("type '{name}' would participate in an inheritance cycle")]
    BaseCycle { name: String },

    #[error("type '{base}' is not an acceptable base type for '{name}'")]
    UnacceptableBase { name: String, base: String },

    #[error("readying type '{name}' failed")]
    Ready {
        name: String,
        #[source]
        source: Box<TypeError>,
    },
}
