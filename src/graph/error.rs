use thiserror::Error;

/// Malformed network input. Stalling during rescue is not an error and never
/// shows up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    #[error("node id {0} is outside the node table")]
    UnknownNodeId(usize),

    #[error("node `{0}` is declared more than once")]
    DuplicateNode(String),

    #[error("node at row {expected} carries id {found}")]
    NodeIdMismatch { expected: usize, found: usize },

    #[error("link connects `{0}` to itself")]
    SelfLink(String),

    #[error("more than one link between `{a}` and `{b}`")]
    DuplicateLink { a: String, b: String },

    #[error("{what} must be a finite non-negative number, got {value}")]
    InvalidQuantity { what: String, value: f64 },

    #[error("flow from `{from}` to `{to}` has no link to travel on")]
    UnlinkedFlow { from: String, to: String },

    #[error("flow of {amount} from `{from}` to `{to}` exceeds link capacity {capacity}")]
    CapacityExceeded {
        from: String,
        to: String,
        amount: f64,
        capacity: f64,
    },
}

pub(crate) fn check_quantity(
    what: impl FnOnce() -> String,
    value: f64,
) -> Result<(), NetworkError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(NetworkError::InvalidQuantity {
            what: what(),
            value,
        })
    }
}
