use thiserror::Error;

/// Contract violations surfaced by the layer registry.
///
/// Everything a user can trigger (missing anchor, empty title, a container
/// that is not ready yet) is handled locally and never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    #[error("overlay #{0} was mounted before being added to a container")]
    NotRegistered(u64),
}
