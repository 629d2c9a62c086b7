use crate::domain::cart::CartLine;

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("cart storage error: {0}")]
    Storage(String),
}

/// Pluggable storage side effect for the session cart. Implementations may
/// fail; the cart swallows save errors and keeps its in-memory state.
pub trait CartPersistence: Send {
    fn load(&self) -> Result<Vec<CartLine>, PersistError>;
    fn save(&self, lines: &[CartLine]) -> Result<(), PersistError>;
}
