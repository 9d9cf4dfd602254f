//! Registry error types

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Card index is not below the registry capacity
    OutOfRange { card: u32, max_cards: usize },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::OutOfRange { card, max_cards } => {
                write!(f, "Card {} out of range (max {})", card, max_cards)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
