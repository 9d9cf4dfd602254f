//! Registry configuration

/// Maximum number of sound cards the platform supports
pub const MAX_CARDS: usize = 32;

/// Configuration for the device registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Number of card slots; valid card indices are `0..max_cards`
    pub max_cards: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_cards: MAX_CARDS,
        }
    }
}

impl RegistryConfig {
    /// Set the number of card slots (at least one)
    pub fn max_cards(mut self, max_cards: usize) -> Self {
        self.max_cards = max_cards.max(1);
        self
    }
}
