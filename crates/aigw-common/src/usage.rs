use serde::{Deserialize, Serialize};

/// Token counters reported to the surrounding filter for accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmTokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    pub cached_input_tokens: u32,
}

impl LlmTokenUsage {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
