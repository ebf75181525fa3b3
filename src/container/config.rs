use serde::{Deserialize, Serialize};

use super::BaseCallSet;

/// Options for [`Container::decode`](super::Container::decode)
///
/// The base-call selection is an explicit value rather than process-wide state,
/// so two views of the same container can use different sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Which base-call set to bundle with the traces
    pub base_calls: BaseCallSet,

    /// Decode the fifth dye channel when the container has one
    pub fifth_channel: bool,

    /// Also decode raw (unprocessed) traces
    pub include_raw: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            base_calls: BaseCallSet::Called,
            fifth_channel: false,
            include_raw: true,
        }
    }
}

impl DecodeConfig {
    /// Select the base-call set
    pub fn with_base_calls(mut self, set: BaseCallSet) -> Self {
        self.base_calls = set;
        self
    }

    /// Enable or disable the fifth dye channel
    pub fn with_fifth_channel(mut self, enabled: bool) -> Self {
        self.fifth_channel = enabled;
        self
    }

    /// Enable or disable raw trace decoding
    pub fn with_raw_traces(mut self, enabled: bool) -> Self {
        self.include_raw = enabled;
        self
    }
}
