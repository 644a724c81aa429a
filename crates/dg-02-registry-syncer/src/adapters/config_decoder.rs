//! JSON decoder for capability configuration payloads.

use crate::domain::CapabilityConfiguration;
use crate::ports::outbound::CapabilityConfigDecoder;

/// Decodes payloads stored as the JSON form of `CapabilityConfiguration`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCapabilityConfigDecoder;

impl CapabilityConfigDecoder for JsonCapabilityConfigDecoder {
    fn decode(&self, raw: &[u8]) -> Result<CapabilityConfiguration, String> {
        serde_json::from_slice(raw)
            .map_err(|e| format!("failed to unmarshal capability configuration: {e}"))
    }
}
