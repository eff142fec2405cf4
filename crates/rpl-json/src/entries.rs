use rpl_ledger::LedgerEntry;
use serde_json::Value as Json;
use tracing::debug;

use crate::config::BridgeConfig;
use crate::envelope::{array, object, protocol_fields, EntryEnvelope};
use crate::error::BridgeResult;

/// Decode a state-entry array; each element carries `LedgerEntryType` and
/// its `index`.
pub fn decode_ledger_entries(value: &Json, config: &BridgeConfig) -> BridgeResult<Vec<LedgerEntry>> {
    let elements = array(value, "ledger entries")?;
    let mut entries = Vec::with_capacity(elements.len());
    for element in elements {
        let envelope = EntryEnvelope::sniff(element)?;
        let fields = protocol_fields(object(element, "ledger entry")?);
        entries.push(LedgerEntry::from_field_map(&fields, envelope.index, config.unknown_types)?);
    }
    debug!(count = entries.len(), "decoded ledger entries");
    Ok(entries)
}

/// Encode entries as a JSON array, each carrying its `index`.
pub fn encode_ledger_entries(entries: &[LedgerEntry]) -> BridgeResult<Json> {
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut map = entry.to_field_map()?;
        map.insert("index".into(), Json::String(entry.index().to_hex()));
        out.push(Json::Object(map));
    }
    Ok(Json::Array(out))
}
