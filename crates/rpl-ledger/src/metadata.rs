//! Transaction metadata: the result code and the state entries a
//! transaction touched.

use rpl_binary::{decode, encode_object, BinaryConfig, EncodeMode, Registry};
use rpl_types::{Amount, Hash256, LedgerEntryType, TransactionResult};
use serde::Deserialize;
use serde_json::Value as Json;

use crate::error::{LedgerError, LedgerResult};
use crate::entry::EntryFields;
use crate::factory::fields_factory;
use crate::object::{as_object, required_tag, FieldMap};

/// What a transaction did to a state entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeAction {
    Created,
    Modified,
    Deleted,
}

impl NodeAction {
    pub const ALL: [NodeAction; 3] = [Self::Created, Self::Modified, Self::Deleted];

    /// Key wrapping the node inside `AffectedNodes`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Created => "CreatedNode",
            Self::Modified => "ModifiedNode",
            Self::Deleted => "DeletedNode",
        }
    }
}

/// One touched state entry with its snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AffectedNode {
    pub ledger_entry_type: LedgerEntryType,
    /// Index of the touched entry.
    pub ledger_index: Option<Hash256>,
    /// State after the transaction; modified and deleted nodes.
    pub final_fields: Option<EntryFields>,
    /// Fields the transaction changed, with their old values.
    pub previous_fields: Option<EntryFields>,
    /// Initial state of a created node.
    pub new_fields: Option<EntryFields>,
    /// Last transaction to modify the entry before this one.
    pub previous_txn_id: Option<Hash256>,
    pub previous_txn_lgr_seq: Option<u32>,
}

/// Snapshot slots in the order they are looked up.
const SNAPSHOTS: [&str; 3] = ["FinalFields", "PreviousFields", "NewFields"];

impl AffectedNode {
    /// Node with no snapshots or links.
    pub fn new(ledger_entry_type: LedgerEntryType) -> Self {
        Self {
            ledger_entry_type,
            ledger_index: None,
            final_fields: None,
            previous_fields: None,
            new_fields: None,
            previous_txn_id: None,
            previous_txn_lgr_seq: None,
        }
    }

    /// Decode a node, building each snapshot with the field set registered
    /// for its `LedgerEntryType`.
    pub fn from_json(value: &Json) -> LedgerResult<Self> {
        let map = as_object(value, "affected node")?;
        let name = required_tag(map, "LedgerEntryType", "affected node")?;
        let no_factory = || LedgerError::NoFieldSetFactory {
            entry_type: name.to_string(),
        };
        let entry_type = LedgerEntryType::from_name(name).map_err(|_| no_factory())?;

        let mut node = Self::new(entry_type);
        node.ledger_index = optional(map, "LedgerIndex")?;
        node.previous_txn_id = optional(map, "PreviousTxnID")?;
        node.previous_txn_lgr_seq = optional(map, "PreviousTxnLgrSeq")?;
        for slot in SNAPSHOTS {
            let Some(snapshot) = map.get(slot).filter(|v| !v.is_null()) else {
                continue;
            };
            let build = fields_factory(entry_type).ok_or_else(no_factory)?;
            let fields = Some(build(snapshot)?);
            match slot {
                "FinalFields" => node.final_fields = fields,
                "PreviousFields" => node.previous_fields = fields,
                _ => node.new_fields = fields,
            }
        }
        Ok(node)
    }

    /// JSON object in the shape of an `AffectedNodes` entry body.
    pub fn to_field_map(&self) -> LedgerResult<FieldMap> {
        let mut map = FieldMap::new();
        map.insert("LedgerEntryType".into(), Json::String(self.ledger_entry_type.name().to_string()));
        if let Some(index) = &self.ledger_index {
            map.insert("LedgerIndex".into(), Json::String(index.to_hex()));
        }
        let snapshots = [&self.final_fields, &self.previous_fields, &self.new_fields];
        for (slot, fields) in SNAPSHOTS.into_iter().zip(snapshots) {
            if let Some(fields) = fields {
                map.insert(slot.into(), Json::Object(fields.to_field_map()?));
            }
        }
        if let Some(id) = &self.previous_txn_id {
            map.insert("PreviousTxnID".into(), Json::String(id.to_hex()));
        }
        if let Some(seq) = self.previous_txn_lgr_seq {
            map.insert("PreviousTxnLgrSeq".into(), Json::from(seq));
        }
        Ok(map)
    }
}

fn optional<T: for<'de> Deserialize<'de>>(map: &FieldMap, key: &str) -> LedgerResult<Option<T>> {
    match map.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(value) => Ok(Some(T::deserialize(value)?)),
    }
}

/// An affected node tagged with what happened to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeEffect {
    pub action: NodeAction,
    pub node: AffectedNode,
}

impl NodeEffect {
    /// Exactly one of the three action keys must be present.
    pub fn from_json(value: &Json) -> LedgerResult<Self> {
        let map = as_object(value, "node effect")?;
        let present: Vec<(NodeAction, &Json)> = NodeAction::ALL
            .into_iter()
            .filter_map(|action| map.get(action.tag()).map(|node| (action, node)))
            .collect();
        match present.as_slice() {
            [(action, node)] => Ok(Self {
                action: *action,
                node: AffectedNode::from_json(node)?,
            }),
            other => Err(LedgerError::InvalidNodeEffect { found: other.len() }),
        }
    }

    /// `{"<Action>Node": {...}}`.
    pub fn to_json(&self) -> LedgerResult<Json> {
        let mut map = FieldMap::new();
        map.insert(self.action.tag().into(), Json::Object(self.node.to_field_map()?));
        Ok(Json::Object(map))
    }
}

/// Metadata recorded for one transaction in a closed ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaData {
    /// Touched entries, in the order the transaction touched them.
    pub affected_nodes: Vec<NodeEffect>,
    /// Position of the transaction within its ledger.
    pub transaction_index: u32,
    pub transaction_result: TransactionResult,
    /// Amount actually delivered, for partial payments.
    pub delivered_amount: Option<Amount>,
}

impl MetaData {
    pub fn new(transaction_index: u32, transaction_result: TransactionResult) -> Self {
        Self {
            affected_nodes: Vec::new(),
            transaction_index,
            transaction_result,
            delivered_amount: None,
        }
    }

    pub fn from_json(value: &Json) -> LedgerResult<Self> {
        Self::from_field_map(as_object(value, "metadata")?)
    }

    /// `TransactionIndex` and `TransactionResult` are required.
    pub fn from_field_map(map: &FieldMap) -> LedgerResult<Self> {
        let transaction_index = optional(map, "TransactionIndex")?.ok_or(LedgerError::MissingTag {
            tag: "TransactionIndex",
            context: "metadata",
        })?;
        let transaction_result = optional(map, "TransactionResult")?.ok_or(LedgerError::MissingTag {
            tag: "TransactionResult",
            context: "metadata",
        })?;
        let affected_nodes = match map.get("AffectedNodes") {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(nodes)) => nodes.iter().map(NodeEffect::from_json).collect::<LedgerResult<_>>()?,
            Some(_) => return Err(LedgerError::NotAnObject("AffectedNodes element")),
        };
        Ok(Self {
            affected_nodes,
            transaction_index,
            transaction_result,
            delivered_amount: optional(map, "DeliveredAmount")?,
        })
    }

    /// JSON object in the `meta` shape.
    pub fn to_field_map(&self) -> LedgerResult<FieldMap> {
        let mut map = FieldMap::new();
        let nodes = self
            .affected_nodes
            .iter()
            .map(NodeEffect::to_json)
            .collect::<LedgerResult<Vec<_>>>()?;
        map.insert("AffectedNodes".into(), Json::Array(nodes));
        map.insert("TransactionIndex".into(), Json::from(self.transaction_index));
        map.insert("TransactionResult".into(), serde_json::to_value(self.transaction_result)?);
        if let Some(amount) = &self.delivered_amount {
            map.insert("DeliveredAmount".into(), serde_json::to_value(amount)?);
        }
        Ok(map)
    }

    /// Canonical binary form, as stored in a transaction tree leaf.
    pub fn to_binary(&self, registry: &Registry) -> LedgerResult<Vec<u8>> {
        Ok(encode_object(registry, &self.to_field_map()?, EncodeMode::Full)?)
    }

    pub fn from_binary(registry: &Registry, bytes: &[u8], config: &BinaryConfig) -> LedgerResult<Self> {
        Self::from_field_map(&decode(registry, bytes, config)?)
    }
}
