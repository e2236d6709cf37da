//! Item stack values and their wire encoding.
//!
//! An inventory slot holds either nothing (`None`) or an [`Item`]. Items are
//! immutable values; the inventory and outbound packets each own their copy.

use serde::{Deserialize, Serialize};

use crate::link::LinkError;

/// A stack of items as seen by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Numeric item identity from the host's registry.
    pub id: u32,
    /// Registry / display name, e.g. `"diamond_sword"`.
    pub name: String,
    pub count: u8,
    /// Auxiliary data (damage value, variant).
    pub metadata: u16,
    /// Opaque tag bytes carried on the wire only; ignored by slot comparisons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbt: Option<Vec<u8>>,
}

impl Item {
    pub fn new(id: u32, name: &str, count: u8) -> Self {
        Self {
            id,
            name: name.to_string(),
            count,
            metadata: 0,
            nbt: None,
        }
    }

    pub fn with_metadata(mut self, metadata: u16) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_nbt(mut self, nbt: Vec<u8>) -> Self {
        self.nbt = Some(nbt);
        self
    }
}

/// Structural equality used for the "already there" fast path.
///
/// Compares identity, name, count and metadata. Tag data is a wire detail and
/// does not participate.
pub fn same_stack(a: Option<&Item>, b: Option<&Item>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.id == b.id && a.name == b.name && a.count == b.count && a.metadata == b.metadata
        }
        _ => false,
    }
}

/// Whether an observed slot value acknowledges a requested one.
///
/// A requested empty slot is acknowledged only by an empty slot; otherwise
/// name, count and metadata must agree.
pub fn acknowledges(requested: Option<&Item>, observed: Option<&Item>) -> bool {
    match (requested, observed) {
        (None, observed) => observed.is_none(),
        (Some(_), None) => false,
        (Some(req), Some(obs)) => {
            req.name == obs.name && req.count == obs.count && req.metadata == obs.metadata
        }
    }
}

/// Identity of an item-or-empty, used for rejection detection.
pub fn identity(item: Option<&Item>) -> Option<u32> {
    item.map(|i| i.id)
}

/// Item-or-empty as it travels inside a `set creative slot` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSlot {
    pub present: bool,
    pub item_id: i32,
    pub item_count: u8,
    pub item_damage: u16,
    pub nbt: Option<Vec<u8>>,
}

impl WireSlot {
    pub const EMPTY: WireSlot = WireSlot {
        present: false,
        item_id: -1,
        item_count: 0,
        item_damage: 0,
        nbt: None,
    };
}

impl TryFrom<Option<&Item>> for WireSlot {
    type Error = LinkError;

    /// Fails for ids the signed wire field cannot carry; a negative id would
    /// read back as an empty slot.
    fn try_from(item: Option<&Item>) -> Result<Self, Self::Error> {
        let Some(item) = item else {
            return Ok(WireSlot::EMPTY);
        };
        let item_id =
            i32::try_from(item.id).map_err(|_| LinkError::UnencodableItem { id: item.id })?;
        Ok(WireSlot {
            present: true,
            item_id,
            item_count: item.count,
            item_damage: item.metadata,
            nbt: item.nbt.clone(),
        })
    }
}

impl WireSlot {
    /// Decode back into an item. The wire form has no display name, so the
    /// caller supplies a resolver (usually the host's registry).
    pub fn into_item(self, resolve_name: impl Fn(u32) -> String) -> Option<Item> {
        if !self.present || self.item_id < 0 {
            return None;
        }
        let id = self.item_id as u32;
        Some(Item {
            id,
            name: resolve_name(id),
            count: self.item_count,
            metadata: self.item_damage,
            nbt: self.nbt,
        })
    }
}
