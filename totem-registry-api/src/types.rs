use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Uint128};

/// Component slot category. `Body` is a pseudo-category: it has exactly one
/// fixed, free, always-selected default and never participates in minting,
/// pricing, or composition changes.
#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub enum Category {
    Background,
    Hairstyle,
    Eyes,
    Mouth,
    Accessory,
    Body,
}

impl Category {
    /// The five mintable slot categories, in canonical (rendering) order.
    pub const SLOTS: [Category; 5] = [
        Category::Background,
        Category::Hairstyle,
        Category::Eyes,
        Category::Mouth,
        Category::Accessory,
    ];

    pub const fn is_slot(self) -> bool {
        !matches!(self, Category::Body)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Background => "background",
            Category::Hairstyle => "hairstyle",
            Category::Eyes => "eyes",
            Category::Mouth => "mouth",
            Category::Accessory => "accessory",
            Category::Body => "body",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry identifier on the component registry.
#[cw_serde]
#[derive(Copy, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub u64);

/// Minted component unit identifier on the component registry.
#[cw_serde]
#[derive(Copy, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

impl InstanceId {
    /// Decode the wire form, where `0` is the unset/not-owned sentinel.
    pub const fn from_wire(raw: u64) -> Option<InstanceId> {
        if raw == 0 {
            None
        } else {
            Some(InstanceId(raw))
        }
    }
}

/// Avatar token identifier on the avatar registry.
#[cw_serde]
#[derive(Copy, Eq, Hash, PartialOrd, Ord)]
pub struct AvatarTokenId(pub u64);

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for AvatarTokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A component catalog entry.
#[cw_serde]
pub struct Template {
    pub template_id: TemplateId,
    pub name: String,
    pub creator: Addr,
    pub category: Category,
    /// Mint price in native base units.
    pub price: Uint128,
    pub max_supply: u64,
    /// Invariant: `current_supply <= max_supply`.
    pub current_supply: u64,
    /// Gate on further minting. Inactive templates stay resolvable for
    /// avatars that already wear them.
    pub is_active: bool,
    /// Headerless base64 PNG payload; display form re-adds the shared header.
    pub image_data: Binary,
}

impl Template {
    pub fn is_sold_out(&self) -> bool {
        self.current_supply >= self.max_supply
    }

    /// Whether the template belongs in a user-selectable catalog view.
    pub fn is_mintable(&self) -> bool {
        self.is_active && !self.is_sold_out()
    }
}

/// One component instance id per slot, in wire form: `0` means unset.
#[cw_serde]
#[derive(Copy, Default)]
pub struct SlotInstances {
    pub background: u64,
    pub hairstyle: u64,
    pub eyes: u64,
    pub mouth: u64,
    pub accessory: u64,
}

impl SlotInstances {
    pub fn get(&self, category: Category) -> Option<u64> {
        match category {
            Category::Background => Some(self.background),
            Category::Hairstyle => Some(self.hairstyle),
            Category::Eyes => Some(self.eyes),
            Category::Mouth => Some(self.mouth),
            Category::Accessory => Some(self.accessory),
            Category::Body => None,
        }
    }

    /// Set a slot; `Body` has no slot and is left untouched.
    pub fn set(&mut self, category: Category, instance: InstanceId) {
        match category {
            Category::Background => self.background = instance.0,
            Category::Hairstyle => self.hairstyle = instance.0,
            Category::Eyes => self.eyes = instance.0,
            Category::Mouth => self.mouth = instance.0,
            Category::Accessory => self.accessory = instance.0,
            Category::Body => {}
        }
    }

    pub fn resolved(&self, category: Category) -> Option<InstanceId> {
        self.get(category).and_then(InstanceId::from_wire)
    }
}

/// One template id per slot; used by avatar creation, where every slot must
/// be chosen.
#[cw_serde]
#[derive(Copy)]
pub struct SlotTemplates {
    pub background: TemplateId,
    pub hairstyle: TemplateId,
    pub eyes: TemplateId,
    pub mouth: TemplateId,
    pub accessory: TemplateId,
}

impl SlotTemplates {
    pub fn get(&self, category: Category) -> Option<TemplateId> {
        match category {
            Category::Background => Some(self.background),
            Category::Hairstyle => Some(self.hairstyle),
            Category::Eyes => Some(self.eyes),
            Category::Mouth => Some(self.mouth),
            Category::Accessory => Some(self.accessory),
            Category::Body => None,
        }
    }

    pub fn as_vec(&self) -> Vec<TemplateId> {
        Category::SLOTS
            .iter()
            .filter_map(|&c| self.get(c))
            .collect()
    }
}

/// The on-chain avatar record.
#[cw_serde]
pub struct AvatarData {
    pub name: String,
    pub slots: SlotInstances,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_is_not_a_slot() {
        assert!(!Category::Body.is_slot());
        for category in Category::SLOTS {
            assert!(category.is_slot());
        }
        assert!(!Category::SLOTS.contains(&Category::Body));
    }

    #[test]
    fn test_instance_wire_sentinel() {
        assert_eq!(InstanceId::from_wire(0), None);
        assert_eq!(InstanceId::from_wire(7), Some(InstanceId(7)));
    }

    #[test]
    fn test_slot_instances_roundtrip() {
        let mut slots = SlotInstances::default();
        slots.set(Category::Eyes, InstanceId(9));
        assert_eq!(slots.resolved(Category::Eyes), Some(InstanceId(9)));
        assert_eq!(slots.resolved(Category::Mouth), None);
        // Body has no slot to write into
        slots.set(Category::Body, InstanceId(1));
        assert_eq!(slots.get(Category::Body), None);
    }

    #[test]
    fn test_template_mintable_gate() {
        let template = Template {
            template_id: TemplateId(1),
            name: "aurora".to_string(),
            creator: Addr::unchecked("creator"),
            category: Category::Background,
            price: Uint128::new(10),
            max_supply: 2,
            current_supply: 2,
            is_active: true,
            image_data: Binary::default(),
        };
        assert!(template.is_sold_out());
        assert!(!template.is_mintable());
    }
}
