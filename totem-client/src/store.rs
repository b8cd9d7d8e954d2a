use std::collections::BTreeMap;

use cosmwasm_std::Uint128;

use totem_registry_api::{AvatarTokenId, Category, InstanceId, Template, TemplateId};

use crate::catalog::Catalog;
use crate::composition::Composition;
use crate::diff::{compute_change_set, Selection, SlotChange};
use crate::metadata::template_image_uri;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OwnershipState {
    /// Not resolved yet (or invalidated); distinct from "no avatar".
    #[default]
    Unknown,
    Absent,
    Owned(AvatarTokenId),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum CompositionState {
    /// Not resolved yet (or invalidated); consumers must render "loading",
    /// not "unset".
    #[default]
    Unknown,
    Absent,
    Ready(Composition),
}

/// One resolved slot as the presentation layer consumes it.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotView {
    pub instance_id: InstanceId,
    pub template_id: TemplateId,
    pub name: String,
    pub price: Uint128,
    pub image: String,
}

/// Client-side cache of chain truth plus the local selection.
///
/// Resolvers fetch truth; this store holds it. Writes carry the epoch they
/// were started under and are discarded if the store was invalidated in the
/// meantime — a resolver result landing after its consumer moved on must
/// not clobber fresher state. Invalidation happens on confirmed mutations
/// only.
#[derive(Debug, Default)]
pub struct TruthStore {
    epoch: u64,
    ownership: OwnershipState,
    composition: CompositionState,
    catalog: Option<Catalog>,
    /// Templates backing the current composition, inactive ones included.
    slot_templates: BTreeMap<TemplateId, Template>,
    selection: Selection,
}

impl TruthStore {
    pub fn new() -> Self {
        TruthStore::default()
    }

    /// Start a refresh; results must be applied with the returned epoch.
    pub fn begin_refresh(&self) -> u64 {
        self.epoch
    }

    /// Drop cached truth after a confirmed avatar mutation.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.ownership = OwnershipState::Unknown;
        self.composition = CompositionState::Unknown;
        self.slot_templates.clear();
    }

    /// Drop the cached catalog after a confirmed template creation.
    pub fn invalidate_catalog(&mut self) {
        self.epoch += 1;
        self.catalog = None;
    }

    fn current(&self, epoch: u64) -> bool {
        epoch == self.epoch
    }

    pub fn apply_ownership(&mut self, epoch: u64, token: Option<AvatarTokenId>) {
        if !self.current(epoch) {
            return;
        }
        match token {
            Some(token_id) => self.ownership = OwnershipState::Owned(token_id),
            None => {
                self.ownership = OwnershipState::Absent;
                self.composition = CompositionState::Absent;
            }
        }
    }

    pub fn apply_composition(&mut self, epoch: u64, composition: Composition) {
        if self.current(epoch) {
            self.composition = CompositionState::Ready(composition);
        }
    }

    pub fn apply_slot_templates(&mut self, epoch: u64, templates: Vec<Template>) {
        if self.current(epoch) {
            self.slot_templates = templates
                .into_iter()
                .map(|t| (t.template_id, t))
                .collect();
        }
    }

    pub fn apply_catalog(&mut self, epoch: u64, catalog: Catalog) {
        if self.current(epoch) {
            self.catalog = Some(catalog);
        }
    }

    // ─── Derived state ──────────────────────────────────────────────────

    /// `None` while ownership is unresolved.
    pub fn has_avatar(&self) -> Option<bool> {
        match self.ownership {
            OwnershipState::Unknown => None,
            OwnershipState::Absent => Some(false),
            OwnershipState::Owned(_) => Some(true),
        }
    }

    pub fn ownership(&self) -> OwnershipState {
        self.ownership
    }

    pub fn composition(&self) -> &CompositionState {
        &self.composition
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Record a selection event. `Body` is fixed and ignored.
    pub fn select(&mut self, category: Category, template_id: Option<TemplateId>) {
        self.selection.set(category, template_id);
    }

    pub fn catalog(&self, category: Category) -> &[Template] {
        self.catalog
            .as_ref()
            .map(|c| c.templates(category))
            .unwrap_or_default()
    }

    /// The change-set the current selection implies. `None` until the
    /// composition is resolved — an empty list means "genuinely no
    /// changes", never "not computed yet".
    pub fn pending_change_set(&self) -> Option<Vec<SlotChange>> {
        match &self.composition {
            CompositionState::Ready(composition) => {
                Some(compute_change_set(composition, &self.selection))
            }
            _ => None,
        }
    }

    /// Display view of one resolved slot, if set.
    pub fn slot_view(&self, category: Category) -> Option<SlotView> {
        let CompositionState::Ready(composition) = &self.composition else {
            return None;
        };
        let slot = composition.slot(category)?;
        let template = self.slot_templates.get(&slot.template_id)?;
        Some(SlotView {
            instance_id: slot.instance_id,
            template_id: slot.template_id,
            name: template.name.clone(),
            price: template.price,
            image: template_image_uri(&template.image_data),
        })
    }

    /// Sum of the selected templates' catalog prices, for pre-mint display.
    pub fn selection_total(&self) -> Uint128 {
        let Some(catalog) = &self.catalog else {
            return Uint128::zero();
        };
        Category::SLOTS
            .iter()
            .filter_map(|&category| {
                let template_id = self.selection.get(category)?;
                catalog.find(category, template_id).map(|t| t.price)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::ResolvedSlot;
    use cosmwasm_std::{Addr, Binary};

    fn template(id: u64, category: Category, price: u128) -> Template {
        Template {
            template_id: TemplateId(id),
            name: format!("template-{id}"),
            creator: Addr::unchecked("creator"),
            category,
            price: Uint128::new(price),
            max_supply: 100,
            current_supply: 1,
            is_active: true,
            image_data: Binary::from(b"img".as_slice()),
        }
    }

    fn ready_composition() -> Composition {
        Composition {
            token_id: AvatarTokenId(1),
            name: "totem".to_string(),
            background: Some(ResolvedSlot {
                instance_id: InstanceId(21),
                template_id: TemplateId(1),
            }),
            hairstyle: None,
            eyes: None,
            mouth: None,
            accessory: None,
        }
    }

    #[test]
    fn test_stale_apply_is_discarded() {
        let mut store = TruthStore::new();
        let epoch = store.begin_refresh();
        store.invalidate();
        store.apply_ownership(epoch, Some(AvatarTokenId(1)));
        assert_eq!(store.has_avatar(), None);
    }

    #[test]
    fn test_absent_ownership_clears_composition() {
        let mut store = TruthStore::new();
        let epoch = store.begin_refresh();
        store.apply_composition(epoch, ready_composition());
        store.apply_ownership(epoch, None);
        assert_eq!(store.has_avatar(), Some(false));
        assert_eq!(store.composition(), &CompositionState::Absent);
    }

    #[test]
    fn test_pending_change_set_requires_resolved_composition() {
        let mut store = TruthStore::new();
        store.select(Category::Eyes, Some(TemplateId(9)));
        assert_eq!(store.pending_change_set(), None);

        let epoch = store.begin_refresh();
        store.apply_ownership(epoch, Some(AvatarTokenId(1)));
        store.apply_composition(epoch, ready_composition());
        let changes = store.pending_change_set().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].category, Category::Eyes);
    }

    #[test]
    fn test_slot_view_joins_template_record() {
        let mut store = TruthStore::new();
        let epoch = store.begin_refresh();
        store.apply_composition(epoch, ready_composition());
        store.apply_slot_templates(epoch, vec![template(1, Category::Background, 10)]);

        let view = store.slot_view(Category::Background).unwrap();
        assert_eq!(view.instance_id, InstanceId(21));
        assert_eq!(view.price, Uint128::new(10));
        assert!(view.image.starts_with("data:image/png;base64,"));
        assert_eq!(store.slot_view(Category::Eyes), None);
    }

    #[test]
    fn test_selection_total_sums_catalog_prices() {
        let mut store = TruthStore::new();
        let epoch = store.begin_refresh();
        store.apply_catalog(
            epoch,
            Catalog {
                background: vec![template(1, Category::Background, 10)],
                hairstyle: vec![template(2, Category::Hairstyle, 20)],
                eyes: vec![],
                mouth: vec![],
                accessory: vec![],
            },
        );
        store.select(Category::Background, Some(TemplateId(1)));
        store.select(Category::Hairstyle, Some(TemplateId(2)));
        assert_eq!(store.selection_total(), Uint128::new(30));
    }
}
