use totem_registry_api::{Category, TemplateId};

use crate::composition::Composition;

/// Client-side selection: at most one template choice per slot category.
/// The body pseudo-category carries a fixed default and is never part of
/// the selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub background: Option<TemplateId>,
    pub hairstyle: Option<TemplateId>,
    pub eyes: Option<TemplateId>,
    pub mouth: Option<TemplateId>,
    pub accessory: Option<TemplateId>,
}

impl Selection {
    pub fn get(&self, category: Category) -> Option<TemplateId> {
        match category {
            Category::Background => self.background,
            Category::Hairstyle => self.hairstyle,
            Category::Eyes => self.eyes,
            Category::Mouth => self.mouth,
            Category::Accessory => self.accessory,
            Category::Body => None,
        }
    }

    /// Set a slot choice; `Body` is fixed and ignored.
    pub fn set(&mut self, category: Category, template_id: Option<TemplateId>) {
        match category {
            Category::Background => self.background = template_id,
            Category::Hairstyle => self.hairstyle = template_id,
            Category::Eyes => self.eyes = template_id,
            Category::Mouth => self.mouth = template_id,
            Category::Accessory => self.accessory = template_id,
            Category::Body => {}
        }
    }

    /// Slot categories with no choice yet, in canonical order.
    pub fn missing_slots(&self) -> Vec<Category> {
        Category::SLOTS
            .into_iter()
            .filter(|&c| self.get(c).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_slots().is_empty()
    }
}

/// One entry of a change-set: this category should switch to this template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotChange {
    pub category: Category,
    pub template_id: TemplateId,
}

/// Compute the minimal ordered change-set between the on-chain composition
/// and the local selection.
///
/// A category contributes iff the desired template differs from the
/// template backing the current instance; body never contributes. The
/// empty result is the valid "no changes" outcome — "cannot compute yet"
/// is unrepresentable here because a [`Composition`] only exists once
/// resolution has completed. Pure function; performs no I/O.
pub fn compute_change_set(current: &Composition, desired: &Selection) -> Vec<SlotChange> {
    Category::SLOTS
        .into_iter()
        .filter_map(|category| {
            let template_id = desired.get(category)?;
            if current.template_of(category) == Some(template_id) {
                None
            } else {
                Some(SlotChange {
                    category,
                    template_id,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::ResolvedSlot;
    use totem_registry_api::{AvatarTokenId, InstanceId};

    fn composition(slots: [Option<(u64, u64)>; 5]) -> Composition {
        let resolved = |s: Option<(u64, u64)>| {
            s.map(|(instance, template)| ResolvedSlot {
                instance_id: InstanceId(instance),
                template_id: TemplateId(template),
            })
        };
        Composition {
            token_id: AvatarTokenId(1),
            name: "totem".to_string(),
            background: resolved(slots[0]),
            hairstyle: resolved(slots[1]),
            eyes: resolved(slots[2]),
            mouth: resolved(slots[3]),
            accessory: resolved(slots[4]),
        }
    }

    fn selection(templates: [Option<u64>; 5]) -> Selection {
        Selection {
            background: templates[0].map(TemplateId),
            hairstyle: templates[1].map(TemplateId),
            eyes: templates[2].map(TemplateId),
            mouth: templates[3].map(TemplateId),
            accessory: templates[4].map(TemplateId),
        }
    }

    #[test]
    fn test_identical_selection_yields_empty_change_set() {
        let current = composition([
            Some((11, 1)),
            Some((12, 2)),
            Some((13, 3)),
            Some((14, 4)),
            Some((15, 5)),
        ]);
        let desired = selection([Some(1), Some(2), Some(3), Some(4), Some(5)]);
        assert!(compute_change_set(&current, &desired).is_empty());
    }

    #[test]
    fn test_single_difference_contributes_one_change() {
        let current = composition([
            Some((11, 1)),
            Some((12, 2)),
            Some((13, 3)),
            Some((14, 4)),
            Some((15, 5)),
        ]);
        let desired = selection([Some(1), Some(2), Some(9), Some(4), Some(5)]);
        assert_eq!(
            compute_change_set(&current, &desired),
            vec![SlotChange {
                category: Category::Eyes,
                template_id: TemplateId(9),
            }]
        );
    }

    #[test]
    fn test_unselected_categories_never_contribute() {
        let current = composition([Some((11, 1)), None, None, None, None]);
        let desired = selection([None, None, None, None, None]);
        assert!(compute_change_set(&current, &desired).is_empty());
    }

    #[test]
    fn test_selecting_into_unset_slot_contributes() {
        let current = composition([Some((11, 1)), None, None, None, None]);
        let desired = selection([Some(1), Some(2), None, None, None]);
        assert_eq!(
            compute_change_set(&current, &desired),
            vec![SlotChange {
                category: Category::Hairstyle,
                template_id: TemplateId(2),
            }]
        );
    }

    #[test]
    fn test_change_set_preserves_canonical_order() {
        let current = composition([
            Some((11, 1)),
            Some((12, 2)),
            Some((13, 3)),
            Some((14, 4)),
            Some((15, 5)),
        ]);
        let desired = selection([Some(8), Some(2), Some(9), Some(4), Some(7)]);
        let changes = compute_change_set(&current, &desired);
        let categories: Vec<Category> = changes.iter().map(|c| c.category).collect();
        assert_eq!(
            categories,
            vec![Category::Background, Category::Eyes, Category::Accessory]
        );
    }

    #[test]
    fn test_body_is_never_part_of_selection_or_diff() {
        let mut selection = Selection::default();
        selection.set(Category::Body, Some(TemplateId(99)));
        assert_eq!(selection.get(Category::Body), None);
        assert_eq!(selection.missing_slots().len(), 5);
    }
}
