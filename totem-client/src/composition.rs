use totem_registry_api::{
    AvatarData, AvatarQueryMsg, AvatarTokenId, Category, ComponentQueryMsg, InstanceId,
    SlotInstances, TemplateId, TemplateOfTokenResponse,
};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::{smart_query_avatar, smart_query_component, ChainSession};

/// A slot resolved down to its backing template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedSlot {
    pub instance_id: InstanceId,
    pub template_id: TemplateId,
}

/// Fully resolved on-chain composition of one avatar. Unset slots are a
/// valid, displayable state (e.g. a freshly traded-away component); callers
/// that have not finished resolving must not conflate "loading" with
/// "unset" — only this type's existence means resolution completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composition {
    pub token_id: AvatarTokenId,
    pub name: String,
    pub background: Option<ResolvedSlot>,
    pub hairstyle: Option<ResolvedSlot>,
    pub eyes: Option<ResolvedSlot>,
    pub mouth: Option<ResolvedSlot>,
    pub accessory: Option<ResolvedSlot>,
}

impl Composition {
    pub fn slot(&self, category: Category) -> Option<ResolvedSlot> {
        match category {
            Category::Background => self.background,
            Category::Hairstyle => self.hairstyle,
            Category::Eyes => self.eyes,
            Category::Mouth => self.mouth,
            Category::Accessory => self.accessory,
            Category::Body => None,
        }
    }

    pub fn template_of(&self, category: Category) -> Option<TemplateId> {
        self.slot(category).map(|slot| slot.template_id)
    }

    /// Wire form of the current slot assignment, for carrying unchanged
    /// slots forward verbatim in a composition change.
    pub fn current_instances(&self) -> SlotInstances {
        let mut slots = SlotInstances::default();
        for category in Category::SLOTS {
            if let Some(resolved) = self.slot(category) {
                slots.set(category, resolved.instance_id);
            }
        }
        slots
    }

    /// Template ids of all set slots, in canonical order.
    pub fn assigned_templates(&self) -> Vec<TemplateId> {
        Category::SLOTS
            .iter()
            .filter_map(|&c| self.template_of(c))
            .collect()
    }
}

/// Resolve an avatar's five slots down to their backing templates.
///
/// Two-phase read: the avatar record (slot instance ids) must arrive before
/// any template-of-instance lookup can be issued, but the five phase-2
/// lookups are mutually parallel. Zero slots skip phase 2 entirely.
pub async fn resolve_composition<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    token_id: AvatarTokenId,
) -> Result<Composition, ClientError> {
    let avatar: AvatarData = smart_query_avatar(
        session,
        &config.avatar_registry,
        &AvatarQueryMsg::GetAvatar { token_id },
    )
    .await?;

    let slots = &avatar.slots;
    let (background, hairstyle, eyes, mouth, accessory) = tokio::join!(
        resolve_slot(session, config, slots.background),
        resolve_slot(session, config, slots.hairstyle),
        resolve_slot(session, config, slots.eyes),
        resolve_slot(session, config, slots.mouth),
        resolve_slot(session, config, slots.accessory),
    );

    Ok(Composition {
        token_id,
        name: avatar.name,
        background: background?,
        hairstyle: hairstyle?,
        eyes: eyes?,
        mouth: mouth?,
        accessory: accessory?,
    })
}

async fn resolve_slot<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    raw: u64,
) -> Result<Option<ResolvedSlot>, ClientError> {
    let Some(instance_id) = InstanceId::from_wire(raw) else {
        return Ok(None);
    };

    let template: TemplateOfTokenResponse = smart_query_component(
        session,
        &config.component_registry,
        &ComponentQueryMsg::GetTokenTemplate { instance_id },
    )
    .await?;

    Ok(Some(ResolvedSlot {
        instance_id,
        template_id: template.template_id,
    }))
}
