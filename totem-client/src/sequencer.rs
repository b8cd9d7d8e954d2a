use cosmwasm_std::{Addr, Binary, Uint128};

use totem_registry_api::{
    AvatarExecuteMsg, Category, ComponentExecuteMsg, ComponentQueryMsg, InstanceId,
    OwnedInstanceResponse, SlotTemplates, TemplateId,
};

use crate::catalog::get_templates;
use crate::composition::resolve_composition;
use crate::config::ClientConfig;
use crate::diff::{compute_change_set, Selection, SlotChange};
use crate::error::ClientError;
use crate::ownership::resolve_owned_avatar;
use crate::poll::await_confirmation;
use crate::session::{
    smart_query_component, ChainSession, ContractCall, RegistryCall, TxHash, TxReceipt,
};

/// Placeholder name carried by the mint transaction; renameable afterward.
pub const DEFAULT_AVATAR_NAME: &str = "Unnamed Totem";

/// Logical operation a submitted transaction represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    MintAvatar,
    MintComponentBatch,
    ChangeComposition,
    Burn,
    UpdateName,
    CreateTemplate,
}

/// Sequencer state machine. Exactly one mutation may be in flight per
/// session: submitted transactions race on wallet nonce assignment, so a
/// second attempt is rejected rather than queued behind the signer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MutationPhase {
    #[default]
    Idle,
    CheckingOwnership,
    Minting,
    Changing,
    Burning,
    Renaming,
    CreatingTemplate,
    AwaitingConfirmation { kind: MutationKind, tx_hash: TxHash },
    Confirmed { kind: MutationKind },
    Failed { kind: MutationKind },
}

impl MutationPhase {
    pub fn is_in_flight(&self) -> bool {
        !matches!(
            self,
            MutationPhase::Idle | MutationPhase::Confirmed { .. } | MutationPhase::Failed { .. }
        )
    }
}

/// Confirmed result of a mutation: the receipts of every transaction it
/// took, in submission order (the change path can take two).
#[derive(Clone, Debug, PartialEq)]
pub struct MutationOutcome {
    pub kind: MutationKind,
    pub receipts: Vec<TxReceipt>,
}

/// Parameters for publishing a new component template.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub category: Category,
    pub max_supply: u64,
    pub price: Uint128,
    pub image_data: Binary,
}

/// Drives the multi-step mutation protocols against chain truth. Resolves
/// current state itself immediately before acting; cached views are for
/// display only.
#[derive(Debug, Default)]
pub struct Sequencer {
    phase: MutationPhase,
}

impl Sequencer {
    pub fn new() -> Self {
        Sequencer {
            phase: MutationPhase::Idle,
        }
    }

    pub fn phase(&self) -> &MutationPhase {
        &self.phase
    }

    fn begin(&mut self) -> Result<(), ClientError> {
        if self.phase.is_in_flight() {
            return Err(ClientError::MutationInFlight);
        }
        self.phase = MutationPhase::CheckingOwnership;
        Ok(())
    }

    fn finish<T>(&mut self, kind: MutationKind, result: &Result<T, ClientError>) {
        self.phase = match result {
            Ok(_) => MutationPhase::Confirmed { kind },
            Err(_) => MutationPhase::Failed { kind },
        };
    }

    /// Mint a fresh avatar from a complete five-slot selection. One
    /// transaction carrying the five template ids and a placeholder name,
    /// valued at the sum of the selected templates' prices (body is free
    /// and excluded).
    pub async fn mint<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
        selection: &Selection,
    ) -> Result<MutationOutcome, ClientError> {
        self.begin()?;
        let result = self.run_mint(session, config, selection).await;
        self.finish(MutationKind::MintAvatar, &result);
        result
    }

    async fn run_mint<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
        selection: &Selection,
    ) -> Result<MutationOutcome, ClientError> {
        let sender = session.sender().ok_or(ClientError::NoWallet)?;
        if resolve_owned_avatar(session, config, &sender).await?.is_some() {
            return Err(ClientError::AvatarAlreadyMinted);
        }

        let templates = match (
            selection.background,
            selection.hairstyle,
            selection.eyes,
            selection.mouth,
            selection.accessory,
        ) {
            (Some(background), Some(hairstyle), Some(eyes), Some(mouth), Some(accessory)) => {
                SlotTemplates {
                    background,
                    hairstyle,
                    eyes,
                    mouth,
                    accessory,
                }
            }
            _ => return Err(ClientError::IncompleteSelection(selection.missing_slots())),
        };

        let chosen: Vec<(Category, TemplateId)> = Category::SLOTS
            .iter()
            .filter_map(|&c| templates.get(c).map(|t| (c, t)))
            .collect();
        let value = total_price(session, config, &chosen).await?;

        self.phase = MutationPhase::Minting;
        let receipt = self
            .submit_and_confirm(
                session,
                config,
                MutationKind::MintAvatar,
                ContractCall {
                    contract: config.avatar_registry.clone(),
                    call: RegistryCall::Avatar(AvatarExecuteMsg::CreateAvatar {
                        name: DEFAULT_AVATAR_NAME.to_string(),
                        templates,
                    }),
                    value,
                },
            )
            .await?;

        Ok(MutationOutcome {
            kind: MutationKind::MintAvatar,
            receipts: vec![receipt],
        })
    }

    /// Apply the selection to an existing avatar: acquire the missing
    /// component instances in one batch mint, then reassign the slots.
    ///
    /// The batch mint must confirm before the composition change is
    /// submitted — slot reassignment cannot reference an instance that does
    /// not yet exist on-chain. Templates the wallet already owns are
    /// excluded from the batch and its value: no double charge, no double
    /// supply consumption.
    pub async fn apply_changes<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
        selection: &Selection,
    ) -> Result<MutationOutcome, ClientError> {
        self.begin()?;
        let result = self.run_apply_changes(session, config, selection).await;
        self.finish(MutationKind::ChangeComposition, &result);
        result
    }

    async fn run_apply_changes<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
        selection: &Selection,
    ) -> Result<MutationOutcome, ClientError> {
        let sender = session.sender().ok_or(ClientError::NoWallet)?;
        let token_id = resolve_owned_avatar(session, config, &sender)
            .await?
            .ok_or(ClientError::NoAvatar)?;
        let current = resolve_composition(session, config, token_id).await?;

        let changes = compute_change_set(&current, selection);
        if changes.is_empty() {
            return Err(ClientError::NoChanges);
        }

        self.phase = MutationPhase::Changing;

        // One owned-instance probe per changed category, all in flight at
        // once.
        let probed = probe_owned_instances(session, config, &sender, &changes).await;
        let needed: Vec<SlotChange> = probed
            .iter()
            .filter(|(_, instance)| instance.is_none())
            .map(|(change, _)| *change)
            .collect();

        let mut receipts = Vec::with_capacity(2);
        if !needed.is_empty() {
            let chosen: Vec<(Category, TemplateId)> = needed
                .iter()
                .map(|change| (change.category, change.template_id))
                .collect();
            let value = total_price(session, config, &chosen).await?;

            let receipt = self
                .submit_and_confirm(
                    session,
                    config,
                    MutationKind::MintComponentBatch,
                    ContractCall {
                        contract: config.component_registry.clone(),
                        call: RegistryCall::Component(ComponentExecuteMsg::MintComponents {
                            templates: needed.iter().map(|c| c.template_id).collect(),
                        }),
                        value,
                    },
                )
                .await?;
            receipts.push(receipt);
        }

        // Every changed category must resolve to an owned instance now;
        // re-probe the ones the batch just minted.
        let mut slots = current.current_instances();
        for (change, instance) in &probed {
            if let Some(instance) = instance {
                slots.set(change.category, *instance);
            }
        }
        if !needed.is_empty() {
            let minted = probe_owned_instances(session, config, &sender, &needed).await;
            for (change, instance) in minted {
                let instance = instance.ok_or_else(|| {
                    ClientError::Read(format!(
                        "instance of template {} missing after batch mint confirmation",
                        change.template_id
                    ))
                })?;
                slots.set(change.category, instance);
            }
        }

        let receipt = self
            .submit_and_confirm(
                session,
                config,
                MutationKind::ChangeComposition,
                ContractCall {
                    contract: config.avatar_registry.clone(),
                    call: RegistryCall::Avatar(AvatarExecuteMsg::ChangeComposition {
                        token_id,
                        slots,
                    }),
                    value: Uint128::zero(),
                },
            )
            .await?;
        receipts.push(receipt);

        Ok(MutationOutcome {
            kind: MutationKind::ChangeComposition,
            receipts,
        })
    }

    /// Burn the wallet's avatar. Component instances survive.
    pub async fn burn<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
    ) -> Result<MutationOutcome, ClientError> {
        self.begin()?;
        let result = self.run_burn(session, config).await;
        self.finish(MutationKind::Burn, &result);
        result
    }

    async fn run_burn<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
    ) -> Result<MutationOutcome, ClientError> {
        let sender = session.sender().ok_or(ClientError::NoWallet)?;
        let token_id = resolve_owned_avatar(session, config, &sender)
            .await?
            .ok_or(ClientError::NoAvatar)?;

        self.phase = MutationPhase::Burning;
        let receipt = self
            .submit_and_confirm(
                session,
                config,
                MutationKind::Burn,
                ContractCall {
                    contract: config.avatar_registry.clone(),
                    call: RegistryCall::Avatar(AvatarExecuteMsg::Burn { token_id }),
                    value: Uint128::zero(),
                },
            )
            .await?;

        Ok(MutationOutcome {
            kind: MutationKind::Burn,
            receipts: vec![receipt],
        })
    }

    /// Rename the wallet's avatar.
    pub async fn rename<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
        name: &str,
    ) -> Result<MutationOutcome, ClientError> {
        self.begin()?;
        let result = self.run_rename(session, config, name).await;
        self.finish(MutationKind::UpdateName, &result);
        result
    }

    async fn run_rename<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
        name: &str,
    ) -> Result<MutationOutcome, ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::EmptyName);
        }

        let sender = session.sender().ok_or(ClientError::NoWallet)?;
        let token_id = resolve_owned_avatar(session, config, &sender)
            .await?
            .ok_or(ClientError::NoAvatar)?;

        self.phase = MutationPhase::Renaming;
        let receipt = self
            .submit_and_confirm(
                session,
                config,
                MutationKind::UpdateName,
                ContractCall {
                    contract: config.avatar_registry.clone(),
                    call: RegistryCall::Avatar(AvatarExecuteMsg::UpdateName {
                        token_id,
                        name: name.to_string(),
                    }),
                    value: Uint128::zero(),
                },
            )
            .await?;

        Ok(MutationOutcome {
            kind: MutationKind::UpdateName,
            receipts: vec![receipt],
        })
    }

    /// Publish a new component template, paying the configured creation fee.
    pub async fn create_template<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
        template: NewTemplate,
    ) -> Result<MutationOutcome, ClientError> {
        self.begin()?;
        let result = self.run_create_template(session, config, template).await;
        self.finish(MutationKind::CreateTemplate, &result);
        result
    }

    async fn run_create_template<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
        template: NewTemplate,
    ) -> Result<MutationOutcome, ClientError> {
        if session.sender().is_none() {
            return Err(ClientError::NoWallet);
        }
        if !template.category.is_slot() {
            return Err(ClientError::BodyFixed);
        }
        if template.name.trim().is_empty() {
            return Err(ClientError::EmptyName);
        }

        self.phase = MutationPhase::CreatingTemplate;
        let receipt = self
            .submit_and_confirm(
                session,
                config,
                MutationKind::CreateTemplate,
                ContractCall {
                    contract: config.component_registry.clone(),
                    call: RegistryCall::Component(ComponentExecuteMsg::CreateTemplate {
                        name: template.name,
                        category: template.category,
                        max_supply: template.max_supply,
                        price: template.price,
                        image_data: template.image_data,
                    }),
                    value: config.template_creation_fee,
                },
            )
            .await?;

        Ok(MutationOutcome {
            kind: MutationKind::CreateTemplate,
            receipts: vec![receipt],
        })
    }

    async fn submit_and_confirm<S: ChainSession>(
        &mut self,
        session: &S,
        config: &ClientConfig,
        kind: MutationKind,
        call: ContractCall,
    ) -> Result<TxReceipt, ClientError> {
        let tx_hash = session.submit(call).await?;
        self.phase = MutationPhase::AwaitingConfirmation {
            kind,
            tx_hash: tx_hash.clone(),
        };
        await_confirmation(session, &config.poll, &tx_hash).await
    }
}

/// Fetch the chosen templates and sum their prices, verifying each one is
/// still present, mintable, and of the expected category.
async fn total_price<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    chosen: &[(Category, TemplateId)],
) -> Result<Uint128, ClientError> {
    let ids: Vec<TemplateId> = chosen.iter().map(|(_, t)| *t).collect();
    let templates = get_templates(session, config, &ids).await?;

    let mut total = Uint128::zero();
    for &(category, template_id) in chosen {
        let template = templates
            .iter()
            .find(|t| t.template_id == template_id)
            .filter(|t| t.category == category && t.is_mintable())
            .ok_or(ClientError::TemplateUnavailable {
                category,
                template_id,
            })?;
        total += template.price;
    }
    Ok(total)
}

/// Probe ownership of the desired templates, one concurrent lookup per
/// changed category. The zero sentinel is the primary "not owned" signal;
/// a reverting lookup is mapped to "not owned" as fallback.
async fn probe_owned_instances<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    owner: &Addr,
    changes: &[SlotChange],
) -> Vec<(SlotChange, Option<InstanceId>)> {
    let of = |category: Category| {
        let change = changes.iter().find(|c| c.category == category).copied();
        probe_one(session, config, owner, change)
    };
    let (background, hairstyle, eyes, mouth, accessory) = tokio::join!(
        of(Category::Background),
        of(Category::Hairstyle),
        of(Category::Eyes),
        of(Category::Mouth),
        of(Category::Accessory),
    );

    [background, hairstyle, eyes, mouth, accessory]
        .into_iter()
        .flatten()
        .collect()
}

async fn probe_one<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    owner: &Addr,
    change: Option<SlotChange>,
) -> Option<(SlotChange, Option<InstanceId>)> {
    let change = change?;
    let owned: Result<OwnedInstanceResponse, ClientError> = smart_query_component(
        session,
        &config.component_registry,
        &ComponentQueryMsg::GetOwnedInstance {
            owner: owner.to_string(),
            template_id: change.template_id,
        },
    )
    .await;

    let instance = match owned {
        Ok(response) => InstanceId::from_wire(response.instance_id),
        // Revert-as-not-owned fallback
        Err(_) => None,
    };
    Some((change, instance))
}
