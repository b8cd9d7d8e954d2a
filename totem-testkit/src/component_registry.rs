//! In-memory stand-in for the component registry contract: templates,
//! instances, one-instance-per-(wallet, template) enforcement, and exact
//! payment checks.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdError, StdResult,
    Uint128,
};
use cw2::set_contract_version;
use cw_storage_plus::{Item, Map};
use thiserror::Error;

use totem_registry_api::{
    Category, ComponentInstantiateMsg, InstanceId, OwnedInstanceResponse, SlotInstances,
    SlotTemplates, Template, TemplateId, TemplateIdsResponse, TemplateOfTokenResponse,
    TemplatesResponse,
};

const CONTRACT_NAME: &str = "crates.io:totem-component-registry";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Error, Debug, PartialEq)]
pub enum ComponentRegistryError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("template not found: {template_id}")]
    TemplateNotFound { template_id: u64 },

    #[error("template {template_id} is not active")]
    TemplateInactive { template_id: u64 },

    #[error("template {template_id} is sold out")]
    TemplateSoldOut { template_id: u64 },

    #[error("wrong payment: expected {expected}, got {got}")]
    WrongPayment { expected: Uint128, got: Uint128 },

    #[error("mint list is empty")]
    EmptyBatch,

    #[error("template name cannot be empty")]
    EmptyName,

    #[error("body templates cannot be created")]
    BodyFixed,

    #[error("max supply must be nonzero")]
    ZeroSupply,

    #[error("instance {instance_id} is not owned by {owner}")]
    InstanceNotOwned { instance_id: u64, owner: Addr },
}

#[cw_serde]
pub struct Config {
    pub creation_fee: Uint128,
    pub denom: String,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const TEMPLATE_COUNT: Item<u64> = Item::new("template_count");
pub const INSTANCE_COUNT: Item<u64> = Item::new("instance_count");

/// template_id -> template record
pub const TEMPLATES: Map<u64, Template> = Map::new("templates");

/// category -> template ids, insertion order
pub const CATEGORY_INDEX: Map<&str, Vec<u64>> = Map::new("category_index");

#[cw_serde]
pub struct InstanceRecord {
    pub template_id: u64,
    pub owner: Addr,
}

/// instance_id -> record
pub const INSTANCES: Map<u64, InstanceRecord> = Map::new("instances");

/// (owner, template_id) -> instance_id; at most one per pair
pub const OWNED_INSTANCE: Map<(&Addr, u64), u64> = Map::new("owned_instance");

// ─── Instantiate ────────────────────────────────────────────────────────────

pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: ComponentInstantiateMsg,
) -> Result<Response, ComponentRegistryError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    CONFIG.save(
        deps.storage,
        &Config {
            creation_fee: msg.creation_fee,
            denom: msg.denom,
        },
    )?;
    TEMPLATE_COUNT.save(deps.storage, &0u64)?;
    INSTANCE_COUNT.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", CONTRACT_NAME))
}

// ─── Execute ────────────────────────────────────────────────────────────────

pub fn execute_create_template(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    name: String,
    category: Category,
    max_supply: u64,
    price: Uint128,
    image_data: Binary,
) -> Result<Response, ComponentRegistryError> {
    let config = CONFIG.load(deps.storage)?;
    validate_payment(&info, &config.denom, config.creation_fee)?;

    if name.trim().is_empty() {
        return Err(ComponentRegistryError::EmptyName);
    }
    if !category.is_slot() {
        return Err(ComponentRegistryError::BodyFixed);
    }
    if max_supply == 0 {
        return Err(ComponentRegistryError::ZeroSupply);
    }

    let mut count = TEMPLATE_COUNT.load(deps.storage)?;
    count += 1;

    let template = Template {
        template_id: TemplateId(count),
        name,
        creator: info.sender,
        category,
        price,
        max_supply,
        current_supply: 0,
        is_active: true,
        image_data,
    };
    TEMPLATES.save(deps.storage, count, &template)?;

    let mut index = CATEGORY_INDEX
        .may_load(deps.storage, category.as_str())?
        .unwrap_or_default();
    index.push(count);
    CATEGORY_INDEX.save(deps.storage, category.as_str(), &index)?;
    TEMPLATE_COUNT.save(deps.storage, &count)?;

    Ok(Response::new()
        .add_attribute("action", "create_template")
        .add_attribute("template_id", count.to_string())
        .add_attribute("category", category.as_str()))
}

/// Batch mint: one instance per listed template for the sender. Templates
/// the sender already owns an instance of are skipped without charge;
/// payment must equal the sum of the remaining prices exactly.
pub fn execute_mint_components(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    templates: Vec<TemplateId>,
) -> Result<Response, ComponentRegistryError> {
    if templates.is_empty() {
        return Err(ComponentRegistryError::EmptyBatch);
    }
    let config = CONFIG.load(deps.storage)?;

    // Pass 1: decide what actually mints, and price it, before any write.
    let mut to_mint: Vec<u64> = Vec::with_capacity(templates.len());
    let mut required = Uint128::zero();
    for template_id in &templates {
        let id = template_id.0;
        if to_mint.contains(&id) {
            continue;
        }
        if OWNED_INSTANCE
            .may_load(deps.storage, (&info.sender, id))?
            .is_some()
        {
            continue;
        }
        let template = load_template(deps.as_ref(), id)?;
        assert_mintable(&template)?;
        required += template.price;
        to_mint.push(id);
    }
    validate_payment(&info, &config.denom, required)?;

    let mut minted = Vec::with_capacity(to_mint.len());
    for id in to_mint {
        let instance_id = mint_instance(deps.storage, &info.sender, id)?;
        minted.push(instance_id);
    }

    Ok(Response::new()
        .add_attribute("action", "mint_components")
        .add_attribute("count", minted.len().to_string())
        .add_attribute("to", info.sender.as_str()))
}

/// Avatar-creation support: mint (or reuse) one instance of each of the
/// five chosen templates for `owner` and return the slot assignment. The
/// payment rule here is the avatar-mint rule: the full sum of the five
/// templates' prices, regardless of prior ownership.
pub fn mint_for_avatar(
    deps: DepsMut,
    owner: &Addr,
    templates: &SlotTemplates,
    paid: Uint128,
) -> Result<SlotInstances, ComponentRegistryError> {
    let mut required = Uint128::zero();
    for template_id in templates.as_vec() {
        let template = load_template(deps.as_ref(), template_id.0)?;
        required += template.price;
    }
    if paid != required {
        return Err(ComponentRegistryError::WrongPayment {
            expected: required,
            got: paid,
        });
    }

    let mut slots = SlotInstances::default();
    for category in Category::SLOTS {
        let Some(template_id) = templates.get(category) else {
            continue;
        };
        let instance_id = match OWNED_INSTANCE.may_load(deps.storage, (owner, template_id.0))? {
            Some(existing) => existing,
            None => {
                let template = load_template(deps.as_ref(), template_id.0)?;
                assert_mintable(&template)?;
                mint_instance(deps.storage, owner, template_id.0)?
            }
        };
        slots.set(category, InstanceId(instance_id));
    }
    Ok(slots)
}

/// Composition-change support: every nonzero slot instance must exist and
/// belong to `owner`.
pub fn assert_owns_instances(
    deps: Deps,
    owner: &Addr,
    slots: &SlotInstances,
) -> Result<(), ComponentRegistryError> {
    for category in Category::SLOTS {
        let Some(instance_id) = slots.resolved(category) else {
            continue;
        };
        let record = INSTANCES
            .may_load(deps.storage, instance_id.0)?
            .ok_or(ComponentRegistryError::InstanceNotOwned {
                instance_id: instance_id.0,
                owner: owner.clone(),
            })?;
        if record.owner != *owner {
            return Err(ComponentRegistryError::InstanceNotOwned {
                instance_id: instance_id.0,
                owner: owner.clone(),
            });
        }
    }
    Ok(())
}

/// Test-setup hook mirroring an owner toggling a template off.
pub fn set_template_active(
    deps: DepsMut,
    template_id: TemplateId,
    is_active: bool,
) -> Result<(), ComponentRegistryError> {
    let mut template = load_template(deps.as_ref(), template_id.0)?;
    template.is_active = is_active;
    TEMPLATES.save(deps.storage, template_id.0, &template)?;
    Ok(())
}

fn mint_instance(
    storage: &mut dyn cosmwasm_std::Storage,
    owner: &Addr,
    template_id: u64,
) -> Result<u64, ComponentRegistryError> {
    let mut template = TEMPLATES
        .may_load(storage, template_id)?
        .ok_or(ComponentRegistryError::TemplateNotFound { template_id })?;

    let mut count = INSTANCE_COUNT.load(storage)?;
    count += 1;

    template.current_supply += 1;
    TEMPLATES.save(storage, template_id, &template)?;
    INSTANCES.save(
        storage,
        count,
        &InstanceRecord {
            template_id,
            owner: owner.clone(),
        },
    )?;
    OWNED_INSTANCE.save(storage, (owner, template_id), &count)?;
    INSTANCE_COUNT.save(storage, &count)?;

    Ok(count)
}

fn load_template(deps: Deps, template_id: u64) -> Result<Template, ComponentRegistryError> {
    TEMPLATES
        .may_load(deps.storage, template_id)?
        .ok_or(ComponentRegistryError::TemplateNotFound { template_id })
}

fn assert_mintable(template: &Template) -> Result<(), ComponentRegistryError> {
    if !template.is_active {
        return Err(ComponentRegistryError::TemplateInactive {
            template_id: template.template_id.0,
        });
    }
    if template.is_sold_out() {
        return Err(ComponentRegistryError::TemplateSoldOut {
            template_id: template.template_id.0,
        });
    }
    Ok(())
}

/// Exact-payment check: one coin of the configured denom, or nothing when
/// nothing is owed.
fn validate_payment(
    info: &MessageInfo,
    denom: &str,
    expected: Uint128,
) -> Result<(), ComponentRegistryError> {
    let got = info
        .funds
        .iter()
        .filter(|coin| coin.denom == denom)
        .map(|coin| coin.amount)
        .sum::<Uint128>();
    if got != expected {
        return Err(ComponentRegistryError::WrongPayment { expected, got });
    }
    Ok(())
}

// ─── Query ──────────────────────────────────────────────────────────────────

pub fn query_templates_of_category(deps: Deps, category: Category) -> StdResult<Binary> {
    let ids = CATEGORY_INDEX
        .may_load(deps.storage, category.as_str())?
        .unwrap_or_default();
    to_json_binary(&TemplateIdsResponse {
        template_ids: ids.into_iter().map(TemplateId).collect(),
    })
}

pub fn query_get_templates(deps: Deps, template_ids: Vec<TemplateId>) -> StdResult<Binary> {
    let templates = template_ids
        .iter()
        .map(|id| {
            TEMPLATES
                .may_load(deps.storage, id.0)?
                .ok_or_else(|| StdError::generic_err(format!("template not found: {id}")))
        })
        .collect::<StdResult<Vec<_>>>()?;
    to_json_binary(&TemplatesResponse { templates })
}

pub fn query_get_token_template(deps: Deps, instance_id: InstanceId) -> StdResult<Binary> {
    let record = INSTANCES
        .may_load(deps.storage, instance_id.0)?
        .ok_or_else(|| StdError::generic_err(format!("instance not found: {instance_id}")))?;
    to_json_binary(&TemplateOfTokenResponse {
        template_id: TemplateId(record.template_id),
    })
}

pub fn query_get_owned_instance(
    deps: Deps,
    owner: String,
    template_id: TemplateId,
) -> StdResult<Binary> {
    let owner = deps.api.addr_validate(&owner)?;
    let instance_id = OWNED_INSTANCE
        .may_load(deps.storage, (&owner, template_id.0))?
        .unwrap_or(0);
    to_json_binary(&OwnedInstanceResponse { instance_id })
}
