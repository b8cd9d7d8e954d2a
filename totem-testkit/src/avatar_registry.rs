//! In-memory stand-in for the avatar registry contract: one soulbound
//! avatar per wallet, slot reassignment, rename, burn, and enumeration.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Order, Response, StdError,
    StdResult,
};
use cw2::set_contract_version;
use cw_storage_plus::{Item, Map};
use thiserror::Error;

use totem_registry_api::{
    AvatarData, AvatarInstantiateMsg, AvatarTokenId, BalanceResponse, NumTokensResponse,
    OwnerOfResponse, SlotInstances, TokenResponse, TokenUriResponse,
};

const CONTRACT_NAME: &str = "crates.io:totem-avatar-registry";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Error, Debug, PartialEq)]
pub enum AvatarRegistryError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{owner} already owns an avatar")]
    AlreadyOwnsAvatar { owner: Addr },

    #[error("avatar not found: {token_id}")]
    TokenNotFound { token_id: u64 },

    #[error("unauthorized: only the avatar owner can perform this action")]
    NotTokenOwner,

    #[error("avatar name cannot be empty")]
    EmptyName,
}

#[cw_serde]
pub struct Config {
    pub name: String,
    pub symbol: String,
    pub component_registry: Addr,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const TOKEN_COUNT: Item<u64> = Item::new("token_count");

/// token_id -> avatar record
pub const AVATARS: Map<u64, AvatarData> = Map::new("avatars");

/// token_id -> owner
pub const TOKEN_OWNER: Map<u64, Addr> = Map::new("token_owner");

/// owner -> token_id; the soulbound one-per-wallet invariant lives here
pub const OWNER_TOKEN: Map<&Addr, u64> = Map::new("owner_token");

// ─── Instantiate ────────────────────────────────────────────────────────────

pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: AvatarInstantiateMsg,
) -> Result<Response, AvatarRegistryError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let component_registry = deps.api.addr_validate(&msg.component_registry)?;
    CONFIG.save(
        deps.storage,
        &Config {
            name: msg.name,
            symbol: msg.symbol,
            component_registry,
        },
    )?;
    TOKEN_COUNT.save(deps.storage, &0u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", CONTRACT_NAME))
}

// ─── Execute ────────────────────────────────────────────────────────────────

/// Record a freshly minted avatar. The component side (payment check and
/// instance minting) has already run; `slots` carries the assigned
/// instance ids.
pub fn execute_create_avatar(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    name: String,
    slots: SlotInstances,
) -> Result<Response, AvatarRegistryError> {
    if name.trim().is_empty() {
        return Err(AvatarRegistryError::EmptyName);
    }
    if OWNER_TOKEN.may_load(deps.storage, &info.sender)?.is_some() {
        return Err(AvatarRegistryError::AlreadyOwnsAvatar {
            owner: info.sender,
        });
    }

    let mut count = TOKEN_COUNT.load(deps.storage)?;
    count += 1;

    AVATARS.save(deps.storage, count, &AvatarData { name, slots })?;
    TOKEN_OWNER.save(deps.storage, count, &info.sender)?;
    OWNER_TOKEN.save(deps.storage, &info.sender, &count)?;
    TOKEN_COUNT.save(deps.storage, &count)?;

    Ok(Response::new()
        .add_attribute("action", "create_avatar")
        .add_attribute("token_id", count.to_string())
        .add_attribute("owner", info.sender.as_str()))
}

pub fn execute_change_composition(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    token_id: AvatarTokenId,
    slots: SlotInstances,
) -> Result<Response, AvatarRegistryError> {
    let mut avatar = assert_token_owner(deps.as_ref(), token_id, &info.sender)?;
    avatar.slots = slots;
    AVATARS.save(deps.storage, token_id.0, &avatar)?;

    Ok(Response::new()
        .add_attribute("action", "change_composition")
        .add_attribute("token_id", token_id.to_string()))
}

pub fn execute_update_name(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    token_id: AvatarTokenId,
    name: String,
) -> Result<Response, AvatarRegistryError> {
    if name.trim().is_empty() {
        return Err(AvatarRegistryError::EmptyName);
    }
    let mut avatar = assert_token_owner(deps.as_ref(), token_id, &info.sender)?;
    avatar.name = name;
    AVATARS.save(deps.storage, token_id.0, &avatar)?;

    Ok(Response::new()
        .add_attribute("action", "update_name")
        .add_attribute("token_id", token_id.to_string()))
}

/// Burn an avatar. Component instances are untouched and stay with the
/// owner.
pub fn execute_burn(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    token_id: AvatarTokenId,
) -> Result<Response, AvatarRegistryError> {
    assert_token_owner(deps.as_ref(), token_id, &info.sender)?;

    AVATARS.remove(deps.storage, token_id.0);
    TOKEN_OWNER.remove(deps.storage, token_id.0);
    OWNER_TOKEN.remove(deps.storage, &info.sender);

    Ok(Response::new()
        .add_attribute("action", "burn")
        .add_attribute("token_id", token_id.to_string()))
}

fn assert_token_owner(
    deps: Deps,
    token_id: AvatarTokenId,
    sender: &Addr,
) -> Result<AvatarData, AvatarRegistryError> {
    let avatar = AVATARS
        .may_load(deps.storage, token_id.0)?
        .ok_or(AvatarRegistryError::TokenNotFound {
            token_id: token_id.0,
        })?;
    let owner = TOKEN_OWNER.load(deps.storage, token_id.0)?;
    if owner != *sender {
        return Err(AvatarRegistryError::NotTokenOwner);
    }
    Ok(avatar)
}

// ─── Query ──────────────────────────────────────────────────────────────────

pub fn query_balance_of(deps: Deps, owner: String) -> StdResult<Binary> {
    let owner = deps.api.addr_validate(&owner)?;
    let balance = u64::from(OWNER_TOKEN.may_load(deps.storage, &owner)?.is_some());
    to_json_binary(&BalanceResponse { balance })
}

pub fn query_token_of_owner_by_index(deps: Deps, owner: String, index: u64) -> StdResult<Binary> {
    let owner = deps.api.addr_validate(&owner)?;
    if index != 0 {
        return Err(StdError::generic_err("owner index out of range"));
    }
    let token_id = OWNER_TOKEN
        .may_load(deps.storage, &owner)?
        .ok_or_else(|| StdError::generic_err(format!("no avatar for owner {owner}")))?;
    to_json_binary(&TokenResponse {
        token_id: AvatarTokenId(token_id),
    })
}

pub fn query_get_avatar(deps: Deps, token_id: AvatarTokenId) -> StdResult<Binary> {
    let avatar = AVATARS
        .may_load(deps.storage, token_id.0)?
        .ok_or_else(|| StdError::generic_err(format!("avatar not found: {token_id}")))?;
    to_json_binary(&avatar)
}

pub fn query_total_supply(deps: Deps) -> StdResult<Binary> {
    let count = AVATARS
        .keys(deps.storage, None, None, Order::Ascending)
        .count() as u64;
    to_json_binary(&NumTokensResponse { count })
}

pub fn query_token_by_index(deps: Deps, index: u64) -> StdResult<Binary> {
    let token_id = AVATARS
        .keys(deps.storage, None, None, Order::Ascending)
        .nth(index as usize)
        .transpose()?
        .ok_or_else(|| StdError::generic_err("global index out of range"))?;
    to_json_binary(&TokenResponse {
        token_id: AvatarTokenId(token_id),
    })
}

pub fn query_owner_of(deps: Deps, token_id: AvatarTokenId) -> StdResult<Binary> {
    let owner = TOKEN_OWNER
        .may_load(deps.storage, token_id.0)?
        .ok_or_else(|| StdError::generic_err(format!("avatar not found: {token_id}")))?;
    to_json_binary(&OwnerOfResponse { owner })
}

/// Inline data-URI metadata document, the shape the live collection serves.
pub fn query_token_uri(deps: Deps, token_id: AvatarTokenId) -> StdResult<Binary> {
    let avatar = AVATARS
        .may_load(deps.storage, token_id.0)?
        .ok_or_else(|| StdError::generic_err(format!("avatar not found: {token_id}")))?;
    let document = serde_json::json!({
        "name": avatar.name,
        "image": format!("totem://avatar/{token_id}.png"),
    });
    to_json_binary(&TokenUriResponse {
        token_uri: format!("data:application/json,{document}"),
    })
}
