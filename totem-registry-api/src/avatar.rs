use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Addr;

use crate::types::{AvatarData, AvatarTokenId, SlotInstances, SlotTemplates};

#[cw_serde]
pub struct AvatarInstantiateMsg {
    /// Collection name
    pub name: String,
    /// Collection symbol
    pub symbol: String,
    /// Component registry this collection draws instances from
    pub component_registry: String,
}

#[cw_serde]
pub enum AvatarExecuteMsg {
    /// Mint the caller's avatar. One per wallet, soulbound. Payment must
    /// cover the sum of the five chosen templates' prices; the registry
    /// mints and assigns the component instances atomically.
    CreateAvatar {
        name: String,
        templates: SlotTemplates,
    },
    /// Reassign the full five-slot state of an owned avatar. Every nonzero
    /// instance must already exist and belong to the caller.
    ChangeComposition {
        token_id: AvatarTokenId,
        slots: SlotInstances,
    },
    /// Rename an owned avatar.
    UpdateName {
        token_id: AvatarTokenId,
        name: String,
    },
    /// Destroy an owned avatar. Component instances survive the burn.
    Burn { token_id: AvatarTokenId },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum AvatarQueryMsg {
    /// Number of avatars held by an address (0 or 1).
    #[returns(BalanceResponse)]
    BalanceOf { owner: String },
    /// Token at `index` of an owner's enumeration. Only index 0 exists.
    #[returns(TokenResponse)]
    TokenOfOwnerByIndex { owner: String, index: u64 },
    #[returns(AvatarData)]
    GetAvatar { token_id: AvatarTokenId },
    #[returns(NumTokensResponse)]
    TotalSupply {},
    /// Token at `index` of the global enumeration, insertion order.
    #[returns(TokenResponse)]
    TokenByIndex { index: u64 },
    #[returns(OwnerOfResponse)]
    OwnerOf { token_id: AvatarTokenId },
    #[returns(TokenUriResponse)]
    TokenUri { token_id: AvatarTokenId },
}

#[cw_serde]
pub struct BalanceResponse {
    pub balance: u64,
}

#[cw_serde]
pub struct TokenResponse {
    pub token_id: AvatarTokenId,
}

#[cw_serde]
pub struct NumTokensResponse {
    pub count: u64,
}

#[cw_serde]
pub struct OwnerOfResponse {
    pub owner: Addr,
}

#[cw_serde]
pub struct TokenUriResponse {
    pub token_uri: String,
}
