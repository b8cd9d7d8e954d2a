use cosmwasm_std::Addr;

use totem_registry_api::{AvatarQueryMsg, AvatarTokenId, BalanceResponse, TokenResponse};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::{smart_query_avatar, ChainSession};

/// Resolve the avatar owned by `owner`, if any.
///
/// Zero balance short-circuits without issuing the index lookup. The
/// registry enforces at most one token per owner, so index 0 is the unique
/// token whenever the balance is nonzero; a failing index-0 read at that
/// point is a contract/client inconsistency, not "no avatar".
pub async fn resolve_owned_avatar<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    owner: &Addr,
) -> Result<Option<AvatarTokenId>, ClientError> {
    let balance: BalanceResponse = smart_query_avatar(
        session,
        &config.avatar_registry,
        &AvatarQueryMsg::BalanceOf {
            owner: owner.to_string(),
        },
    )
    .await?;

    if balance.balance == 0 {
        return Ok(None);
    }

    let token: TokenResponse = smart_query_avatar(
        session,
        &config.avatar_registry,
        &AvatarQueryMsg::TokenOfOwnerByIndex {
            owner: owner.to_string(),
            index: 0,
        },
    )
    .await
    .map_err(|err| {
        ClientError::OwnershipResolution(format!(
            "balance of {owner} is nonzero but token index 0 failed: {err}"
        ))
    })?;

    Ok(Some(token.token_id))
}

/// An entry of the global avatar enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MintedAvatar {
    pub token_id: AvatarTokenId,
    pub owner: Addr,
}

/// List every minted avatar with its owner, in insertion order.
pub async fn list_minted_avatars<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
) -> Result<Vec<MintedAvatar>, ClientError> {
    use totem_registry_api::{NumTokensResponse, OwnerOfResponse};

    let supply: NumTokensResponse = smart_query_avatar(
        session,
        &config.avatar_registry,
        &AvatarQueryMsg::TotalSupply {},
    )
    .await?;

    let mut minted = Vec::with_capacity(supply.count as usize);
    for index in 0..supply.count {
        let token: TokenResponse = smart_query_avatar(
            session,
            &config.avatar_registry,
            &AvatarQueryMsg::TokenByIndex { index },
        )
        .await?;
        let owner: OwnerOfResponse = smart_query_avatar(
            session,
            &config.avatar_registry,
            &AvatarQueryMsg::OwnerOf {
                token_id: token.token_id,
            },
        )
        .await?;
        minted.push(MintedAvatar {
            token_id: token.token_id,
            owner: owner.owner,
        });
    }

    Ok(minted)
}
