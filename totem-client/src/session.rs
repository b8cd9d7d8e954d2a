use async_trait::async_trait;
use cosmwasm_std::{from_json, Addr, Binary, Event, Uint128};
use serde::de::DeserializeOwned;

use totem_registry_api::{AvatarExecuteMsg, AvatarQueryMsg, ComponentExecuteMsg, ComponentQueryMsg};

use crate::error::ClientError;

/// Transaction hash, opaque to the client.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxHash(pub String);

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A mutation addressed to one of the two registries.
#[derive(Clone, Debug, PartialEq)]
pub enum RegistryCall {
    Avatar(AvatarExecuteMsg),
    Component(ComponentExecuteMsg),
}

/// A transaction ready for signing: target message plus attached native
/// value in base units.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractCall {
    pub contract: Addr,
    pub call: RegistryCall,
    pub value: Uint128,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TxStatus {
    Success,
    Reverted { reason: String },
}

/// Mined-transaction outcome: status plus the contract events it emitted.
#[derive(Clone, Debug, PartialEq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub status: TxStatus,
    pub events: Vec<Event>,
}

/// The single choke point all chain traffic fans out through: reads against
/// the two registry surfaces, transaction submission, receipt lookup, and
/// token-URI fetching. Implementations wrap a wallet/RPC pair; tests
/// substitute an in-memory fake.
///
/// Reads are side-effect-free. Independent reads must be issued
/// concurrently, not sequentially; each one is a network round trip.
#[async_trait]
pub trait ChainSession: Send + Sync {
    /// Currently connected wallet address, if any.
    fn sender(&self) -> Option<Addr>;

    async fn query_avatar(
        &self,
        contract: &Addr,
        msg: &AvatarQueryMsg,
    ) -> Result<Binary, ClientError>;

    async fn query_component(
        &self,
        contract: &Addr,
        msg: &ComponentQueryMsg,
    ) -> Result<Binary, ClientError>;

    /// Sign and broadcast. Returns as soon as the transaction enters the
    /// mempool; confirmation is observed separately via [`Self::receipt`].
    /// A declined signature surfaces as [`ClientError::TransactionRejected`].
    async fn submit(&self, call: ContractCall) -> Result<TxHash, ClientError>;

    /// Receipt lookup; `None` until the transaction is mined.
    async fn receipt(&self, hash: &TxHash) -> Result<Option<TxReceipt>, ClientError>;

    /// Resolve a remote token URI into its JSON metadata document.
    async fn fetch_json(&self, uri: &str) -> Result<serde_json::Value, ClientError>;
}

/// Typed avatar-registry query: issue and decode in one step.
pub(crate) async fn smart_query_avatar<S, R>(
    session: &S,
    contract: &Addr,
    msg: &AvatarQueryMsg,
) -> Result<R, ClientError>
where
    S: ChainSession,
    R: DeserializeOwned,
{
    let raw = session.query_avatar(contract, msg).await?;
    from_json(&raw).map_err(|err| ClientError::Read(err.to_string()))
}

/// Typed component-registry query: issue and decode in one step.
pub(crate) async fn smart_query_component<S, R>(
    session: &S,
    contract: &Addr,
    msg: &ComponentQueryMsg,
) -> Result<R, ClientError>
where
    S: ChainSession,
    R: DeserializeOwned,
{
    let raw = session.query_component(contract, msg).await?;
    from_json(&raw).map_err(|err| ClientError::Read(err.to_string()))
}
