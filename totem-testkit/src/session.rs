//! An in-memory chain behind the client's [`ChainSession`] trait: both
//! registry fakes, a toy bank, synthesized transaction hashes, and scripting
//! hooks for confirmation delays, signature rejection, and forced reverts.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cosmwasm_std::testing::{message_info, mock_env, MockApi};
use cosmwasm_std::{
    coins, Addr, Binary, Coin, Deps, DepsMut, Empty, Event, MemoryStorage, Querier, QuerierResult,
    QuerierWrapper, Response, StdResult, SystemError, SystemResult, Uint128,
};

use totem_client::{
    ChainSession, ClientConfig, ClientError, ContractCall, RegistryCall, TxHash, TxReceipt,
    TxStatus,
};
use totem_registry_api::{
    AvatarExecuteMsg, AvatarInstantiateMsg, AvatarQueryMsg, Category, ComponentExecuteMsg,
    ComponentInstantiateMsg, ComponentQueryMsg, TemplateId,
};

use crate::avatar_registry;
use crate::component_registry;

/// The test chain never serves cross-contract queries; the session
/// dispatches directly.
struct NoQuerier;

impl Querier for NoQuerier {
    fn raw_query(&self, _bin_request: &[u8]) -> QuerierResult {
        SystemResult::Err(SystemError::UnsupportedRequest {
            kind: "cross-contract query".to_string(),
        })
    }
}

#[derive(Clone, Debug)]
struct RecordedTx {
    receipt: TxReceipt,
    remaining_polls: u32,
}

/// Shared in-memory chain state. Wrap in [`MockChain::into_shared`] and hand
/// out [`MockSession`]s per wallet.
pub struct MockChain {
    api: MockApi,
    avatar_storage: MemoryStorage,
    component_storage: MemoryStorage,
    avatar_addr: Addr,
    component_addr: Addr,
    denom: String,
    creation_fee: Uint128,
    balances: BTreeMap<Addr, Uint128>,
    txs: BTreeMap<String, RecordedTx>,
    tx_counter: u64,
    receipt_delay: u32,
    reject_next_submit: bool,
    revert_next_submit: Option<String>,
    query_log: Vec<String>,
    documents: BTreeMap<String, serde_json::Value>,
}

impl MockChain {
    pub fn new(denom: &str, creation_fee: u128) -> Self {
        let api = MockApi::default();
        let avatar_addr = api.addr_make("totem-avatar-registry");
        let component_addr = api.addr_make("totem-component-registry");
        let creation_fee = Uint128::new(creation_fee);

        let mut chain = MockChain {
            api,
            avatar_storage: MemoryStorage::new(),
            component_storage: MemoryStorage::new(),
            avatar_addr,
            component_addr,
            denom: denom.to_string(),
            creation_fee,
            balances: BTreeMap::new(),
            txs: BTreeMap::new(),
            tx_counter: 0,
            receipt_delay: 0,
            reject_next_submit: false,
            revert_next_submit: None,
            query_log: Vec::new(),
            documents: BTreeMap::new(),
        };

        let deployer = chain.api.addr_make("deployer");
        let info = message_info(&deployer, &[]);
        let querier = NoQuerier;
        component_registry::instantiate(
            DepsMut {
                storage: &mut chain.component_storage,
                api: &chain.api,
                querier: QuerierWrapper::new(&querier),
            },
            mock_env(),
            info.clone(),
            ComponentInstantiateMsg {
                creation_fee: chain.creation_fee,
                denom: chain.denom.clone(),
            },
        )
        .expect("instantiate component registry");
        avatar_registry::instantiate(
            DepsMut {
                storage: &mut chain.avatar_storage,
                api: &chain.api,
                querier: QuerierWrapper::new(&querier),
            },
            mock_env(),
            info,
            AvatarInstantiateMsg {
                name: "Totem Avatars".to_string(),
                symbol: "TOTEM".to_string(),
                component_registry: chain.component_addr.to_string(),
            },
        )
        .expect("instantiate avatar registry");

        chain
    }

    pub fn into_shared(self) -> Arc<Mutex<MockChain>> {
        Arc::new(Mutex::new(self))
    }

    pub fn addr(&self, name: &str) -> Addr {
        self.api.addr_make(name)
    }

    /// Configuration a client needs to talk to this chain.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(
            self.avatar_addr.clone(),
            self.component_addr.clone(),
            self.denom.clone(),
        )
        .with_creation_fee(self.creation_fee)
    }

    pub fn fund(&mut self, name: &str, amount: u128) {
        let addr = self.addr(name);
        let entry = self.balances.entry(addr).or_default();
        *entry += Uint128::new(amount);
    }

    pub fn balance(&self, name: &str) -> Uint128 {
        self.balances
            .get(&self.addr(name))
            .copied()
            .unwrap_or_default()
    }

    /// Publish a template directly, as its creator, bypassing the bank.
    pub fn seed_template(
        &mut self,
        creator: &str,
        category: Category,
        name: &str,
        price: u128,
        max_supply: u64,
    ) -> TemplateId {
        let creator = self.addr(creator);
        let funds = fee_coins(self.creation_fee, &self.denom);
        let info = message_info(&creator, &funds);
        let querier = NoQuerier;
        let response = component_registry::execute_create_template(
            DepsMut {
                storage: &mut self.component_storage,
                api: &self.api,
                querier: QuerierWrapper::new(&querier),
            },
            mock_env(),
            info,
            name.to_string(),
            category,
            max_supply,
            Uint128::new(price),
            Binary::from(name.as_bytes()),
        )
        .expect("seed template");

        let id = response
            .attributes
            .iter()
            .find(|a| a.key == "template_id")
            .and_then(|a| a.value.parse().ok())
            .expect("template_id attribute");
        TemplateId(id)
    }

    /// Flip a seeded template off, as an owner would.
    pub fn deactivate_template(&mut self, template_id: TemplateId) {
        let querier = NoQuerier;
        component_registry::set_template_active(
            DepsMut {
                storage: &mut self.component_storage,
                api: &self.api,
                querier: QuerierWrapper::new(&querier),
            },
            template_id,
            false,
        )
        .expect("deactivate template");
    }

    /// Number of receipt polls that return "not mined yet" before each
    /// transaction surfaces.
    pub fn set_receipt_delay(&mut self, polls: u32) {
        self.receipt_delay = polls;
    }

    /// Make the next submission fail as a declined signature.
    pub fn reject_next_submit(&mut self) {
        self.reject_next_submit = true;
    }

    /// Make the next submission mine as a reverted transaction.
    pub fn revert_next_submit(&mut self, reason: &str) {
        self.revert_next_submit = Some(reason.to_string());
    }

    /// Serve a metadata document at a remote URI.
    pub fn put_document(&mut self, uri: &str, document: serde_json::Value) {
        self.documents.insert(uri.to_string(), document);
    }

    /// Number of transactions submitted so far.
    pub fn tx_count(&self) -> u64 {
        self.tx_counter
    }

    /// Reads issued so far, as `registry.method` entries.
    pub fn query_log(&self) -> &[String] {
        &self.query_log
    }

    pub fn clear_query_log(&mut self) {
        self.query_log.clear();
    }

    // ─── Internals ──────────────────────────────────────────────────────

    fn next_hash(&mut self) -> TxHash {
        self.tx_counter += 1;
        TxHash(format!("0x{:064x}", self.tx_counter))
    }

    fn record(&mut self, hash: &TxHash, status: TxStatus, events: Vec<Event>) {
        self.txs.insert(
            hash.0.clone(),
            RecordedTx {
                receipt: TxReceipt {
                    tx_hash: hash.clone(),
                    status,
                    events,
                },
                remaining_polls: self.receipt_delay,
            },
        );
    }

    fn withdraw(&mut self, sender: &Addr, value: Uint128) -> Result<(), ClientError> {
        if value.is_zero() {
            return Ok(());
        }
        let balance = self.balances.entry(sender.clone()).or_default();
        if *balance < value {
            return Err(ClientError::Read(format!(
                "insufficient funds: {sender} has {balance}, needs {value}"
            )));
        }
        *balance -= value;
        Ok(())
    }

    fn refund(&mut self, sender: &Addr, value: Uint128) {
        if !value.is_zero() {
            let balance = self.balances.entry(sender.clone()).or_default();
            *balance += value;
        }
    }

    fn execute(&mut self, sender: &Addr, call: &ContractCall) -> Result<Response<Empty>, String> {
        let funds = fee_coins(call.value, &self.denom);
        let querier = NoQuerier;

        match &call.call {
            RegistryCall::Avatar(msg) => {
                if call.contract != self.avatar_addr {
                    return Err(format!("unknown contract: {}", call.contract));
                }
                match msg {
                    AvatarExecuteMsg::CreateAvatar { name, templates } => {
                        // Cross-contract step: the component side mints and
                        // assigns against the attached payment first.
                        let slots = component_registry::mint_for_avatar(
                            DepsMut {
                                storage: &mut self.component_storage,
                                api: &self.api,
                                querier: QuerierWrapper::new(&querier),
                            },
                            sender,
                            templates,
                            call.value,
                        )
                        .map_err(|e| e.to_string())?;
                        avatar_registry::execute_create_avatar(
                            DepsMut {
                                storage: &mut self.avatar_storage,
                                api: &self.api,
                                querier: QuerierWrapper::new(&querier),
                            },
                            mock_env(),
                            message_info(sender, &[]),
                            name.clone(),
                            slots,
                        )
                        .map_err(|e| e.to_string())
                    }
                    AvatarExecuteMsg::ChangeComposition { token_id, slots } => {
                        component_registry::assert_owns_instances(
                            Deps {
                                storage: &self.component_storage,
                                api: &self.api,
                                querier: QuerierWrapper::new(&querier),
                            },
                            sender,
                            slots,
                        )
                        .map_err(|e| e.to_string())?;
                        avatar_registry::execute_change_composition(
                            DepsMut {
                                storage: &mut self.avatar_storage,
                                api: &self.api,
                                querier: QuerierWrapper::new(&querier),
                            },
                            mock_env(),
                            message_info(sender, &funds),
                            *token_id,
                            *slots,
                        )
                        .map_err(|e| e.to_string())
                    }
                    AvatarExecuteMsg::UpdateName { token_id, name } => {
                        avatar_registry::execute_update_name(
                            DepsMut {
                                storage: &mut self.avatar_storage,
                                api: &self.api,
                                querier: QuerierWrapper::new(&querier),
                            },
                            mock_env(),
                            message_info(sender, &funds),
                            *token_id,
                            name.clone(),
                        )
                        .map_err(|e| e.to_string())
                    }
                    AvatarExecuteMsg::Burn { token_id } => avatar_registry::execute_burn(
                        DepsMut {
                            storage: &mut self.avatar_storage,
                            api: &self.api,
                            querier: QuerierWrapper::new(&querier),
                        },
                        mock_env(),
                        message_info(sender, &funds),
                        *token_id,
                    )
                    .map_err(|e| e.to_string()),
                }
            }
            RegistryCall::Component(msg) => {
                if call.contract != self.component_addr {
                    return Err(format!("unknown contract: {}", call.contract));
                }
                let deps = DepsMut {
                    storage: &mut self.component_storage,
                    api: &self.api,
                    querier: QuerierWrapper::new(&querier),
                };
                match msg {
                    ComponentExecuteMsg::MintComponents { templates } => {
                        component_registry::execute_mint_components(
                            deps,
                            mock_env(),
                            message_info(sender, &funds),
                            templates.clone(),
                        )
                        .map_err(|e| e.to_string())
                    }
                    ComponentExecuteMsg::CreateTemplate {
                        name,
                        category,
                        max_supply,
                        price,
                        image_data,
                    } => component_registry::execute_create_template(
                        deps,
                        mock_env(),
                        message_info(sender, &funds),
                        name.clone(),
                        *category,
                        *max_supply,
                        *price,
                        image_data.clone(),
                    )
                    .map_err(|e| e.to_string()),
                }
            }
        }
    }

    fn handle_avatar_query(&self, msg: &AvatarQueryMsg) -> StdResult<Binary> {
        let querier = NoQuerier;
        let deps = Deps {
            storage: &self.avatar_storage,
            api: &self.api,
            querier: QuerierWrapper::new(&querier),
        };
        match msg {
            AvatarQueryMsg::BalanceOf { owner } => {
                avatar_registry::query_balance_of(deps, owner.clone())
            }
            AvatarQueryMsg::TokenOfOwnerByIndex { owner, index } => {
                avatar_registry::query_token_of_owner_by_index(deps, owner.clone(), *index)
            }
            AvatarQueryMsg::GetAvatar { token_id } => {
                avatar_registry::query_get_avatar(deps, *token_id)
            }
            AvatarQueryMsg::TotalSupply {} => avatar_registry::query_total_supply(deps),
            AvatarQueryMsg::TokenByIndex { index } => {
                avatar_registry::query_token_by_index(deps, *index)
            }
            AvatarQueryMsg::OwnerOf { token_id } => avatar_registry::query_owner_of(deps, *token_id),
            AvatarQueryMsg::TokenUri { token_id } => {
                avatar_registry::query_token_uri(deps, *token_id)
            }
        }
    }

    fn handle_component_query(&self, msg: &ComponentQueryMsg) -> StdResult<Binary> {
        let querier = NoQuerier;
        let deps = Deps {
            storage: &self.component_storage,
            api: &self.api,
            querier: QuerierWrapper::new(&querier),
        };
        match msg {
            ComponentQueryMsg::TemplatesOfCategory { category } => {
                component_registry::query_templates_of_category(deps, *category)
            }
            ComponentQueryMsg::GetTemplates { template_ids } => {
                component_registry::query_get_templates(deps, template_ids.clone())
            }
            ComponentQueryMsg::GetTokenTemplate { instance_id } => {
                component_registry::query_get_token_template(deps, *instance_id)
            }
            ComponentQueryMsg::GetOwnedInstance { owner, template_id } => {
                component_registry::query_get_owned_instance(deps, owner.clone(), *template_id)
            }
        }
    }
}

fn fee_coins(value: Uint128, denom: &str) -> Vec<Coin> {
    if value.is_zero() {
        Vec::new()
    } else {
        coins(value.u128(), denom)
    }
}

fn avatar_method(msg: &AvatarQueryMsg) -> &'static str {
    match msg {
        AvatarQueryMsg::BalanceOf { .. } => "balance_of",
        AvatarQueryMsg::TokenOfOwnerByIndex { .. } => "token_of_owner_by_index",
        AvatarQueryMsg::GetAvatar { .. } => "get_avatar",
        AvatarQueryMsg::TotalSupply {} => "total_supply",
        AvatarQueryMsg::TokenByIndex { .. } => "token_by_index",
        AvatarQueryMsg::OwnerOf { .. } => "owner_of",
        AvatarQueryMsg::TokenUri { .. } => "token_uri",
    }
}

fn component_method(msg: &ComponentQueryMsg) -> &'static str {
    match msg {
        ComponentQueryMsg::TemplatesOfCategory { .. } => "templates_of_category",
        ComponentQueryMsg::GetTemplates { .. } => "get_templates",
        ComponentQueryMsg::GetTokenTemplate { .. } => "get_token_template",
        ComponentQueryMsg::GetOwnedInstance { .. } => "get_owned_instance",
    }
}

/// One wallet's view of a [`MockChain`].
#[derive(Clone)]
pub struct MockSession {
    chain: Arc<Mutex<MockChain>>,
    sender: Option<Addr>,
}

impl MockSession {
    /// Session for a named wallet.
    pub fn with_wallet(chain: Arc<Mutex<MockChain>>, name: &str) -> Self {
        let sender = chain.lock().expect("mock chain lock").addr(name);
        MockSession {
            chain,
            sender: Some(sender),
        }
    }

    /// Session with no wallet connected.
    pub fn anonymous(chain: Arc<Mutex<MockChain>>) -> Self {
        MockSession {
            chain,
            sender: None,
        }
    }

    pub fn chain(&self) -> &Arc<Mutex<MockChain>> {
        &self.chain
    }

    /// Connected wallet address; panics for anonymous sessions.
    pub fn sender_addr(&self) -> Addr {
        self.sender.clone().expect("session has no wallet")
    }
}

#[async_trait]
impl ChainSession for MockSession {
    fn sender(&self) -> Option<Addr> {
        self.sender.clone()
    }

    async fn query_avatar(
        &self,
        contract: &Addr,
        msg: &AvatarQueryMsg,
    ) -> Result<Binary, ClientError> {
        let mut chain = self.chain.lock().expect("mock chain lock");
        if *contract != chain.avatar_addr {
            return Err(ClientError::Read(format!("unknown contract: {contract}")));
        }
        chain.query_log.push(format!("avatar.{}", avatar_method(msg)));
        chain
            .handle_avatar_query(msg)
            .map_err(|e| ClientError::Read(e.to_string()))
    }

    async fn query_component(
        &self,
        contract: &Addr,
        msg: &ComponentQueryMsg,
    ) -> Result<Binary, ClientError> {
        let mut chain = self.chain.lock().expect("mock chain lock");
        if *contract != chain.component_addr {
            return Err(ClientError::Read(format!("unknown contract: {contract}")));
        }
        chain
            .query_log
            .push(format!("component.{}", component_method(msg)));
        chain
            .handle_component_query(msg)
            .map_err(|e| ClientError::Read(e.to_string()))
    }

    async fn submit(&self, call: ContractCall) -> Result<TxHash, ClientError> {
        let mut chain = self.chain.lock().expect("mock chain lock");
        if chain.reject_next_submit {
            chain.reject_next_submit = false;
            return Err(ClientError::TransactionRejected);
        }
        let sender = self.sender.clone().ok_or(ClientError::NoWallet)?;

        let hash = chain.next_hash();
        if let Some(reason) = chain.revert_next_submit.take() {
            chain.record(&hash, TxStatus::Reverted { reason }, Vec::new());
            return Ok(hash);
        }

        chain.withdraw(&sender, call.value)?;
        match chain.execute(&sender, &call) {
            Ok(response) => {
                let events = vec![Event::new("wasm").add_attributes(response.attributes)];
                chain.record(&hash, TxStatus::Success, events);
            }
            Err(reason) => {
                // A reverted transaction transfers no value.
                chain.refund(&sender, call.value);
                chain.record(&hash, TxStatus::Reverted { reason }, Vec::new());
            }
        }
        Ok(hash)
    }

    async fn receipt(&self, hash: &TxHash) -> Result<Option<TxReceipt>, ClientError> {
        let mut chain = self.chain.lock().expect("mock chain lock");
        match chain.txs.get_mut(&hash.0) {
            Some(tx) if tx.remaining_polls > 0 => {
                tx.remaining_polls -= 1;
                Ok(None)
            }
            Some(tx) => Ok(Some(tx.receipt.clone())),
            None => Ok(None),
        }
    }

    async fn fetch_json(&self, uri: &str) -> Result<serde_json::Value, ClientError> {
        let chain = self.chain.lock().expect("mock chain lock");
        chain
            .documents
            .get(uri)
            .cloned()
            .ok_or_else(|| ClientError::Read(format!("no document at {uri}")))
    }
}
