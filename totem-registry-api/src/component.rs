use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Uint128};

use crate::types::{Category, InstanceId, Template, TemplateId};

#[cw_serde]
pub struct ComponentInstantiateMsg {
    /// Fee charged for publishing a new template, in native base units.
    pub creation_fee: Uint128,
    /// Native denom accepted for payments.
    pub denom: String,
}

#[cw_serde]
pub enum ComponentExecuteMsg {
    /// Mint one instance of each listed template for the caller. Templates
    /// the caller already owns an instance of are skipped and not charged;
    /// payment must cover exactly the sum of the remaining prices.
    MintComponents { templates: Vec<TemplateId> },
    /// Publish a new template. Carries the configured creation fee.
    CreateTemplate {
        name: String,
        category: Category,
        max_supply: u64,
        price: Uint128,
        image_data: Binary,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum ComponentQueryMsg {
    /// Template ids of a category, in on-chain insertion order.
    #[returns(TemplateIdsResponse)]
    TemplatesOfCategory { category: Category },
    /// Batch-fetch full template records.
    #[returns(TemplatesResponse)]
    GetTemplates { template_ids: Vec<TemplateId> },
    /// Template an instance was minted from.
    #[returns(TemplateOfTokenResponse)]
    GetTokenTemplate { instance_id: InstanceId },
    /// Instance of `template_id` owned by `owner`; `0` when none is owned.
    #[returns(OwnedInstanceResponse)]
    GetOwnedInstance { owner: String, template_id: TemplateId },
}

#[cw_serde]
pub struct TemplateIdsResponse {
    pub template_ids: Vec<TemplateId>,
}

#[cw_serde]
pub struct TemplatesResponse {
    pub templates: Vec<Template>,
}

#[cw_serde]
pub struct TemplateOfTokenResponse {
    pub template_id: TemplateId,
}

#[cw_serde]
pub struct OwnedInstanceResponse {
    /// Wire sentinel: `0` = not owned.
    pub instance_id: u64,
}
