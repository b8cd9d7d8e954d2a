//! Shared message and record types for the two TOTEM registry contracts.
//!
//! The avatar registry holds one soulbound avatar per wallet; the component
//! registry holds the interchangeable component templates and their minted
//! instances. Clients, tests, and the contracts themselves all speak the
//! types defined here.

pub mod avatar;
pub mod component;
pub mod types;

pub use avatar::{
    AvatarExecuteMsg, AvatarInstantiateMsg, AvatarQueryMsg, BalanceResponse, NumTokensResponse,
    OwnerOfResponse, TokenResponse, TokenUriResponse,
};
pub use component::{
    ComponentExecuteMsg, ComponentInstantiateMsg, ComponentQueryMsg, OwnedInstanceResponse,
    TemplateIdsResponse, TemplateOfTokenResponse, TemplatesResponse,
};
pub use types::{
    AvatarData, AvatarTokenId, Category, InstanceId, SlotInstances, SlotTemplates, Template,
    TemplateId,
};
