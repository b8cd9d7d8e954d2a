//! Chain-sync and mutation-sequencing engine for TOTEM avatars.
//!
//! Keeps a local view of a wallet's soulbound avatar and its component
//! instances synchronized with the two registry contracts, computes the
//! minimal change-set between the local selection and on-chain truth, and
//! sequences the multi-step mutation protocols (acquire missing components,
//! then reassign slots) through to receipt confirmation.
//!
//! Everything chain-facing goes through the [`ChainSession`] capability
//! trait, injected explicitly so tests can substitute fakes.

pub mod catalog;
pub mod client;
pub mod composition;
pub mod config;
pub mod diff;
pub mod error;
pub mod metadata;
pub mod ownership;
pub mod poll;
pub mod sequencer;
pub mod session;
pub mod store;

pub use catalog::{get_templates, list_templates, load_catalog, Catalog};
pub use client::AvatarClient;
pub use composition::{resolve_composition, Composition, ResolvedSlot};
pub use config::{ClientConfig, PollConfig};
pub use diff::{compute_change_set, Selection, SlotChange};
pub use error::ClientError;
pub use metadata::{
    resolve_avatar_metadata, resolve_token_metadata, template_image_uri, TokenMetadata,
};
pub use ownership::{list_minted_avatars, resolve_owned_avatar, MintedAvatar};
pub use poll::await_confirmation;
pub use sequencer::{
    MutationKind, MutationOutcome, MutationPhase, NewTemplate, Sequencer, DEFAULT_AVATAR_NAME,
};
pub use session::{ChainSession, ContractCall, RegistryCall, TxHash, TxReceipt, TxStatus};
pub use store::{CompositionState, OwnershipState, SlotView, TruthStore};
