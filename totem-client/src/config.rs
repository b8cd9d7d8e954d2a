use std::time::Duration;

use cosmwasm_std::{Addr, Uint128};

/// Receipt-polling bounds. Confirmation waits are a bounded yield-and-poll
/// loop, never a spin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_millis(700),
            max_attempts: 6,
        }
    }
}

/// Everything the resolvers and the sequencer need, injected explicitly so
/// tests can substitute fakes. No ambient globals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub avatar_registry: Addr,
    pub component_registry: Addr,
    /// Native denom payments are made in.
    pub denom: String,
    /// Flat fee attached to template creation.
    pub template_creation_fee: Uint128,
    pub poll: PollConfig,
}

impl ClientConfig {
    pub fn new(avatar_registry: Addr, component_registry: Addr, denom: impl Into<String>) -> Self {
        ClientConfig {
            avatar_registry,
            component_registry,
            denom: denom.into(),
            template_creation_fee: Uint128::zero(),
            poll: PollConfig::default(),
        }
    }

    pub fn with_creation_fee(mut self, fee: Uint128) -> Self {
        self.template_creation_fee = fee;
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}
