use cosmwasm_std::Addr;

use totem_registry_api::{AvatarTokenId, Category, Template, TemplateId};

use crate::catalog::{get_templates, load_catalog};
use crate::composition::{resolve_composition, Composition};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::ownership::resolve_owned_avatar;
use crate::sequencer::{MutationOutcome, MutationPhase, NewTemplate, Sequencer};
use crate::session::ChainSession;
use crate::store::TruthStore;

/// Facade tying the resolvers, the diff engine, the sequencer, and the
/// truth store together behind one session. Mutations invalidate the
/// store on confirmation; [`AvatarClient::refresh`] re-resolves truth.
pub struct AvatarClient<S: ChainSession> {
    session: S,
    config: ClientConfig,
    store: TruthStore,
    sequencer: Sequencer,
}

impl<S: ChainSession> AvatarClient<S> {
    pub fn new(session: S, config: ClientConfig) -> Self {
        AvatarClient {
            session,
            config,
            store: TruthStore::new(),
            sequencer: Sequencer::new(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Read-only derived state for the presentation layer.
    pub fn store(&self) -> &TruthStore {
        &self.store
    }

    pub fn mutation_phase(&self) -> &MutationPhase {
        self.sequencer.phase()
    }

    /// Record a selection event. `Body` is fixed and ignored.
    pub fn select(&mut self, category: Category, template_id: Option<TemplateId>) {
        self.store.select(category, template_id);
    }

    /// Re-resolve chain truth into the store. The catalog loads regardless
    /// of wallet connection; ownership and composition need a sender.
    /// Results are applied under the epoch current at call time, so a
    /// refresh that was overtaken by an invalidation discards its results.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let epoch = self.store.begin_refresh();

        let sender = self.session.sender();
        let (catalog, truth) = tokio::join!(
            load_catalog(&self.session, &self.config),
            resolve_wallet_truth(&self.session, &self.config, sender.as_ref()),
        );

        self.store.apply_catalog(epoch, catalog?);
        if let Some((owned, resolved)) = truth? {
            self.store.apply_ownership(epoch, owned);
            if let Some((composition, templates)) = resolved {
                self.store.apply_composition(epoch, composition);
                self.store.apply_slot_templates(epoch, templates);
            }
        }
        Ok(())
    }

    /// Mint an avatar from the current selection. Resolves on confirmation.
    pub async fn mint(&mut self) -> Result<MutationOutcome, ClientError> {
        let selection = self.store.selection();
        let outcome = self
            .sequencer
            .mint(&self.session, &self.config, &selection)
            .await?;
        self.store.invalidate();
        Ok(outcome)
    }

    /// Apply the current selection to the owned avatar. Resolves once the
    /// final composition-change transaction confirms.
    pub async fn apply_changes(&mut self) -> Result<MutationOutcome, ClientError> {
        let selection = self.store.selection();
        let outcome = self
            .sequencer
            .apply_changes(&self.session, &self.config, &selection)
            .await?;
        self.store.invalidate();
        Ok(outcome)
    }

    /// Burn the owned avatar. Resolves on confirmation.
    pub async fn burn(&mut self) -> Result<MutationOutcome, ClientError> {
        let outcome = self.sequencer.burn(&self.session, &self.config).await?;
        self.store.invalidate();
        Ok(outcome)
    }

    /// Rename the owned avatar. Resolves on confirmation.
    pub async fn rename(&mut self, name: &str) -> Result<MutationOutcome, ClientError> {
        let outcome = self
            .sequencer
            .rename(&self.session, &self.config, name)
            .await?;
        self.store.invalidate();
        Ok(outcome)
    }

    /// Publish a new component template. Resolves on confirmation.
    pub async fn create_template(
        &mut self,
        template: NewTemplate,
    ) -> Result<MutationOutcome, ClientError> {
        let outcome = self
            .sequencer
            .create_template(&self.session, &self.config, template)
            .await?;
        self.store.invalidate_catalog();
        Ok(outcome)
    }
}

type WalletTruth = Option<(Option<AvatarTokenId>, Option<(Composition, Vec<Template>)>)>;

async fn resolve_wallet_truth<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    sender: Option<&Addr>,
) -> Result<WalletTruth, ClientError> {
    let Some(sender) = sender else {
        return Ok(None);
    };

    let owned = resolve_owned_avatar(session, config, sender).await?;
    let Some(token_id) = owned else {
        return Ok(Some((None, None)));
    };

    let composition = resolve_composition(session, config, token_id).await?;
    let templates = get_templates(session, config, &composition.assigned_templates()).await?;
    Ok(Some((owned, Some((composition, templates)))))
}
