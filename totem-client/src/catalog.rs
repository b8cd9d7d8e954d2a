use totem_registry_api::{
    Category, ComponentQueryMsg, Template, TemplateId, TemplateIdsResponse, TemplatesResponse,
};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::{smart_query_component, ChainSession};

/// Batch-fetch template records by id, unfiltered. Used both for catalog
/// listings and for resolving templates an avatar already wears — the
/// latter must see inactive entries too.
pub async fn get_templates<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    template_ids: &[TemplateId],
) -> Result<Vec<Template>, ClientError> {
    if template_ids.is_empty() {
        return Ok(Vec::new());
    }
    let response: TemplatesResponse = smart_query_component(
        session,
        &config.component_registry,
        &ComponentQueryMsg::GetTemplates {
            template_ids: template_ids.to_vec(),
        },
    )
    .await?;
    Ok(response.templates)
}

/// List the user-selectable templates of one category: insertion order,
/// inactive and sold-out entries removed.
pub async fn list_templates<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    category: Category,
) -> Result<Vec<Template>, ClientError> {
    let ids: TemplateIdsResponse = smart_query_component(
        session,
        &config.component_registry,
        &ComponentQueryMsg::TemplatesOfCategory { category },
    )
    .await?;

    let templates = get_templates(session, config, &ids.template_ids).await?;
    Ok(templates
        .into_iter()
        .filter(Template::is_mintable)
        .collect())
}

/// The selectable catalog across all five slot categories.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub background: Vec<Template>,
    pub hairstyle: Vec<Template>,
    pub eyes: Vec<Template>,
    pub mouth: Vec<Template>,
    pub accessory: Vec<Template>,
}

impl Catalog {
    pub fn templates(&self, category: Category) -> &[Template] {
        match category {
            Category::Background => &self.background,
            Category::Hairstyle => &self.hairstyle,
            Category::Eyes => &self.eyes,
            Category::Mouth => &self.mouth,
            Category::Accessory => &self.accessory,
            Category::Body => &[],
        }
    }

    pub fn find(&self, category: Category, template_id: TemplateId) -> Option<&Template> {
        self.templates(category)
            .iter()
            .find(|t| t.template_id == template_id)
    }
}

/// Load all five category listings, concurrently in flight.
pub async fn load_catalog<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
) -> Result<Catalog, ClientError> {
    let (background, hairstyle, eyes, mouth, accessory) = tokio::join!(
        list_templates(session, config, Category::Background),
        list_templates(session, config, Category::Hairstyle),
        list_templates(session, config, Category::Eyes),
        list_templates(session, config, Category::Mouth),
        list_templates(session, config, Category::Accessory),
    );

    Ok(Catalog {
        background: background?,
        hairstyle: hairstyle?,
        eyes: eyes?,
        mouth: mouth?,
        accessory: accessory?,
    })
}
