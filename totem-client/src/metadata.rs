use cosmwasm_std::Binary;

use totem_registry_api::{AvatarQueryMsg, AvatarTokenId, TokenUriResponse};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::{smart_query_avatar, ChainSession};

/// Base64 header shared by every template PNG. The registry stores the
/// headerless payload; display form re-attaches this prefix.
pub const PNG_BASE64_HEADER: &str = "iVBORw0KGgoAAAANSUhEUgAA";

/// Displayable data URI for a template's stored image payload.
pub fn template_image_uri(image_data: &Binary) -> String {
    format!(
        "data:image/png;base64,{}{}",
        PNG_BASE64_HEADER,
        image_data.to_base64()
    )
}

/// The slice of a token-URI metadata document this client cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Resolve a token URI into its metadata. Inline `data:` URIs (both the
/// raw-JSON and base64 forms) are decoded locally; anything else goes
/// through the session's fetch capability.
pub async fn resolve_token_metadata<S: ChainSession>(
    session: &S,
    uri: &str,
) -> Result<TokenMetadata, ClientError> {
    let document = if let Some(rest) = uri.strip_prefix("data:application/json,") {
        serde_json::from_str(rest).map_err(|err| ClientError::Decode(err.to_string()))?
    } else if uri.starts_with("data:") {
        let payload = uri
            .split_once(',')
            .map(|(_, rest)| rest)
            .ok_or_else(|| ClientError::Decode("data URI has no payload".to_string()))?;
        let raw = Binary::from_base64(payload)
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        serde_json::from_slice(raw.as_slice())
            .map_err(|err| ClientError::Decode(err.to_string()))?
    } else {
        session.fetch_json(uri).await?
    };

    Ok(parse_document(&document))
}

/// Resolve an avatar's token URI into its metadata document.
pub async fn resolve_avatar_metadata<S: ChainSession>(
    session: &S,
    config: &ClientConfig,
    token_id: AvatarTokenId,
) -> Result<TokenMetadata, ClientError> {
    let response: TokenUriResponse = smart_query_avatar(
        session,
        &config.avatar_registry,
        &AvatarQueryMsg::TokenUri { token_id },
    )
    .await?;
    resolve_token_metadata(session, &response.token_uri).await
}

fn parse_document(document: &serde_json::Value) -> TokenMetadata {
    let field = |key: &str| {
        document
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };
    TokenMetadata {
        name: field("name"),
        image: field("image"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_image_uri_has_png_header() {
        let uri = template_image_uri(&Binary::from(b"abc".as_slice()));
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAA"));
        assert!(uri.ends_with("YWJj"));
    }

    #[test]
    fn test_parse_document_extracts_name_and_image() {
        let document: serde_json::Value =
            serde_json::from_str(r#"{"name":"Totem #4","image":"ipfs://img","extra":1}"#).unwrap();
        let metadata = parse_document(&document);
        assert_eq!(metadata.name.as_deref(), Some("Totem #4"));
        assert_eq!(metadata.image.as_deref(), Some("ipfs://img"));
    }

    #[test]
    fn test_parse_document_tolerates_missing_fields() {
        let document: serde_json::Value = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        let metadata = parse_document(&document);
        assert_eq!(metadata.image, None);
    }
}
