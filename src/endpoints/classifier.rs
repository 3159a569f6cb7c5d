//! Capability classification: which endpoints become MCP resources and which
//! become tools.

use super::{Endpoint, HttpMethod, McpType};
use crate::generation::utils::to_snake_case;

/// Default capability kind for a method: reads are resources, writes are tools
pub fn classify_method(method: HttpMethod) -> McpType {
    match method {
        HttpMethod::Get | HttpMethod::Head => McpType::Resource,
        HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch | HttpMethod::Delete => {
            McpType::Tool
        }
    }
}

/// Default capability kind for an endpoint; never [`McpType::None`]
pub fn classify(endpoint: &Endpoint) -> McpType {
    classify_method(endpoint.method)
}

/// Generated operation identifier, e.g. `get_pets_by_id` for `GET /pets/{id}`.
///
/// A declared `operationId` wins over the method and path.
pub fn operation_name(endpoint: &Endpoint) -> String {
    if let Some(name) = endpoint
        .operation_id
        .as_deref()
        .map(identifier)
        .filter(|name| !name.is_empty())
    {
        return name;
    }

    let mut parts = vec![endpoint.method.key().to_string()];
    for segment in endpoint.path.split('/').filter(|s| !s.is_empty()) {
        match segment
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(param) => parts.push(format!("by_{}", identifier(param))),
            None => parts.push(identifier(segment)),
        }
    }
    if parts.len() == 1 {
        parts.push("root".to_string());
    }

    identifier(&parts.join("_"))
}

/// snake_case with anything outside `[a-z0-9_]` folded into `_`
fn identifier(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let snake = to_snake_case(&cleaned);
    match snake.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("op_{snake}"),
        _ => snake,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_resources() {
        assert_eq!(classify_method(HttpMethod::Get), McpType::Resource);
        assert_eq!(classify_method(HttpMethod::Head), McpType::Resource);
    }

    #[test]
    fn test_writes_are_tools() {
        for method in [
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ] {
            assert_eq!(classify_method(method), McpType::Tool);
        }
    }

    #[test]
    fn test_classification_is_idempotent() {
        let mut endpoint = Endpoint::new(HttpMethod::Put, "/pets/{id}");
        endpoint.mcp_type = classify(&endpoint);
        assert_eq!(classify(&endpoint), endpoint.mcp_type);
    }

    #[test]
    fn test_operation_name_from_path() {
        let endpoint = Endpoint::new(HttpMethod::Get, "/pets/{petId}/photos");
        assert_eq!(operation_name(&endpoint), "get_pets_by_pet_id_photos");

        let root = Endpoint::new(HttpMethod::Get, "/");
        assert_eq!(operation_name(&root), "get_root");

        let dashed = Endpoint::new(HttpMethod::Delete, "/user-groups/{group-id}");
        assert_eq!(operation_name(&dashed), "delete_user_groups_by_group_id");
    }

    #[test]
    fn test_operation_name_prefers_operation_id() {
        let mut endpoint = Endpoint::new(HttpMethod::Get, "/pets");
        endpoint.operation_id = Some("listPets".to_string());
        assert_eq!(operation_name(&endpoint), "list_pets");

        endpoint.operation_id = Some("2fa.verify".to_string());
        assert_eq!(operation_name(&endpoint), "op_2fa_verify");
    }
}
