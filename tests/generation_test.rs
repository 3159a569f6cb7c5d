//! Generation from ingested fixtures across every language backend

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use serde_json::Value as JsonValue;
use tokio_test::assert_ok;

use mcp_forge::application::{config_from_report, generate, generate_from_json, ingest};
use mcp_forge::definition::RawDefinition;
use mcp_forge::generation::{GenerateOptions, Language, ProjectFileSet};
use mcp_forge::server::{Authentication, KeyLocation, ServerConfig};

fn petstore_config(language: Language) -> ServerConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/petstore.openapi.v3.json");
    let content = std::fs::read_to_string(path).expect("fixture exists");
    let report = assert_ok!(ingest(&RawDefinition::new(content)));
    config_from_report(&report, None, language)
}

fn fixed_options() -> GenerateOptions {
    GenerateOptions {
        generated_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
    }
}

fn files_for(config: &ServerConfig) -> ProjectFileSet {
    let outcome = generate(config, &fixed_options());
    assert!(outcome.success, "{:?}", outcome.error);
    outcome.files.expect("files of a successful outcome")
}

fn manifest(files: &ProjectFileSet) -> JsonValue {
    serde_json::from_str(&files.get("mcp-manifest.json").expect("manifest").content).unwrap()
}

fn main_file(language: Language) -> &'static str {
    match language {
        Language::TypeScript => "src/index.ts",
        Language::Python => "main.py",
        Language::Go => "main.go",
        Language::Rust => "src/main.rs",
    }
}

#[test]
fn test_petstore_project_per_language() {
    let expected: [(Language, &[&str]); 4] = [
        (
            Language::TypeScript,
            &["package.json", "tsconfig.json", "src/upstream.ts", "src/handlers/show_pet_by_id.ts"],
        ),
        (
            Language::Python,
            &["requirements.txt", "upstream.py", "handlers/__init__.py", "handlers/list_pets.py"],
        ),
        (Language::Go, &["go.mod", "upstream.go", "create_pets_handler.go"]),
        (Language::Rust, &["Cargo.toml", "src/upstream.rs", "src/handlers/mod.rs", "src/handlers/list_pets.rs"]),
    ];

    for (language, paths) in expected {
        let files = files_for(&petstore_config(language));
        for path in paths.iter().copied().chain([main_file(language), "Dockerfile", "README.md"]) {
            assert!(files.get(path).is_some(), "{language}: missing {path}");
        }
        assert!(files.get("mcp-manifest.json").is_some());
        assert!(files.get("deploy.json").is_some());
        assert!(files.get(".env.example").is_some());
        // no authentication configured, no auth module
        assert!(files.paths().all(|path| !path.contains("auth")), "{language}");
    }
}

#[test]
fn test_route_patterns_follow_each_framework() {
    let cases = [
        (Language::TypeScript, "\"/mcp/resources/pets/:pet_id\""),
        (Language::Python, "\"/mcp/resources/pets/{pet_id}\""),
        (Language::Go, "\"GET /mcp/resources/pets/{PetId}\""),
        (Language::Rust, "\"/mcp/resources/pets/{pet_id}\""),
    ];
    for (language, pattern) in cases {
        let files = files_for(&petstore_config(language));
        let main = &files.get(main_file(language)).unwrap().content;
        assert!(main.contains(pattern), "{language}: {pattern} not in\n{main}");
    }
}

#[test]
fn test_capabilities_match_across_languages() {
    let listings: Vec<(JsonValue, JsonValue)> = Language::all()
        .iter()
        .map(|language| {
            let manifest = manifest(&files_for(&petstore_config(*language)));
            let paths = |kind: &str| -> JsonValue {
                manifest["capabilities"][kind]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|entry| entry["path"].clone())
                    .collect()
            };
            (paths("resources"), paths("tools"))
        })
        .collect();

    assert_eq!(listings[0].0, serde_json::json!(["/pets", "/pets/{petId}"]));
    assert_eq!(listings[0].1, serde_json::json!(["/pets"]));
    assert!(listings.iter().all(|listing| listing == &listings[0]));

    // every root handler lists the same capability paths
    for language in Language::all() {
        let files = files_for(&petstore_config(*language));
        let main = &files.get(main_file(*language)).unwrap().content;
        assert!(main.contains("\"/pets/{petId}\""), "{language}");
    }
}

#[test]
fn test_generation_is_deterministic() {
    for language in Language::all() {
        let config = petstore_config(*language);
        let first = files_for(&config);
        let second = files_for(&config);
        assert_eq!(first.len(), second.len());
        for file in first.iter() {
            assert_eq!(Some(&file.content), second.get(&file.path).map(|f| &f.content), "{}", file.path);
        }
    }
}

#[test]
fn test_api_key_without_name_uses_default_header() {
    for language in Language::all() {
        let config = petstore_config(*language).with_authentication(Authentication::api_key(KeyLocation::Header, None));
        let files = files_for(&config);

        let auth_file = files
            .iter()
            .find(|file| file.path.contains("auth."))
            .unwrap_or_else(|| panic!("{language}: no auth file"));
        assert!(auth_file.content.contains("\"X-API-Key\""), "{language}");

        let manifest = manifest(&files);
        assert_eq!(manifest["authentication"]["type"], "api_key");
        assert_eq!(manifest["authentication"]["name"], "X-API-Key");
        assert!(files.get(".env.example").unwrap().content.contains("MCP_API_KEY="));
    }
}

#[test]
fn test_configuration_document_drives_generation() {
    let document = r#"{
        "name": "Orders",
        "language": "python",
        "authentication": {"type": "Bearer Token"},
        "endpoints": [
            {"method": "GET", "path": "/orders/{orderId}", "parameters": [
                {"name": "orderId", "in": "path", "type": {"kind": "integer"}, "required": true}
            ]},
            {"method": "PATCH", "path": "/orders/{orderId}"}
        ]
    }"#;
    let outcome = assert_ok!(generate_from_json(document, &fixed_options()));
    assert!(outcome.success, "{:?}", outcome.error);

    let files = outcome.files.unwrap();
    let manifest = manifest(&files);
    assert_eq!(manifest["capabilities"]["resources"].as_array().unwrap().len(), 1);
    assert_eq!(manifest["capabilities"]["tools"][0]["method"], "PATCH");
    assert!(files.get("auth.py").unwrap().content.contains("MCP_BEARER_TOKEN"));
}

fn handler_containing<'a>(files: &'a ProjectFileSet, needle: &str) -> &'a str {
    files
        .iter()
        .find(|file| file.path.contains("handler") && file.content.contains(needle))
        .map(|file| file.content.as_str())
        .unwrap_or_else(|| panic!("no handler contains {needle}"))
}

#[test]
fn test_text_around_placeholders_is_matched_by_handlers() {
    let cases = [
        (
            Language::TypeScript,
            "\"/mcp/resources/files/:segment_1\"",
            "matchSegment(req.params[\"segment_1\"] ?? \"\", [\"\", \".json\"])",
        ),
        (
            Language::Python,
            "\"/mcp/resources/files/{segment_1}\"",
            "upstream.match_segment(segment_1, [\"\", \".json\"])",
        ),
        (
            Language::Go,
            "\"GET /mcp/resources/files/{Segment1}\"",
            "matchSegment(r.PathValue(\"Segment1\"), []string{ \"\", \".json\" })",
        ),
        (
            Language::Rust,
            "\"/mcp/resources/files/{segment_1}\"",
            "upstream::match_segment(&path.segment_1, &[\"\", \".json\"])",
        ),
    ];

    for (language, mount, matcher) in cases {
        let document = serde_json::json!({
            "name": "Files",
            "language": language,
            "endpoints": [
                {"method": "GET", "path": "/files/{name}.json"},
                {"method": "POST", "path": "/v1/{name}:cancel", "parameters": [
                    {"name": "name", "in": "path", "type": {"kind": "integer"}, "required": true}
                ]}
            ]
        });
        let outcome = assert_ok!(generate_from_json(&document.to_string(), &fixed_options()));
        assert!(outcome.success, "{language}: {:?}", outcome.error);
        let files = outcome.files.unwrap();

        let main = &files.get(main_file(language)).unwrap().content;
        assert!(main.contains(mount), "{language}: {mount} not in\n{main}");
        assert!(main.contains("\"/files/{name}.json\""), "{language}");
        assert!(main.contains("\"/v1/{name}:cancel\""), "{language}");

        let handler = handler_containing(&files, "\"/files/{name}.json\"");
        assert!(handler.contains(matcher), "{language}: {matcher} not in\n{handler}");
        let cancel = handler_containing(&files, "\"/v1/{name}:cancel\"");
        assert!(cancel.contains("\":cancel\""), "{language}\n{cancel}");

        let manifest = manifest(&files);
        assert_eq!(manifest["capabilities"]["resources"][0]["route"], "/mcp/resources/files/{name}.json");
        assert_eq!(manifest["capabilities"]["tools"][0]["route"], "/mcp/tools/v1/{name}:cancel");
    }
}

#[test]
fn test_python_handler_locals_leave_param_names_free() {
    let document = r#"{
        "name": "Jobs",
        "language": "python",
        "endpoints": [
            {"method": "POST", "path": "/jobs", "parameters": [
                {"name": "path_params", "in": "query", "type": {"kind": "string"}, "required": false},
                {"name": "query", "in": "query", "type": {"kind": "string"}, "required": false},
                {"name": "body", "in": "query", "type": {"kind": "string"}, "required": false},
                {"name": "upstream", "in": "query", "type": {"kind": "string"}, "required": false}
            ]}
        ]
    }"#;
    let outcome = assert_ok!(generate_from_json(document, &fixed_options()));
    assert!(outcome.success, "{:?}", outcome.error);
    let files = outcome.files.unwrap();
    let handler = handler_containing(&files, "\"/jobs\"");

    assert!(handler.contains("    path_params: Optional[str] = Query(None, alias=\"path_params\"),"));
    assert!(handler.contains("    upstream_: Optional[str] = Query(None, alias=\"upstream\"),"));
    assert!(handler.contains("    _path_params = {  }"), "{handler}");
    assert!(handler.contains("\"path_params\": path_params, \"query\": query, \"body\": body, \"upstream\": upstream_"));
    assert!(handler.contains("    _body = await upstream.read_body(request)"));
    assert!(!handler.contains("\n    path_params = "));
    assert!(!handler.contains("\n    query = "));
    assert!(!handler.contains("\n    body = "));
}
