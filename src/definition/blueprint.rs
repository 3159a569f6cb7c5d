//! API Blueprint (Markdown) extraction.
//!
//! Only what is needed to build endpoints is read: the title, `HOST:`,
//! resource and action headings, bare `VERB /path` lines, `+ Parameters`
//! lists, inline parameter tables and `+ Response` codes. Everything else,
//! including fenced code blocks, is skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::core::{Diagnostics, Stage};

const VERBS: &str = "GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS";

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$").expect("valid heading regex"));
static VERB_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({VERBS})\s+(/\S*)\s*$")).expect("valid verb/path regex")
});
static NAMED_ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(.*?)\s*\[({VERBS})(?:\s+(/[^\]]*))?\]$")).expect("valid action regex")
});
static RESOURCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*\[(/[^\]]*)\]$").expect("valid resource regex"));
static GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Group\s+(.+)$").expect("valid group regex"));
static META_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(FORMAT|HOST):\s*(.*)$").expect("valid metadata regex"));
static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)[+*-]\s+(.*)$").expect("valid list item regex"));
static RESPONSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Response\s+(\d{3})(?:\s*\(([^)]*)\))?").expect("valid response regex")
});
static PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^`?([A-Za-z0-9_.\-\[\]]+)`?(?:\s*:\s*`?([^`(]*?)`?)?\s*(?:\(([^)]*)\))?\s*(?:-\s*(.*))?$")
        .expect("valid parameter regex")
});

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlueprintDocument {
    pub title: Option<String>,
    pub host: Option<String>,
    pub description: Option<String>,
    pub actions: Vec<BlueprintAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlueprintAction {
    /// Upper-case HTTP verb
    pub method: String,
    /// URI template as written, possibly with `{?query}` expansions
    pub uri_template: String,
    pub name: String,
    pub description: String,
    pub group: Option<String>,
    pub parameters: Vec<BlueprintParameter>,
    pub responses: Vec<BlueprintResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintParameter {
    pub name: String,
    pub type_name: Option<String>,
    pub required: bool,
    pub description: String,
    /// Explicit location from an inline table's `in` column
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintResponse {
    pub code: String,
    pub media_type: Option<String>,
}

#[derive(Default)]
struct Resource {
    level: usize,
    uri_template: String,
    parameters: Vec<BlueprintParameter>,
}

#[derive(Default)]
struct State {
    document: BlueprintDocument,
    group: Option<String>,
    resource: Option<Resource>,
    /// Index into `document.actions` of the action being filled
    action: Option<usize>,
    /// Indent of an open `+ Parameters` list
    parameters_indent: Option<usize>,
    table_columns: Option<Vec<String>>,
    in_fence: bool,
    /// Prose after a heading is collected until the first list item
    prose_open: bool,
    description: Vec<String>,
}

/// Parse an API Blueprint document. Never fails; a document without any
/// recognizable action produces a warning.
pub fn parse_blueprint(content: &str, diagnostics: &mut Diagnostics) -> BlueprintDocument {
    let mut state = State::default();

    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            state.in_fence = !state.in_fence;
            continue;
        }
        if state.in_fence {
            continue;
        }
        state.line(line);
    }
    state.flush_description();

    if state.document.actions.is_empty() {
        diagnostics.warn(
            Stage::Parsing,
            "no actions found in Markdown document; expected headings like `## GET /path`",
        );
    }
    state.document
}

impl State {
    fn line(&mut self, line: &str) {
        let trimmed = line.trim();

        if let Some(caps) = META_RE.captures(trimmed) {
            if &caps[1] == "HOST" {
                self.document.host = Some(caps[2].trim().to_string()).filter(|h| !h.is_empty());
            }
            return;
        }

        if let Some(caps) = HEADING_RE.captures(trimmed) {
            self.heading(caps[1].len(), caps[2].trim());
            return;
        }

        if trimmed.starts_with('|') {
            self.table_row(trimmed);
            return;
        }
        self.table_columns = None;

        if let Some(caps) = VERB_PATH_RE.captures(trimmed) {
            let uri = caps[2].to_string();
            self.start_action(&caps[1], uri, String::new());
            return;
        }

        if let Some(caps) = LIST_ITEM_RE.captures(line) {
            self.list_item(caps[1].len(), caps[2].trim());
            return;
        }

        if !trimmed.is_empty() && self.prose_open {
            self.description.push(trimmed.to_string());
        }
    }

    fn heading(&mut self, level: usize, text: &str) {
        self.flush_description();
        self.prose_open = true;
        self.parameters_indent = None;
        self.table_columns = None;

        if let Some(caps) = VERB_PATH_RE.captures(text) {
            self.start_action(&caps[1], caps[2].to_string(), String::new());
            return;
        }

        if let Some(caps) = NAMED_ACTION_RE.captures(text) {
            let name = caps[1].trim().to_string();
            let uri = match caps.get(3) {
                Some(path) => Some(path.as_str().trim().to_string()),
                None => self.resource.as_ref().map(|r| r.uri_template.clone()),
            };
            // An action without a path and without an enclosing resource is ignored
            if let Some(uri) = uri {
                self.start_action(&caps[2], uri, name);
            }
            return;
        }

        if let Some(caps) = RESOURCE_RE.captures(text) {
            self.action = None;
            self.resource = Some(Resource {
                level,
                uri_template: caps[2].trim().to_string(),
                parameters: Vec::new(),
            });
            return;
        }

        if let Some(caps) = GROUP_RE.captures(text) {
            self.group = Some(caps[1].trim().to_string());
            self.resource = None;
            self.action = None;
            return;
        }

        // Plain heading: the first level-1 heading is the API name
        if level == 1 && self.document.title.is_none() && self.document.actions.is_empty() {
            self.document.title = Some(text.to_string());
        }
        if self.resource.as_ref().is_some_and(|r| level <= r.level) {
            self.resource = None;
        }
        self.action = None;
    }

    fn start_action(&mut self, method: &str, uri_template: String, name: String) {
        self.flush_description();
        self.prose_open = true;
        self.parameters_indent = None;
        let parameters = self
            .resource
            .as_ref()
            .filter(|r| r.uri_template == uri_template)
            .map(|r| r.parameters.clone())
            .unwrap_or_default();
        self.document.actions.push(BlueprintAction {
            method: method.to_string(),
            uri_template,
            name,
            description: String::new(),
            group: self.group.clone(),
            parameters,
            responses: Vec::new(),
        });
        self.action = Some(self.document.actions.len() - 1);
    }

    fn list_item(&mut self, indent: usize, text: &str) {
        self.flush_description();
        self.prose_open = false;
        if self.parameters_indent.is_some_and(|open| indent <= open) {
            self.parameters_indent = None;
        }

        if self.parameters_indent.is_some() {
            if let Some(parameter) = parse_parameter_item(text) {
                self.add_parameter(parameter);
            }
            return;
        }

        if text == "Parameters" {
            self.parameters_indent = Some(indent);
        } else if let Some(caps) = RESPONSE_RE.captures(text) {
            if let Some(index) = self.action {
                self.document.actions[index].responses.push(BlueprintResponse {
                    code: caps[1].to_string(),
                    media_type: caps.get(2).map(|m| m.as_str().trim().to_string()),
                });
            }
        }
    }

    fn table_row(&mut self, row: &str) {
        let cells: Vec<String> = row
            .trim_matches('|')
            .split('|')
            .map(|cell| cell.trim().trim_matches('`').to_string())
            .collect();

        let Some(columns) = &self.table_columns else {
            if cells.first().is_some_and(|c| c.eq_ignore_ascii_case("name")) {
                self.table_columns = Some(cells.iter().map(|c| c.to_ascii_lowercase()).collect());
            }
            return;
        };

        if cells.iter().all(|c| c.chars().all(|ch| matches!(ch, '-' | ':' | ' '))) {
            return;
        }

        let cell = |key: &str| {
            columns
                .iter()
                .position(|c| c == key)
                .and_then(|i| cells.get(i))
                .filter(|c| !c.is_empty())
                .cloned()
        };
        let Some(name) = cell("name") else {
            return;
        };
        let required = cell("required")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "yes" | "true" | "required" | "y" | "x"))
            .unwrap_or(false);
        let parameter = BlueprintParameter {
            name,
            type_name: cell("type"),
            required,
            description: cell("description").unwrap_or_default(),
            location: cell("in").or_else(|| cell("location")),
        };
        self.add_parameter(parameter);
    }

    fn add_parameter(&mut self, parameter: BlueprintParameter) {
        match (self.action, self.resource.as_mut()) {
            (Some(index), _) => self.document.actions[index].parameters.push(parameter),
            (None, Some(resource)) => resource.parameters.push(parameter),
            (None, None) => {}
        }
    }

    fn flush_description(&mut self) {
        if self.description.is_empty() {
            return;
        }
        let text = self.description.join(" ");
        self.description.clear();
        match self.action {
            Some(index) if self.document.actions[index].description.is_empty() => {
                self.document.actions[index].description = text;
            }
            Some(_) => {}
            None if self.resource.is_none() && self.document.description.is_none() => {
                self.document.description = Some(text);
            }
            None => {}
        }
    }
}

/// `+ id: 42 (number, required) - The pet id`
fn parse_parameter_item(text: &str) -> Option<BlueprintParameter> {
    let caps = PARAM_RE.captures(text)?;
    let name = caps[1].to_string();
    let mut type_name = None;
    // API Blueprint parameters are required unless marked optional
    let mut required = true;

    if let Some(attributes) = caps.get(3) {
        for attribute in attributes.as_str().split(',').map(str::trim) {
            match attribute {
                "required" => required = true,
                "optional" => required = false,
                "" => {}
                other if type_name.is_none() => type_name = Some(other.to_string()),
                _ => {}
            }
        }
    }

    Some(BlueprintParameter {
        name,
        type_name,
        required,
        description: caps
            .get(4)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        location: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_heading_actions() {
        let content = "# Pet API\n\nManage pets.\n\n## GET /pets\nList pets.\n\n## POST /pets\n";
        let mut diagnostics = Diagnostics::new();
        let document = parse_blueprint(content, &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(document.title.as_deref(), Some("Pet API"));
        assert_eq!(document.description.as_deref(), Some("Manage pets."));
        assert_eq!(document.actions.len(), 2);
        assert_eq!(document.actions[0].method, "GET");
        assert_eq!(document.actions[0].uri_template, "/pets");
        assert_eq!(document.actions[0].description, "List pets.");
        assert_eq!(document.actions[1].method, "POST");
    }

    #[test]
    fn test_resource_and_action_sections() {
        let content = r#"FORMAT: 1A
HOST: https://api.example.com

# Notes API

# Group Notes

## Note [/notes/{id}{?verbose}]

+ Parameters
    + id: 68a5 (string) - Note identifier
    + verbose: true (boolean, optional) - Include history

### Retrieve a Note [GET]

+ Response 200 (application/json)

        { "id": "68a5" }

### Delete a Note [DELETE]

+ Response 204
"#;
        let mut diagnostics = Diagnostics::new();
        let document = parse_blueprint(content, &mut diagnostics);

        assert_eq!(document.host.as_deref(), Some("https://api.example.com"));
        assert_eq!(document.title.as_deref(), Some("Notes API"));
        assert_eq!(document.actions.len(), 2);

        let get = &document.actions[0];
        assert_eq!(get.method, "GET");
        assert_eq!(get.name, "Retrieve a Note");
        assert_eq!(get.uri_template, "/notes/{id}{?verbose}");
        assert_eq!(get.group.as_deref(), Some("Notes"));
        assert_eq!(get.parameters.len(), 2);
        assert_eq!(get.parameters[0].name, "id");
        assert_eq!(get.parameters[0].type_name.as_deref(), Some("string"));
        assert!(get.parameters[0].required);
        assert!(!get.parameters[1].required);
        assert_eq!(get.responses[0].code, "200");
        assert_eq!(get.responses[0].media_type.as_deref(), Some("application/json"));

        assert_eq!(document.actions[1].method, "DELETE");
        assert_eq!(document.actions[1].responses[0].code, "204");
    }

    #[test]
    fn test_inline_parameter_table() {
        let content = "# Search\n\n## GET /search\n\n| Name | Type | Required | Description |\n|------|------|----------|-------------|\n| q | string | yes | Query text |\n| page | integer | no | Page number |\n";
        let mut diagnostics = Diagnostics::new();
        let document = parse_blueprint(content, &mut diagnostics);

        let parameters = &document.actions[0].parameters;
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "q");
        assert!(parameters[0].required);
        assert_eq!(parameters[1].type_name.as_deref(), Some("integer"));
        assert!(!parameters[1].required);
        assert_eq!(parameters[1].description, "Page number");
    }

    #[test]
    fn test_code_fences_are_skipped() {
        let content = "# API\n\n```\nGET /not-an-endpoint\n```\n\nGET /real\n";
        let mut diagnostics = Diagnostics::new();
        let document = parse_blueprint(content, &mut diagnostics);

        assert_eq!(document.actions.len(), 1);
        assert_eq!(document.actions[0].uri_template, "/real");
    }

    #[test]
    fn test_no_actions_warns() {
        let mut diagnostics = Diagnostics::new();
        let document = parse_blueprint("# Just a title\n\nSome prose.\n", &mut diagnostics);
        assert!(document.actions.is_empty());
        assert!(diagnostics.has_warnings());
    }
}
