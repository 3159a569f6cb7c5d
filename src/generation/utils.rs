//! Identifier transformations shared by the language backends

/// Splits an identifier into lower-case words.
///
/// Boundaries are separators (anything not alphanumeric), lower-to-upper
/// transitions, and the end of an acronym (`HTTPResponse` is `http`,
/// `response`).
fn words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `findPetsByStatus`, `Find-Pets by status` -> `find_pets_by_status`
pub fn to_snake_case(s: &str) -> String {
    words(s).join("_")
}

/// `find_pets_by_status` -> `FindPetsByStatus`
pub fn to_proper_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize(w)).collect()
}

/// `find_pets_by_status` -> `findPetsByStatus`
pub fn to_camel_case(s: &str) -> String {
    let words = words(s);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// `Pet Store API` -> `pet-store-api`
pub fn to_kebab_case(s: &str) -> String {
    words(s).join("-")
}

/// Append `_` to identifiers that collide with a reserved word, and prefix
/// identifiers that would start with a digit
pub fn escape_identifier(ident: &str, reserved: &[&str]) -> String {
    let ident = match ident.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{ident}"),
        None => "_".to_string(),
        _ => ident.to_string(),
    };
    if reserved.contains(&ident.as_str()) {
        format!("{ident}_")
    } else {
        ident
    }
}

pub const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

pub const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del",
    "elif", "else", "except", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while", "with",
    "yield", "request", "upstream",
];

pub const TYPESCRIPT_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "let", "static", "yield", "await",
];

pub const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Rust field name for an arbitrary parameter name
pub fn sanitize_rust_field_name(s: &str) -> String {
    escape_identifier(&to_snake_case(s), RUST_KEYWORDS)
}
