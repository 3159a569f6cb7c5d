//! Stable endpoint identifiers.
//!
//! An id is derived from the method and path, plus the occurrence number when
//! the same pair appears more than once, so re-importing the same definition
//! yields the same ids.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use super::HttpMethod;

const ID_PREFIX: &str = "ep_";
const ID_HEX_LEN: usize = 16;

/// Id for the `occurrence`-th (0-based) appearance of `method path`
pub fn endpoint_id(method: HttpMethod, path: &str, occurrence: usize) -> String {
    let key = if occurrence == 0 {
        format!("{method} {path}")
    } else {
        format!("{method} {path}#{occurrence}")
    };
    let digest = Sha256::digest(key.as_bytes());
    let hex = hex::encode(digest);
    format!("{ID_PREFIX}{}", &hex[..ID_HEX_LEN])
}

/// Hands out unique ids for one definition
#[derive(Debug, Default)]
pub struct IdAllocator {
    occurrences: HashMap<(HttpMethod, String), usize>,
    issued: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an existing id as taken
    pub fn reserve(&mut self, id: &str) -> bool {
        self.issued.insert(id.to_string())
    }

    pub fn allocate(&mut self, method: HttpMethod, path: &str) -> String {
        let counter = self
            .occurrences
            .entry((method, path.to_string()))
            .or_insert(0);
        loop {
            let id = endpoint_id(method, path, *counter);
            *counter += 1;
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}
