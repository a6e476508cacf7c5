//! Thread-local compilation cache for predicate regexes.
//!
//! Query files often repeat the same `matches` pattern across many
//! predicates. Compiled regexes are cached per thread, capped at 256
//! entries; the cache is cleared wholesale when full.

use crate::ts::TreeSitterError;
use regex::bytes::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    static REGEX_CACHE: RefCell<HashMap<String, Regex>> = RefCell::new(HashMap::new());
}

/// Get a compiled regex from cache, or compile and cache it.
pub fn get_or_compile_regex(pattern: &str) -> Result<Regex, TreeSitterError> {
    REGEX_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();

        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.clone());
        }

        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }

        let compiled = Regex::new(pattern).map_err(|source| TreeSitterError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        cache.insert(pattern.to_string(), compiled.clone());
        Ok(compiled)
    })
}

/// Clear the regex cache (mainly for testing).
pub fn clear_cache() {
    REGEX_CACHE.with(|cache| cache.borrow_mut().clear());
}

pub fn cache_size() -> usize {
    REGEX_CACHE.with(|cache| cache.borrow().len())
}
