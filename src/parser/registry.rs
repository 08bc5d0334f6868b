use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use glob::Pattern;

use super::{AtlasParser, CocosPlistParser, TexturePackerJsonParser};
use crate::error::UnatlasError;

/// A parser together with the file-name pattern that selects its descriptors
#[derive(Clone)]
pub struct Registration {
    pub parser: Arc<dyn AtlasParser>,
    pub pattern: Pattern,
}

impl Registration {
    pub fn new(parser: Arc<dyn AtlasParser>, pattern: &str) -> Result<Self, UnatlasError> {
        let pattern = Pattern::new(pattern).map_err(|e| UnatlasError::InvalidPattern {
            pattern: pattern.to_string(),
            source: e,
        })?;
        Ok(Self { parser, pattern })
    }

    /// Check a path's file name (not the full path) against the pattern
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| self.pattern.matches(name))
            .unwrap_or(false)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("parser", &self.parser.description())
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Either a registry key or an already-resolved parser.
///
/// Resolved once at the dispatch boundary; everything downstream
/// works with a [`Registration`].
#[derive(Debug, Clone)]
pub enum ParserRef {
    Named(String),
    Resolved(Registration),
}

impl ParserRef {
    /// Look up `Named` references in the process-wide registry
    pub fn resolve(&self) -> Result<Registration, UnatlasError> {
        match self {
            ParserRef::Named(atlas_type) => resolve_parser(atlas_type),
            ParserRef::Resolved(registration) => Ok(registration.clone()),
        }
    }
}

impl From<&str> for ParserRef {
    fn from(atlas_type: &str) -> Self {
        ParserRef::Named(atlas_type.to_string())
    }
}

impl From<Registration> for ParserRef {
    fn from(registration: Registration) -> Self {
        ParserRef::Resolved(registration)
    }
}

/// Maps atlas type identifiers ("cc", "json", ...) to parsers
#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    entries: HashMap<String, Registration>,
}

impl ParserRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry seeded with the built-in formats
    pub fn with_builtins() -> Self {
        let builtins: [(&str, Arc<dyn AtlasParser>, &str); 2] = [
            ("cc", Arc::new(CocosPlistParser), "*.plist"),
            ("json", Arc::new(TexturePackerJsonParser), "*.json"),
        ];

        let mut registry = Self::new();
        for (atlas_type, parser, pattern) in builtins {
            // Built-in patterns always compile
            if let Ok(registration) = Registration::new(parser, pattern) {
                registry.insert(atlas_type, registration);
            }
        }
        registry
    }

    /// Register a parser for an atlas type.
    ///
    /// An existing entry with the same identifier is replaced. An invalid
    /// pattern leaves the registry untouched.
    pub fn register(
        &mut self,
        atlas_type: &str,
        parser: Arc<dyn AtlasParser>,
        pattern: &str,
    ) -> Result<(), UnatlasError> {
        let registration = Registration::new(parser, pattern)?;
        self.insert(atlas_type, registration);
        Ok(())
    }

    pub fn insert(&mut self, atlas_type: &str, registration: Registration) {
        self.entries.insert(atlas_type.to_string(), registration);
    }

    pub fn resolve(&self, atlas_type: &str) -> Result<Registration, UnatlasError> {
        self.entries
            .get(atlas_type)
            .cloned()
            .ok_or_else(|| UnatlasError::UnknownAtlasType(atlas_type.to_string()))
    }

    /// Registered type identifiers, sorted
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<_> = self.entries.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Registration is expected to finish before dispatch starts; the lock only
// keeps late registration memory-safe.
static REGISTRY: LazyLock<RwLock<ParserRegistry>> =
    LazyLock::new(|| RwLock::new(ParserRegistry::with_builtins()));

/// Install or replace a parser in the process-wide registry
pub fn register_parser(
    atlas_type: &str,
    parser: Arc<dyn AtlasParser>,
    pattern: &str,
) -> Result<(), UnatlasError> {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(atlas_type, parser, pattern)
}

/// Look up a parser in the process-wide registry
pub fn resolve_parser(atlas_type: &str) -> Result<Registration, UnatlasError> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .resolve(atlas_type)
}

/// All types in the process-wide registry with their registrations, sorted by type
pub fn registered_types() -> Vec<(String, Registration)> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    registry
        .types()
        .into_iter()
        .filter_map(|t| registry.resolve(&t).ok().map(|r| (t, r)))
        .collect()
}
