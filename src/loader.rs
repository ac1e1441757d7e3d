use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::flag_table::FlagTable;
use crate::source::Source;

lazy_static! {
    // Environment identifiers become file names, so they may not contain separators or start
    // with a dot.
    static ref ENVIRONMENT_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
}

/// Options accepted by [FlagTableLoader::load].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Return an empty table instead of [LoadError::ResourceNotFound] when the environment has
    /// no definition. The empty result is not cached.
    pub ignore_missing: bool,
}

impl LoadOptions {
    pub fn ignore_missing() -> Self {
        Self {
            ignore_missing: true,
        }
    }
}

/// LoadError is returned by [FlagTableLoader::load] when a flag table could not be loaded.
#[derive(Debug)]
pub enum LoadError {
    /// The environment has no definition and missing definitions were not ignored.
    ResourceNotFound { environment: String },
    /// The environment identifier cannot name a definition.
    InvalidEnvironment { environment: String },
    /// The definition exists but could not be read.
    Io {
        environment: String,
        source: io::Error,
    },
    /// The definition is not a map of non-empty, unique names to booleans.
    Parse {
        environment: String,
        source: serde_json::Error,
    },
}

impl LoadError {
    /// The environment the failed load was for.
    pub fn environment(&self) -> &str {
        match self {
            LoadError::ResourceNotFound { environment }
            | LoadError::InvalidEnvironment { environment }
            | LoadError::Io { environment, .. }
            | LoadError::Parse { environment, .. } => environment,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::ResourceNotFound { .. })
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::ResourceNotFound { environment } => {
                write!(f, "no flag table defined for environment {}", environment)
            }
            LoadError::InvalidEnvironment { environment } => {
                write!(f, "invalid environment identifier {:?}", environment)
            }
            LoadError::Io {
                environment,
                source,
            } => write!(
                f,
                "failed to read flag table for environment {}: {}",
                environment, source
            ),
            LoadError::Parse {
                environment,
                source,
            } => write!(
                f,
                "malformed flag table for environment {}: {}",
                environment, source
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// FlagTableCache holds every flag table loaded so far, keyed by environment.
///
/// Entries live as long as the cache; there is no eviction. Concurrent readers do not block each
/// other, and when two loads of the same environment race the last insert wins.
#[derive(Debug, Default)]
pub struct FlagTableCache {
    tables: RwLock<HashMap<String, Arc<FlagTable>>>,
}

impl FlagTableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, environment: &str) -> Option<Arc<FlagTable>> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(environment)
            .cloned()
    }

    pub fn contains(&self, environment: &str) -> bool {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(environment)
    }

    pub fn len(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, environment: String, table: Arc<FlagTable>) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(environment, table);
    }
}

/// FlagTableLoader reads flag tables from a [Source] and remembers every table it loads.
///
/// Construct one per process (or per data directory) and share it by reference; the cache is
/// owned by the loader.
#[derive(Debug)]
pub struct FlagTableLoader<S: Source> {
    source: S,
    cache: FlagTableCache,
}

impl<S: Source> FlagTableLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: FlagTableCache::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &FlagTableCache {
        &self.cache
    }

    /// Load the flag table for `environment`.
    ///
    /// A table is read from the source at most once per successful load; afterwards the cached
    /// table is returned without touching the source. A definition that does not exist fails
    /// with [LoadError::ResourceNotFound] unless [LoadOptions::ignore_missing] is set, in which
    /// case an empty table is returned and nothing is cached, so a definition created later is
    /// picked up by the next call. Every other failure is returned as is.
    ///
    /// Concurrent loads of the same uncached environment are not coalesced; each reads the
    /// source.
    ///
    /// Loading blocks on the source. Async callers should run it on a blocking pool, e.g. with
    /// `tokio::task::spawn_blocking`.
    pub fn load(
        &self,
        environment: &str,
        options: LoadOptions,
    ) -> Result<Arc<FlagTable>, LoadError> {
        if let Some(table) = self.cache.get(environment) {
            debug!("flag table for {} served from cache", environment);
            return Ok(table);
        }

        if !ENVIRONMENT_REGEX.is_match(environment) {
            return Err(LoadError::InvalidEnvironment {
                environment: environment.to_owned(),
            });
        }

        let content = match self.source.read(environment) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if options.ignore_missing {
                    debug!("no flag table for {}, using an empty one", environment);
                    return Ok(Arc::new(FlagTable::new()));
                }
                return Err(LoadError::ResourceNotFound {
                    environment: environment.to_owned(),
                });
            }
            Err(source) => {
                warn!("failed to read flag table for {}: {}", environment, source);
                return Err(LoadError::Io {
                    environment: environment.to_owned(),
                    source,
                });
            }
        };

        let table: FlagTable = serde_json::from_str(&content).map_err(|source| {
            warn!("malformed flag table for {}: {}", environment, source);
            LoadError::Parse {
                environment: environment.to_owned(),
                source,
            }
        })?;

        debug!("loaded {} flags for {}", table.len(), environment);
        let table = Arc::new(table);
        self.cache.insert(environment.to_owned(), Arc::clone(&table));
        Ok(table)
    }
}
