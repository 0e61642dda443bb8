//! Write-through cache in front of another source.

use super::{PatientSource, SqliteSource};
use crate::models::Patient;
use anyhow::Result;
use std::cell::Cell;
use tracing::warn;

/// Fetches from `primary`, saving every successful result to `cache`.
/// When `primary` fails the last cached collection is served instead.
pub struct CachedSource {
    primary: Box<dyn PatientSource>,
    cache: SqliteSource,
    serving_cache: Cell<bool>,
}

impl CachedSource {
    pub fn new(primary: Box<dyn PatientSource>, cache: SqliteSource) -> Self {
        Self {
            primary,
            cache,
            serving_cache: Cell::new(false),
        }
    }
}

impl PatientSource for CachedSource {
    fn describe(&self) -> String {
        if self.serving_cache.get() {
            format!("{} (offline, {})", self.primary.describe(), self.cache.describe())
        } else {
            self.primary.describe()
        }
    }

    fn fetch(&self) -> Result<Vec<Patient>> {
        match self.primary.fetch() {
            Ok(patients) => {
                self.serving_cache.set(false);
                if let Err(error) = self.cache.store(&patients) {
                    warn!(error = %format!("{error:#}"), "failed to update patient cache");
                }
                Ok(patients)
            }
            Err(error) => {
                warn!(
                    error = %format!("{error:#}"),
                    cache = %self.cache.path().display(),
                    "primary source failed, serving cached patients"
                );
                let patients = self.cache.fetch().map_err(|cache_error| {
                    error.context(format!("cache also unavailable: {cache_error:#}"))
                })?;
                self.serving_cache.set(true);
                Ok(patients)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DemoSource, JsonFileSource};

    #[test]
    fn successful_fetch_fills_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SqliteSource::new(dir.path().join("cache.db"));
        let source = CachedSource::new(Box::new(DemoSource), cache.clone());

        let fetched = source.fetch().unwrap();
        assert_eq!(cache.fetch().unwrap(), fetched);
        assert_eq!(source.describe(), "demo roster");
    }

    #[test]
    fn failed_fetch_serves_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SqliteSource::new(dir.path().join("cache.db"));
        cache.store(&DemoSource.fetch().unwrap()).unwrap();

        let missing = JsonFileSource::new(dir.path().join("missing.json"));
        let source = CachedSource::new(Box::new(missing), cache);

        assert_eq!(source.fetch().unwrap().len(), 5);
        assert!(source.describe().contains("offline"));
    }
}
