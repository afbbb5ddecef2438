//! Report id → generator lookup.
//!
//! Generators are registered as factories and only constructed the first
//! time their id is requested; the instance is then reused.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use super::generators;
use super::ReportGenerator;

/// Builds a generator on first use.
pub type GeneratorFactory = fn() -> Arc<dyn ReportGenerator>;

struct Entry {
    factory: GeneratorFactory,
    instance: OnceLock<Arc<dyn ReportGenerator>>,
}

#[derive(Default)]
pub struct GeneratorRegistry {
    entries: HashMap<String, Entry>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every bundled generator.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("positions_report", || Arc::new(generators::PositionsReport));
        registry.register("attendance_summary", || Arc::new(generators::AttendanceSummary));
        registry.register("predictive_analytics_summary", || {
            Arc::new(generators::PredictiveAnalytics)
        });
        registry.register("archived_report", || Arc::new(generators::ArchivedReport));
        registry.register("payslip", || Arc::new(generators::Payslip));
        registry
    }

    /// Register (or replace) the factory for `id`.
    pub fn register(&mut self, id: impl Into<String>, factory: GeneratorFactory) {
        self.entries.insert(
            id.into(),
            Entry {
                factory,
                instance: OnceLock::new(),
            },
        );
    }

    /// The generator for `id`, constructing it on first request.
    pub fn resolve(&self, id: &str) -> Option<Arc<dyn ReportGenerator>> {
        let entry = self.entries.get(id)?;
        let generator = entry.instance.get_or_init(|| {
            log::debug!("Loading report generator \"{}\"", id);
            (entry.factory)()
        });
        Some(Arc::clone(generator))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// True once the generator for `id` has been constructed.
    pub fn is_loaded(&self, id: &str) -> bool {
        self.entries
            .get(id)
            .is_some_and(|e| e.instance.get().is_some())
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generators_load_on_first_use() {
        let registry = GeneratorRegistry::builtin();
        assert!(registry.contains("positions_report"));
        assert!(!registry.is_loaded("positions_report"));

        let first = registry.resolve("positions_report").unwrap();
        assert!(registry.is_loaded("positions_report"));
        assert!(!registry.is_loaded("payslip"));

        let second = registry.resolve("positions_report").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unknown_id_resolves_to_none() {
        let registry = GeneratorRegistry::builtin();
        assert!(registry.resolve("nonexistent-report").is_none());
        assert!(!registry.is_loaded("nonexistent-report"));
    }

    #[test]
    fn ids_are_sorted() {
        let registry = GeneratorRegistry::builtin();
        let ids = registry.ids();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 5);
    }
}
