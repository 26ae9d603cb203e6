//! # Section Configuration
//!
//! Per-page visibility and ordering of template sections.
//!
//! Page layouts declare a canonical section list. Users customize it through
//! persisted `{id, enabled, order}` records. The two are reconciled on read:
//!
//! 1. No records for the page: every canonical section, enabled, in
//!    canonical order.
//! 2. Records exist: keep them, then append each canonical section without a
//!    record, enabled, with `order = records.len() + offset`.
//! 3. Sort by `order` (stable).
//!
//! Visibility fails open: an unknown page or a section without a record is
//! visible. Toggling a section that has no record yet creates one that is
//! *disabled*, since the first toggle of a visible section should hide it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub id: String,
    pub enabled: bool,
    pub order: u32,
}

impl SectionConfig {
    pub fn new(id: impl Into<String>, enabled: bool, order: u32) -> Self {
        Self {
            id: id.into(),
            enabled,
            order,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    #[error("Section {section:?} appears more than once in the new order for page {page:?}")]
    DuplicateId { page: String, section: String },

    #[error("New order for page {page:?} must contain exactly the page's sections (missing: {missing:?}, unknown: {unknown:?})")]
    IdSetMismatch {
        page: String,
        missing: Vec<String>,
        unknown: Vec<String>,
    },
}

/// page-id → persisted section records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionConfigs {
    pages: BTreeMap<String, Vec<SectionConfig>>,
}

impl SectionConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisted records for a page, as stored
    pub fn get(&self, page: &str) -> Option<&[SectionConfig]> {
        self.pages.get(page).map(Vec::as_slice)
    }

    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// Reconcile the persisted records of `page` with its canonical sections
    pub fn merge<S: AsRef<str>>(&self, page: &str, canonical: &[S]) -> Vec<SectionConfig> {
        let mut merged = match self.pages.get(page) {
            None => default_configs(canonical),
            Some(persisted) => {
                let known: HashSet<&str> = persisted.iter().map(|c| c.id.as_str()).collect();
                let base = persisted.len();
                let mut merged = persisted.clone();
                let mut seen = HashSet::new();

                let missing = canonical
                    .iter()
                    .map(|id| id.as_ref())
                    .filter(|id| !known.contains(id) && seen.insert(*id));
                for (offset, id) in missing.enumerate() {
                    merged.push(SectionConfig::new(id, true, order_at(base + offset)));
                }
                merged
            }
        };

        merged.sort_by_key(|c| c.order);
        merged
    }

    /// Merged sections that are enabled, in display order
    pub fn visible_sections<S: AsRef<str>>(&self, page: &str, canonical: &[S]) -> Vec<String> {
        self.merge(page, canonical)
            .into_iter()
            .filter(|c| c.enabled)
            .map(|c| c.id)
            .collect()
    }

    pub fn is_visible(&self, page: &str, section: &str) -> bool {
        self.pages
            .get(page)
            .and_then(|configs| configs.iter().find(|c| c.id == section))
            .map_or(true, |c| c.enabled)
    }

    /// Flip `enabled` for a section; an unseen section becomes disabled
    pub fn toggle(&mut self, page: &str, section: &str) {
        let configs = self.pages.entry(page.to_string()).or_default();

        match configs.iter_mut().find(|c| c.id == section) {
            Some(config) => config.enabled = !config.enabled,
            None => {
                renumber(configs);
                let order = order_at(configs.len());
                configs.push(SectionConfig::new(section, false, order));
            }
        }

        tracing::debug!(page, section, visible = self.is_visible(page, section), "section toggled");
    }

    /// Store `ordered` as the page's display order
    ///
    /// `ordered` must be a permutation of the page's merged section ids.
    /// Each section's `order` becomes its index in `ordered`.
    pub fn reorder<S: AsRef<str>, O: AsRef<str>>(
        &mut self,
        page: &str,
        canonical: &[S],
        ordered: &[O],
    ) -> Result<(), SectionError> {
        let merged = self.merge(page, canonical);

        let mut seen = HashSet::new();
        for id in ordered.iter().map(|id| id.as_ref()) {
            if !seen.insert(id) {
                return Err(SectionError::DuplicateId {
                    page: page.to_string(),
                    section: id.to_string(),
                });
            }
        }

        let current: HashSet<&str> = merged.iter().map(|c| c.id.as_str()).collect();
        if current != seen {
            let mut missing: Vec<String> =
                current.difference(&seen).map(|id| id.to_string()).collect();
            let mut unknown: Vec<String> =
                seen.difference(&current).map(|id| id.to_string()).collect();
            missing.sort();
            unknown.sort();
            return Err(SectionError::IdSetMismatch {
                page: page.to_string(),
                missing,
                unknown,
            });
        }

        let reordered = ordered
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                merged
                    .iter()
                    .find(|c| c.id == id.as_ref())
                    .map(|c| SectionConfig::new(c.id.clone(), c.enabled, order_at(index)))
            })
            .collect();

        self.pages.insert(page.to_string(), reordered);
        Ok(())
    }

    /// Replace a page's records with the canonical defaults
    pub fn reset<S: AsRef<str>>(&mut self, page: &str, canonical: &[S]) {
        self.pages.insert(page.to_string(), default_configs(canonical));
    }

    /// Replace every page's records with the canonical defaults
    ///
    /// Pages absent from `canonical` lose their customization entirely.
    pub fn reset_all<S: AsRef<str>>(&mut self, canonical: &BTreeMap<String, Vec<S>>) {
        self.pages = canonical
            .iter()
            .map(|(page, sections)| (page.clone(), default_configs(sections)))
            .collect();
    }
}

fn default_configs<S: AsRef<str>>(canonical: &[S]) -> Vec<SectionConfig> {
    let mut seen = HashSet::new();
    canonical
        .iter()
        .map(|id| id.as_ref())
        .filter(|id| seen.insert(*id))
        .enumerate()
        .map(|(index, id)| SectionConfig::new(id, true, order_at(index)))
        .collect()
}

/// Close gaps left by hand-edited or older records, keeping relative order
fn renumber(configs: &mut [SectionConfig]) {
    configs.sort_by_key(|c| c.order);
    for (index, config) in configs.iter_mut().enumerate() {
        config.order = order_at(index);
    }
}

fn order_at(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}
