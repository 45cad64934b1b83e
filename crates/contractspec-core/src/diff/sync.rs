//! Reconciliation of imported specs against an existing registry

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::engine::{diff_specs, ChangeType, DiffChange, DiffOptions};
use crate::contract::{ImportedOperationSpec, OperationRegistry, OperationSpec, SpecPayload};

/// How imported specs are matched to existing ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Canonical name, then source operation id
    #[default]
    Exact,
    /// Exact matching, then existing names containing the source operation id
    Contains,
}

impl std::str::FromStr for MatchStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "contains" => Ok(Self::Contains),
            other => Err(crate::Error::config(format!("Unknown match strategy: {}", other))),
        }
    }
}

/// Decision taken for a diff with changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    KeepExisting,
    UseIncoming,
}

/// Where a diff lands in a [`SyncResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    Added,
    Updated,
    Unchanged,
    Removed,
    Conflict,
}

/// Comparison of one existing spec, one incoming spec, or a matched pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecDiff {
    operation_id: String,
    existing: Option<OperationSpec>,
    incoming: Option<ImportedOperationSpec>,
    changes: Vec<DiffChange>,
    is_equivalent: bool,
    resolution: Option<Resolution>,
}

impl SpecDiff {
    pub fn new(
        operation_id: impl Into<String>,
        existing: Option<OperationSpec>,
        incoming: Option<ImportedOperationSpec>,
        changes: Vec<DiffChange>,
    ) -> Self {
        let is_equivalent = changes.is_empty();
        Self {
            operation_id: operation_id.into(),
            existing,
            incoming,
            changes,
            is_equivalent,
            resolution: None,
        }
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn existing(&self) -> Option<&OperationSpec> {
        self.existing.as_ref()
    }

    pub fn incoming(&self) -> Option<&ImportedOperationSpec> {
        self.incoming.as_ref()
    }

    pub fn changes(&self) -> &[DiffChange] {
        &self.changes
    }

    pub fn is_equivalent(&self) -> bool {
        self.is_equivalent
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Record a decision; clears nothing else
    pub fn resolve(&mut self, resolution: Resolution) {
        self.resolution = Some(resolution);
    }

    /// Whether this diff needs a decision before it can be applied
    pub fn needs_resolution(&self) -> bool {
        self.existing.is_some() && !self.is_equivalent && self.resolution.is_none()
    }

    pub fn outcome(&self) -> SyncOutcome {
        match (&self.existing, &self.incoming) {
            (None, _) => SyncOutcome::Added,
            (Some(_), None) => match self.resolution {
                Some(Resolution::UseIncoming) => SyncOutcome::Removed,
                Some(Resolution::KeepExisting) => SyncOutcome::Unchanged,
                None => SyncOutcome::Conflict,
            },
            (Some(_), Some(_)) if self.is_equivalent => SyncOutcome::Unchanged,
            (Some(_), Some(_)) => match self.resolution {
                Some(Resolution::UseIncoming) => SyncOutcome::Updated,
                Some(Resolution::KeepExisting) => SyncOutcome::Unchanged,
                None => SyncOutcome::Conflict,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub conflicts: usize,
}

/// Diffs sorted into buckets; every diff lands in exactly one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub removed: Vec<String>,
    pub conflicts: Vec<SpecDiff>,
    pub summary: SyncSummary,
}

impl SyncResult {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

fn spec_value<T: Serialize>(value: &T) -> Option<JsonValue> {
    serde_json::to_value(value).ok()
}

/// Index of the first unclaimed existing spec matching `imported`
fn find_match(
    existing: &IndexMap<String, OperationSpec>,
    claimed: &HashSet<usize>,
    imported: &ImportedOperationSpec,
    options: &DiffOptions,
) -> Option<usize> {
    let source_id = imported.source.source_id();
    let live_key = imported.spec.live().map(OperationSpec::key);
    let unclaimed = || {
        existing
            .values()
            .enumerate()
            .filter(|(index, _)| !claimed.contains(index))
    };

    let exact = unclaimed()
        .find(|(_, spec)| live_key.as_deref() == Some(spec.key().as_str()))
        .or_else(|| unclaimed().find(|(_, spec)| spec.meta.name == imported.name))
        .or_else(|| unclaimed().find(|(_, spec)| spec.meta.name == source_id));
    if let Some((index, _)) = exact {
        return Some(index);
    }
    match options.match_strategy {
        MatchStrategy::Exact => None,
        MatchStrategy::Contains => unclaimed()
            .find(|(_, spec)| !source_id.is_empty() && spec.meta.name.contains(source_id))
            .map(|(index, _)| index),
    }
}

fn code_only_change() -> DiffChange {
    let mut change = DiffChange::new("", ChangeType::Modified, None, None);
    change.description = "Incoming spec is code-only; compared by generated code, not structure".into();
    change
}

/// Match every imported spec against `existing` and diff each pair.
///
/// Imported specs come first, in input order, followed by existing specs
/// that nothing matched (as removals).
pub fn diff_all(
    existing: &IndexMap<String, OperationSpec>,
    imported: &[ImportedOperationSpec],
    options: &DiffOptions,
) -> Vec<SpecDiff> {
    let mut claimed = HashSet::new();
    let mut diffs = Vec::with_capacity(existing.len() + imported.len());

    for incoming in imported {
        let operation_id = incoming.source.source_id().to_string();
        let matched = find_match(existing, &claimed, incoming, options)
            .and_then(|index| existing.get_index(index).map(|(_, spec)| (index, spec)));

        let diff = match matched {
            Some((index, current)) => {
                claimed.insert(index);
                let changes = match &incoming.spec {
                    SpecPayload::Live(spec) => diff_specs(current, spec, options),
                    SpecPayload::CodeOnly => vec![code_only_change()],
                };
                log::debug!(
                    "Matched {} to {} with {} change(s)",
                    operation_id,
                    current.key(),
                    changes.len()
                );
                SpecDiff::new(operation_id, Some(current.clone()), Some(incoming.clone()), changes)
            }
            None => {
                let value = match &incoming.spec {
                    SpecPayload::Live(spec) => spec_value(spec),
                    SpecPayload::CodeOnly => Some(JsonValue::String(incoming.code.clone())),
                };
                let change = DiffChange::new("", ChangeType::Added, None, value);
                SpecDiff::new(operation_id, None, Some(incoming.clone()), vec![change])
            }
        };
        diffs.push(diff);
    }

    for (index, (key, spec)) in existing.iter().enumerate() {
        if claimed.contains(&index) {
            continue;
        }
        let change = DiffChange::new("", ChangeType::Removed, spec_value(spec), None);
        diffs.push(SpecDiff::new(key.clone(), Some(spec.clone()), None, vec![change]));
    }
    diffs
}

/// Sort diffs into buckets by their outcome
pub fn build_sync_result(diffs: &[SpecDiff]) -> SyncResult {
    let mut result = SyncResult::default();
    for diff in diffs {
        let id = diff.operation_id.clone();
        match diff.outcome() {
            SyncOutcome::Added => result.added.push(id),
            SyncOutcome::Updated => result.updated.push(id),
            SyncOutcome::Unchanged => result.unchanged.push(id),
            SyncOutcome::Removed => result.removed.push(id),
            SyncOutcome::Conflict => result.conflicts.push(diff.clone()),
        }
    }
    result.summary = SyncSummary {
        added: result.added.len(),
        updated: result.updated.len(),
        unchanged: result.unchanged.len(),
        removed: result.removed.len(),
        conflicts: result.conflicts.len(),
    };
    log::info!(
        "Sync: {} added, {} updated, {} unchanged, {} removed, {} conflicts",
        result.summary.added,
        result.summary.updated,
        result.summary.unchanged,
        result.summary.removed,
        result.summary.conflicts
    );
    result
}

/// Apply resolved diffs to `registry` and return the bucketed result.
///
/// Conflicts are left untouched. Code-only incoming specs carry no
/// structure and are never written to the registry.
pub fn apply_sync(registry: &mut OperationRegistry, diffs: &[SpecDiff]) -> SyncResult {
    for diff in diffs {
        match diff.outcome() {
            SyncOutcome::Added | SyncOutcome::Updated => {
                let Some(spec) = diff.incoming.as_ref().and_then(|i| i.spec.live()) else {
                    log::warn!("Skipping code-only spec {}", diff.operation_id);
                    continue;
                };
                if let Some(current) = &diff.existing {
                    registry.remove(&current.key());
                }
                registry.upsert(spec.clone());
            }
            SyncOutcome::Removed => {
                if let Some(current) = &diff.existing {
                    registry.remove(&current.key());
                }
            }
            SyncOutcome::Unchanged | SyncOutcome::Conflict => {}
        }
    }
    build_sync_result(diffs)
}
