//! Plain-text rendering of diffs for terminals and logs

use std::fmt::Write;

use serde_json::Value as JsonValue;

use super::engine::{ChangeType, DiffChange};
use super::sync::{SpecDiff, SyncResult};

fn prefix(change_type: ChangeType) -> char {
    match change_type {
        ChangeType::Added => '+',
        ChangeType::Removed => '-',
        ChangeType::Modified => '~',
        ChangeType::TypeChanged => '!',
        ChangeType::RequiredChanged => '?',
    }
}

fn compact(value: &JsonValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}

/// One block per change: a prefixed description, then its values
pub fn format_diff_changes(changes: &[DiffChange]) -> String {
    if changes.is_empty() {
        return "No changes\n".to_string();
    }
    let mut out = String::new();
    for change in changes {
        let _ = writeln!(out, "{} {}", prefix(change.change_type), change.description);
        match (&change.old_value, &change.new_value) {
            (None, Some(new)) => {
                let _ = writeln!(out, "    value: {}", compact(new));
            }
            (Some(old), None) => {
                let _ = writeln!(out, "    was: {}", compact(old));
            }
            (Some(old), Some(new)) => {
                let _ = writeln!(out, "    old: {}", compact(old));
                let _ = writeln!(out, "    new: {}", compact(new));
            }
            (None, None) => {}
        }
    }
    out
}

pub fn format_spec_diff(diff: &SpecDiff) -> String {
    let mut out = String::new();
    let status = if diff.is_equivalent() {
        "unchanged".to_string()
    } else {
        format!("{} change(s)", diff.changes().len())
    };
    let _ = writeln!(out, "{} ({})", diff.operation_id(), status);
    if !diff.is_equivalent() {
        for line in format_diff_changes(diff.changes()).lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }
    out
}

pub fn format_sync_summary(result: &SyncResult) -> String {
    let mut out = String::new();
    let summary = &result.summary;
    let _ = writeln!(
        out,
        "{} added, {} updated, {} unchanged, {} removed, {} conflicts",
        summary.added, summary.updated, summary.unchanged, summary.removed, summary.conflicts
    );
    for (label, ids) in [
        ("added", &result.added),
        ("updated", &result.updated),
        ("removed", &result.removed),
    ] {
        for id in ids {
            let _ = writeln!(out, "  {}: {}", label, id);
        }
    }
    for conflict in &result.conflicts {
        let _ = writeln!(out, "  conflict: {}", conflict.operation_id());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_prefixes_and_value_lines() {
        let changes = vec![
            DiffChange::new("meta.goal", ChangeType::Added, None, Some(json!("Ship"))),
            DiffChange::new("meta.tags", ChangeType::Removed, Some(json!(["a"])), None),
            DiffChange::new("meta.version", ChangeType::Modified, Some(json!(1)), Some(json!(2))),
            DiffChange::new(
                "io.output.fields.id.isOptional",
                ChangeType::RequiredChanged,
                Some(json!(false)),
                Some(json!(true)),
            ),
        ];
        assert_eq!(
            format_diff_changes(&changes),
            "+ Added meta.goal\n    value: \"Ship\"\n\
             - Removed meta.tags\n    was: [\"a\"]\n\
             ~ Changed meta.version\n    old: 1\n    new: 2\n\
             ? Requiredness of io.output.fields.id.isOptional changed\n    old: false\n    new: true\n"
        );
    }

    #[test]
    fn test_empty_change_list() {
        assert_eq!(format_diff_changes(&[]), "No changes\n");
    }

    #[test]
    fn test_spec_diff_header() {
        let diff = SpecDiff::new(
            "getWidget",
            None,
            None,
            vec![DiffChange::new("path", ChangeType::TypeChanged, Some(json!(1)), Some(json!("1")))],
        );
        let text = format_spec_diff(&diff);
        assert!(text.starts_with("getWidget (1 change(s))\n"));
        assert!(text.contains("  ! Type of path changed from number to string\n"));
    }
}
