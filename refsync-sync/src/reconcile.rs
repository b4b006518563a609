//! Per-record reconciliation.
//!
//! | API answer             | action                                          |
//! |------------------------|-------------------------------------------------|
//! | absent                 | queue for retirement, record left untouched     |
//! | same display name      | nothing                                         |
//! | different display name | rewrite the field, save now, mark as updated    |

use refsync_core::{FieldKind, Record, RecordStore};

use crate::context::RunContext;
use crate::error::SyncError;
use crate::parser::{format_reference, ParsedReference};
use crate::resolver::ApiReference;

/// What reconciliation did with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Local name matches the API.
    Unchanged,
    /// Field rewritten (and saved unless dry-run).
    Updated,
    /// Reference no longer resolves; retirement deferred to the finalizer.
    MarkedForRetirement,
}

/// Apply the decision table to `record`.
///
/// Updates are persisted immediately; retirement only touches
/// `ctx.retire_ids`. The id enters `ctx.updated_ids` only after a successful
/// save, so a failed save leaves the record in neither set.
pub fn reconcile(
    store: &impl RecordStore,
    record: &mut Record,
    kind: FieldKind,
    parsed: &ParsedReference,
    api_ref: Option<&ApiReference>,
    ctx: &mut RunContext,
    dry_run: bool,
) -> Result<ReconcileOutcome, SyncError> {
    let Some(api_ref) = api_ref else {
        ctx.retire_ids.insert(record.id.clone());
        return Ok(ReconcileOutcome::MarkedForRetirement);
    };

    if parsed.display_name == api_ref.name {
        return Ok(ReconcileOutcome::Unchanged);
    }

    record.set_field(kind, format_reference(&api_ref.name, &api_ref.id));
    if dry_run {
        tracing::info!(
            "[dry-run] would rename {kind} of entity {}: '{}' -> '{}'",
            record.id,
            parsed.display_name,
            api_ref.name
        );
    } else {
        store.save(record)?;
    }
    ctx.updated_ids.insert(record.id.clone());
    Ok(ReconcileOutcome::Updated)
}
