use tracing::{info, info_span, warn};

use intake_model::{BulkAction, BulkError, BulkOutcome, LeadId};

use crate::ports::LeadStore;

/// Applies one action to every listed lead.
///
/// The payload is validated before any lead is touched. Leads are then
/// mutated one at a time; a failure on one id is reported in its outcome and
/// does not stop the rest. Outcomes follow the order of `lead_ids`.
pub fn apply_bulk(
    store: &dyn LeadStore,
    action: &BulkAction,
    lead_ids: &[LeadId],
) -> Result<Vec<BulkOutcome>, BulkError> {
    let span = info_span!("bulk", action = action.name(), leads = lead_ids.len());
    let _guard = span.enter();

    let patch = action.to_patch()?;
    let outcomes: Vec<BulkOutcome> = lead_ids
        .iter()
        .map(|lead_id| {
            let result = store.mutate_lead(lead_id, &patch);
            if let Err(error) = &result {
                warn!(lead_id = %lead_id, error = %error, "bulk mutation failed");
            }
            BulkOutcome {
                lead_id: lead_id.clone(),
                result,
            }
        })
        .collect();

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    info!(
        succeeded,
        failed = outcomes.len() - succeeded,
        "bulk action complete"
    );
    Ok(outcomes)
}
