//! Duplicate detection against existing leads and within a batch.
//!
//! Two keys identify a duplicate:
//! * the normalized phone number (`number`), compared across sources;
//! * the source row id (`sourceRowId`), compared within the same source.
//!
//! Invalid candidates are never flagged. When several existing leads match,
//! the one appearing first in the supplied order wins.

use std::collections::HashMap;

use intake_model::{
    CandidateRecord, CanonicalLead, DuplicateRef, LeadId, PHONE_FIELD, SOURCE_ROW_ID_FIELD,
    SourceKey,
};
use intake_transform::normalize_phone;

type RowKey = (SourceKey, String);

fn phone_key(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_phone)
        .filter(|phone| !phone.is_empty())
}

fn row_key(source_key: &SourceKey, value: Option<&str>) -> Option<RowKey> {
    value
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| (source_key.clone(), id.to_string()))
}

/// Lookup over a snapshot of existing leads.
#[derive(Debug, Default)]
pub struct DedupIndex<'a> {
    by_phone: HashMap<String, (usize, &'a LeadId)>,
    by_row: HashMap<RowKey, (usize, &'a LeadId)>,
}

impl<'a> DedupIndex<'a> {
    pub fn new(existing: &'a [CanonicalLead]) -> Self {
        let mut index = Self::default();
        for (position, lead) in existing.iter().enumerate() {
            if let Some(phone) = phone_key(lead.phone()) {
                index
                    .by_phone
                    .entry(phone)
                    .or_insert((position, &lead.lead_id));
            }
            let source_row_id = lead
                .source_row_id
                .as_deref()
                .or_else(|| lead.field(SOURCE_ROW_ID_FIELD));
            if let Some(key) = row_key(&lead.source_key, source_row_id) {
                index
                    .by_row
                    .entry(key)
                    .or_insert((position, &lead.lead_id));
            }
        }
        index
    }

    /// First existing lead matching the candidate on either key.
    pub fn find(&self, candidate: &CandidateRecord) -> Option<&'a LeadId> {
        let by_phone = phone_key(candidate.field(PHONE_FIELD))
            .and_then(|phone| self.by_phone.get(&phone).copied());
        let by_row = row_key(&candidate.source_key, candidate.field(SOURCE_ROW_ID_FIELD))
            .and_then(|key| self.by_row.get(&key).copied());
        match (by_phone, by_row) {
            (Some(a), Some(b)) => Some(if a.0 <= b.0 { a.1 } else { b.1 }),
            (a, b) => a.or(b).map(|(_, id)| id),
        }
    }
}

/// Tracks keys claimed by earlier candidates of the same batch.
#[derive(Debug, Default)]
struct BatchIndex {
    by_phone: HashMap<String, DuplicateRef>,
    by_row: HashMap<RowKey, DuplicateRef>,
}

impl BatchIndex {
    fn claim(&mut self, candidate: &CandidateRecord) -> Option<DuplicateRef> {
        let phone = phone_key(candidate.field(PHONE_FIELD));
        let row = row_key(&candidate.source_key, candidate.field(SOURCE_ROW_ID_FIELD));
        let earlier = phone
            .as_ref()
            .and_then(|phone| self.by_phone.get(phone))
            .or_else(|| row.as_ref().and_then(|row| self.by_row.get(row)))
            .cloned();
        if earlier.is_none() {
            let claimed = DuplicateRef::Candidate {
                candidate_id: candidate.id,
                row_number: candidate.row_number,
            };
            if let Some(phone) = phone {
                self.by_phone.insert(phone, claimed.clone());
            }
            if let Some(row) = row {
                self.by_row.insert(row, claimed);
            }
        }
        earlier
    }
}

/// Returns the candidates with duplicate flags recomputed.
///
/// Existing leads are checked first; a candidate that matches none of them
/// is then compared against the earlier ready candidates of the batch.
pub fn mark_duplicates(
    candidates: &[CandidateRecord],
    existing: &[CanonicalLead],
) -> Vec<CandidateRecord> {
    let index = DedupIndex::new(existing);
    let mut batch = BatchIndex::default();
    candidates
        .iter()
        .map(|candidate| {
            let mut candidate = candidate.clone();
            candidate.is_duplicate = false;
            candidate.duplicate_of = None;
            if !candidate.is_valid {
                return candidate;
            }
            if let Some(lead_id) = index.find(&candidate) {
                candidate.mark_duplicate(DuplicateRef::Lead {
                    lead_id: lead_id.clone(),
                });
            } else if let Some(earlier) = batch.claim(&candidate) {
                candidate.mark_duplicate(earlier);
            }
            candidate
        })
        .collect()
}
