use crate::models::Item;

/// Candidate must be reported on the other side of the exchange
#[inline]
pub fn is_opposite_type(item: &Item, candidate: &Item) -> bool {
    candidate.item_type == item.item_type.opposite()
}

/// Candidate must come from a different reporter
#[inline]
pub fn is_distinct_reporter(item: &Item, candidate: &Item) -> bool {
    !candidate.user_email.eq_ignore_ascii_case(&item.user_email)
}

/// Candidate must still be open
#[inline]
pub fn is_open(candidate: &Item) -> bool {
    candidate.is_active()
}

/// Whether `candidate` may be paired with `item` at all.
///
/// This is the pre-scoring stage of the matching pipeline: opposite type,
/// distinct reporter, active status, and never the item itself.
#[inline]
pub fn is_candidate(item: &Item, candidate: &Item) -> bool {
    candidate.id != item.id
        && is_opposite_type(item, candidate)
        && is_distinct_reporter(item, candidate)
        && is_open(candidate)
}
