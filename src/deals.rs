// Tonight's deals and recommended stays selection

use serde_json::Value;

use crate::listing::{flatten_entry, Listings, NormalizedListing};

/// Listings kept per hotel when none of its rooms carries a deal.
pub const FALLBACK_PER_HOTEL: usize = 2;
/// Below this many picks on page 1, one extra page is fetched.
pub const MIN_DEALS_BEFORE_NEXT_PAGE: usize = 6;
pub const MAX_DEALS: usize = 12;
pub const MAX_RECOMMENDED: usize = 12;

/// Keep a hotel's discounted listings, or its first two when it has none.
pub fn select_for_hotel(listings: Vec<NormalizedListing>) -> Vec<NormalizedListing> {
    if listings.iter().any(NormalizedListing::has_discount) {
        listings.into_iter().filter(|l| l.has_discount()).collect()
    } else {
        listings.into_iter().take(FALLBACK_PER_HOTEL).collect()
    }
}

/// Flatten each hotel entry and apply the per-hotel selection, keeping the
/// skipped-room diagnostics of every entry.
pub fn select_from_entries(entries: &[Value]) -> Listings {
    let mut out = Listings::default();
    for (hotel_index, entry) in entries.iter().enumerate() {
        let flattened = flatten_entry(hotel_index, entry);
        out.listings.extend(select_for_hotel(flattened.listings));
        out.skipped.extend(flattened.skipped);
    }
    out
}

pub fn wants_next_page(selected: usize, has_next: bool) -> bool {
    has_next && selected < MIN_DEALS_BEFORE_NEXT_PAGE
}

/// Highest rated first; ties keep their deal order.
pub fn rank_recommended(mut listings: Vec<NormalizedListing>) -> Vec<NormalizedListing> {
    listings.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    listings.truncate(MAX_RECOMMENDED);
    listings
}
