// Client-side search, result filters and sort orders

use std::cmp::Ordering;
use std::str::FromStr;

use crate::listing::{AmenityFlags, NormalizedListing};

/// Case-insensitive substring match against name, address or location.
pub fn matches_query(listing: &NormalizedListing, query: &str) -> bool {
    let query = query.to_lowercase();
    [&listing.name, &listing.address, &listing.location]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Keep the listings matching `query`, in their original order.
pub fn search_listings(listings: Vec<NormalizedListing>, query: &str) -> Vec<NormalizedListing> {
    listings
        .into_iter()
        .filter(|listing| matches_query(listing, query))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amenity {
    Wifi,
    Gym,
    Parking,
}

impl Amenity {
    pub fn is_offered(self, flags: &AmenityFlags) -> bool {
        match self {
            Amenity::Wifi => flags.wifi,
            Amenity::Gym => flags.gym,
            Amenity::Parking => flags.parking,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Price,
    PriceDesc,
    Rating,
    Name,
    /// Keep the order the server returned.
    Unsorted,
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    // Unknown keys leave results unsorted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "price" => SortOrder::Price,
            "price-desc" => SortOrder::PriceDesc,
            "rating" => SortOrder::Rating,
            "name" => SortOrder::Name,
            _ => SortOrder::Unsorted,
        })
    }
}

impl SortOrder {
    fn compare(self, a: &NormalizedListing, b: &NormalizedListing) -> Ordering {
        match self {
            SortOrder::Price => a.price.total_cmp(&b.price),
            SortOrder::PriceDesc => b.price.total_cmp(&a.price),
            SortOrder::Rating => b.rating.total_cmp(&a.rating),
            SortOrder::Name => a
                .name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name)),
            SortOrder::Unsorted => Ordering::Equal,
        }
    }
}

/// Filters for the search results view.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFilter {
    /// Inclusive nightly price bounds.
    pub price_range: (f64, f64),
    pub min_rating: f64,
    pub amenities: Vec<Amenity>,
    pub sort: SortOrder,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            price_range: (0.0, 1000.0),
            min_rating: 0.0,
            amenities: Vec::new(),
            sort: SortOrder::Price,
        }
    }
}

impl ListingFilter {
    pub fn matches(&self, listing: &NormalizedListing) -> bool {
        let (min, max) = self.price_range;
        if listing.price < min || listing.price > max {
            return false;
        }

        if listing.rating < self.min_rating {
            return false;
        }

        self.amenities
            .iter()
            .all(|amenity| amenity.is_offered(&listing.amenities))
    }

    /// Filter, then stable-sort by the selected order.
    pub fn apply(&self, listings: &[NormalizedListing]) -> Vec<NormalizedListing> {
        let mut filtered: Vec<NormalizedListing> = listings
            .iter()
            .filter(|listing| self.matches(listing))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| self.sort.compare(a, b));
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::entry_json;
    use crate::listing::flatten_entries;
    use test_case::test_case;

    fn sample_listings() -> Vec<NormalizedListing> {
        let mut listings = flatten_entries(&[
            entry_json(1, "Lagos Continental", &[(1, 150.0, 0.0)]),
            entry_json(2, "Abuja Budget Inn", &[(2, 80.0, 0.0)]),
            entry_json(3, "Resort Spa", &[(3, 250.0, 0.0)]),
        ])
        .listings;

        listings[0].rating = 5.0;
        listings[1].rating = 3.0;
        listings[1].amenities.wifi = false;
        listings[2].rating = 4.0;
        listings[2].amenities.gym = true;
        listings[2].address = "12 Marina Road".to_string();
        listings[2].location = "Ikoyi, Lagos".to_string();
        listings[1].location = "Garki, Abuja".to_string();
        listings[1].address = "5 Ahmadu Bello Way".to_string();
        listings[0].location = "Victoria Island, Lagos".to_string();
        listings
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let found = search_listings(sample_listings(), "LAGOS");
        let ids: Vec<_> = found.iter().map(|l| l.id.as_str()).collect();
        // first by name and location, third by location only
        assert_eq!(ids, vec!["1-1", "3-3"]);
    }

    #[test]
    fn test_search_matches_address() {
        let found = search_listings(sample_listings(), "marina");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "3-3");
    }

    #[test]
    fn test_search_no_match() {
        assert!(search_listings(sample_listings(), "kano").is_empty());
    }

    #[test_case(ListingFilter {price_range: (0.0, 100.0), ..ListingFilter::default()},
        vec!["2-2"]; "#1 max price")]
    #[test_case(ListingFilter {min_rating: 4.0, ..ListingFilter::default()},
        vec!["1-1", "3-3"]; "#2 min rating")]
    #[test_case(ListingFilter {price_range: (0.0, 500.0), amenities: vec![Amenity::Gym], ..ListingFilter::default()},
        vec!["3-3"]; "#3 required amenity")]
    #[test_case(ListingFilter {price_range: (0.0, 500.0), amenities: vec![Amenity::Wifi], sort: SortOrder::PriceDesc, ..ListingFilter::default()},
        vec!["3-3", "1-1"]; "#4 wifi sorted by price desc")]
    #[test_case(ListingFilter {price_range: (0.0, 500.0), sort: SortOrder::Rating, ..ListingFilter::default()},
        vec!["1-1", "3-3", "2-2"]; "#5 sort by rating")]
    #[test_case(ListingFilter {price_range: (0.0, 500.0), sort: SortOrder::Name, ..ListingFilter::default()},
        vec!["2-2", "1-1", "3-3"]; "#6 sort by name")]
    #[test_case(ListingFilter {price_range: (0.0, 500.0), sort: SortOrder::Unsorted, ..ListingFilter::default()},
        vec!["1-1", "2-2", "3-3"]; "#7 unsorted keeps order")]
    fn test_filter_and_sort(filter: ListingFilter, expected: Vec<&str>) {
        let results = filter.apply(&sample_listings());
        let ids: Vec<_> = results.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_default_filter_sorts_by_price() {
        let results = ListingFilter::default().apply(&sample_listings());
        let ids: Vec<_> = results.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["2-2", "1-1", "3-3"]);
    }

    #[test]
    fn test_sort_order_from_str() {
        assert_eq!("price-desc".parse::<SortOrder>(), Ok(SortOrder::PriceDesc));
        assert_eq!("rating".parse::<SortOrder>(), Ok(SortOrder::Rating));
        assert_eq!("popularity".parse::<SortOrder>(), Ok(SortOrder::Unsorted));
    }
}
