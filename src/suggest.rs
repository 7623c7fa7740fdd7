// Destination suggestions for the search box

use serde::Serialize;

use crate::filter::matches_query;
use crate::listing::NormalizedListing;

pub const MIN_QUERY_CHARS: usize = 2;
pub const MAX_SUGGESTIONS: usize = 8;

/// Ordered by how suggestions are ranked: hotels first, countries last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Hotel,
    City,
    Region,
    Country,
}

impl SuggestionKind {
    fn prefix(self) -> &'static str {
        match self {
            SuggestionKind::Hotel => "hotel",
            SuggestionKind::City => "city",
            SuggestionKind::Region => "region",
            SuggestionKind::Country => "country",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub kind: SuggestionKind,
    pub region: Option<String>,
    pub country: Option<String>,
    /// Set for hotel suggestions.
    pub listing_id: Option<String>,
}

impl Suggestion {
    fn place(kind: SuggestionKind, name: &str) -> Self {
        let slug = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        let (region, country) = match kind {
            SuggestionKind::Country => (None, Some(name.to_string())),
            _ => (Some(name.to_string()), None),
        };
        Suggestion {
            id: format!("{}-{slug}", kind.prefix()),
            name: name.to_string(),
            kind,
            region,
            country,
            listing_id: None,
        }
    }
}

/// Build up to eight suggestions for `query` from already-fetched listings.
pub fn suggest(listings: &[NormalizedListing], query: &str) -> Vec<Suggestion> {
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    let mut suggestions = Vec::new();
    let mut cities: Vec<String> = Vec::new();
    let mut regions: Vec<String> = Vec::new();
    let mut countries: Vec<String> = Vec::new();

    for listing in listings.iter().filter(|l| matches_query(l, query)) {
        let parts: Vec<&str> = if listing.location.is_empty() {
            Vec::new()
        } else {
            listing.location.split(',').map(str::trim).collect()
        };

        suggestions.push(Suggestion {
            id: format!("hotel-{}", listing.id),
            name: listing.name.clone(),
            kind: SuggestionKind::Hotel,
            region: parts.first().map(|p| p.to_string()),
            country: parts.last().map(|p| p.to_string()),
            listing_id: Some(listing.id.clone()),
        });

        if let Some(city) = parts.first().filter(|p| mentions(p, &needle)) {
            push_unique(&mut cities, city);
        }
        if parts.len() > 1 {
            if let Some(country) = parts.last().filter(|p| mentions(p, &needle)) {
                push_unique(&mut countries, country);
            }
        }
        if parts.len() > 2 {
            for region in &parts[1..parts.len() - 1] {
                if mentions(region, &needle) {
                    push_unique(&mut regions, region);
                }
            }
        }

        for part in listing.address.split(',').map(str::trim) {
            if part.chars().count() > 2 && mentions(part, &needle) {
                push_unique(&mut cities, part);
            }
        }
    }

    let places = cities
        .iter()
        .map(|name| (SuggestionKind::City, name))
        .chain(regions.iter().map(|name| (SuggestionKind::Region, name)))
        .chain(countries.iter().map(|name| (SuggestionKind::Country, name)));
    for (kind, name) in places {
        suggestions.push(Suggestion::place(kind, name));
    }

    // first suggestion with a given name wins
    let mut seen: Vec<String> = Vec::new();
    suggestions.retain(|s| {
        let key = s.name.to_lowercase();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });

    suggestions.sort_by(|a, b| {
        let a_prefix = a.name.to_lowercase().starts_with(&needle);
        let b_prefix = b.name.to_lowercase().starts_with(&needle);
        a.kind
            .cmp(&b.kind)
            .then_with(|| b_prefix.cmp(&a_prefix))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

fn mentions(part: &str, needle: &str) -> bool {
    part.to_lowercase().contains(needle)
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
