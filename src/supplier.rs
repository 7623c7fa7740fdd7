// Data structures for the TravelHunt hotels JSON response
//
// These mirror what the server sends and are never handed to callers
// directly; `listing` turns them into `NormalizedListing`s.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Validated `{count, next, previous, results}` envelope.
///
/// `results` stays as raw JSON so a single malformed room can be skipped
/// without failing the whole page.
#[derive(Debug, Clone, PartialEq)]
pub struct HotelsPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Amenity {
    pub icon: Option<String>,
    pub amenity: Option<String>,
    #[serde(rename = "subItem")]
    pub sub_item: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoomImage {
    pub id: Option<i64>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExteriorPhoto {
    pub caption: Option<String>,
    #[serde(rename = "imgPath")]
    pub img_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Hotel {
    pub id: i64,
    pub hotel_name: Option<String>,
    pub property_type: Option<String>,
    pub describe_property: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub star_rating: Option<f64>,
    pub location_building_address: Option<String>,
    pub location_state: Option<String>,
    pub location_city: Option<String>,
    pub location_country: Option<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub amenities: Vec<Amenity>,
    #[serde(deserialize_with = "nullable_list")]
    pub main_photo: Vec<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub exterior_photo: Vec<ExteriorPhoto>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub hotel_late_night_deals: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Room {
    pub id: i64,
    pub room_name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub rooms_rates_per_night: Option<f64>,
    pub rooms_capacity: Option<u32>,
    pub rooms_type: Option<String>,
    pub rooms_class: Option<String>,
    pub rooms_bed_type: Option<String>,
    #[serde(deserialize_with = "nullable_list")]
    pub rooms_amenities: Vec<Amenity>,
    pub late_night_deals: Option<bool>,
    #[serde(deserialize_with = "lenient_number")]
    pub late_night_room_rate_off: Option<f64>,
    #[serde(deserialize_with = "nullable_list")]
    pub roomimages: Vec<RoomImage>,
    pub hotel: Option<Hotel>,
}

impl Room {
    /// Nightly rate, zero when the server left it out.
    pub fn base_rate(&self) -> f64 {
        self.rooms_rates_per_night.unwrap_or(0.0)
    }

    /// The late-night discount percentage, only when the deal flag is set
    /// and the percentage is positive.
    pub fn active_discount(&self) -> Option<f64> {
        match (self.late_night_deals, self.late_night_room_rate_off) {
            (Some(true), Some(off)) if off > 0.0 => Some(off),
            _ => None,
        }
    }
}

// Decimal fields come back either as JSON numbers or as strings ("1500.00")
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<NumberOrText>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(NumberOrText::Number(n)) => n,
        Some(NumberOrText::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map_err(|e| serde::de::Error::custom(format!("invalid number {text:?}: {e}")))?
        }
    };

    // "NaN" and "inf" parse as f64 but are never a rate or a percentage
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!("non-finite number {value}")));
    }
    Ok(Some(value))
}

// `null` lists and `null` entries inside lists are both treated as absent
fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}
