// Flattening of hotel-with-rooms entries into UI-ready listings

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::supplier::{Amenity, Hotel, Room};

pub const FALLBACK_IMAGE_URL: &str = "https://images.unsplash.com/photo-1551882547-ff40c63fe5fa?ixlib=rb-4.0.3&auto=format&fit=crop&w=500&q=80";
pub const DEFAULT_RATING: f64 = 4.0;

const UNKNOWN_HOTEL: &str = "Unknown Hotel";
const UNKNOWN_ROOM: &str = "Room";
const MISSING_ADDRESS: &str = "Address not available";

/// One hotel + room pair, the only shape page components consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedListing {
    /// `"{hotel_id}-{room_id}"`
    pub id: String,
    pub hotel_id: i64,
    pub room_id: i64,
    /// `"{hotel name} - {room name}"`
    pub name: String,
    pub hotel_name: String,
    pub address: String,
    pub image: String,
    pub rating: f64,
    /// Effective nightly price in the API's native currency.
    pub price: f64,
    pub original_price: Option<f64>,
    pub discount: Option<f64>,
    pub amenities: AmenityFlags,
    pub description: String,
    pub location: String,
    pub images: Vec<String>,
    pub room: RoomSummary,
}

impl NormalizedListing {
    pub fn has_discount(&self) -> bool {
        self.discount.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmenityFlags {
    pub wifi: bool,
    pub gym: bool,
    pub parking: bool,
}

impl AmenityFlags {
    /// Scan amenity descriptors for the wifi/gym/parking keywords.
    pub fn from_amenities<'a>(amenities: impl IntoIterator<Item = &'a Amenity>) -> Self {
        let mut flags = AmenityFlags::default();
        for amenity in amenities {
            let Some(text) = amenity.sub_item.as_deref() else {
                continue;
            };
            let text = text.to_lowercase();
            flags.wifi |= text.contains("wifi") || text.contains("internet");
            flags.gym |= text.contains("gym") || text.contains("fitness");
            flags.parking |= text.contains("parking");
        }
        flags
    }

    /// Human labels for the flags that are set.
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.wifi, "WiFi"),
            (self.gym, "Gym"),
            (self.parking, "Parking"),
        ]
        .into_iter()
        .filter_map(|(set, label)| set.then_some(label))
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub name: String,
    pub capacity: Option<u32>,
    pub room_type: Option<String>,
    pub room_class: Option<String>,
    pub bed_type: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("room has no parent hotel")]
    MissingHotel,

    #[error("malformed room: {0}")]
    Malformed(String),
}

/// A room dropped during flattening.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRoom {
    /// Page the entry came from. Deals read two pages, so indices alone
    /// are ambiguous.
    pub page: u32,
    pub hotel_index: usize,
    pub room_index: usize,
    pub reason: SkipReason,
}

/// Listings plus the rooms that could not be turned into one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listings {
    pub listings: Vec<NormalizedListing>,
    pub skipped: Vec<SkippedRoom>,
}

impl Listings {
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn absorb(&mut self, other: Listings) {
        self.listings.extend(other.listings);
        self.skipped.extend(other.skipped);
    }

    /// Record which page the skipped rooms came from.
    pub fn from_page(mut self, page: u32) -> Self {
        for skipped in &mut self.skipped {
            skipped.page = page;
        }
        self
    }
}

/// Flatten every entry of a page's `results` array.
pub fn flatten_entries(entries: &[Value]) -> Listings {
    let mut out = Listings::default();
    for (hotel_index, entry) in entries.iter().enumerate() {
        out.absorb(flatten_entry(hotel_index, entry));
    }
    out
}

/// Flatten one `{id, rooms: [...]}` entry. A missing or non-array `rooms`
/// field yields no listings; bad rooms are skipped and recorded.
pub fn flatten_entry(hotel_index: usize, entry: &Value) -> Listings {
    let mut out = Listings::default();
    let Some(rooms) = entry.get("rooms").and_then(Value::as_array) else {
        debug!(hotel_index, "hotel entry has no rooms array");
        return out;
    };

    for (room_index, raw_room) in rooms.iter().enumerate() {
        let reason = match Room::deserialize(raw_room) {
            Ok(room) => match normalize_room(&room) {
                Some(listing) => {
                    out.listings.push(listing);
                    continue;
                }
                None => SkipReason::MissingHotel,
            },
            Err(e) => SkipReason::Malformed(e.to_string()),
        };

        warn!(hotel_index, room_index, %reason, "skipping room");
        out.skipped.push(SkippedRoom {
            page: 1,
            hotel_index,
            room_index,
            reason,
        });
    }

    out
}

/// Build the listing for one room, `None` when the room has no hotel.
pub fn normalize_room(room: &Room) -> Option<NormalizedListing> {
    let hotel = room.hotel.as_ref()?;

    let base_price = room.base_rate();
    let discount = room.active_discount();
    let (price, original_price) = match discount {
        Some(off) => (base_price - base_price * off / 100.0, Some(base_price)),
        None => (base_price, None),
    };

    let hotel_name = non_empty(&hotel.hotel_name).unwrap_or(UNKNOWN_HOTEL);
    let room_name = non_empty(&room.room_name).unwrap_or(UNKNOWN_ROOM);

    Some(NormalizedListing {
        id: format!("{}-{}", hotel.id, room.id),
        hotel_id: hotel.id,
        room_id: room.id,
        name: format!("{hotel_name} - {room_name}"),
        hotel_name: hotel_name.to_string(),
        address: non_empty(&hotel.location_building_address)
            .unwrap_or(MISSING_ADDRESS)
            .to_string(),
        image: resolve_image(room, hotel),
        rating: match hotel.star_rating {
            Some(rating) if rating > 0.0 => rating,
            _ => DEFAULT_RATING,
        },
        price,
        original_price,
        discount,
        amenities: AmenityFlags::from_amenities(
            hotel.amenities.iter().chain(room.rooms_amenities.iter()),
        ),
        description: hotel.describe_property.clone().unwrap_or_default(),
        location: join_location(
            non_empty(&hotel.location_city),
            non_empty(&hotel.location_state),
        ),
        images: collect_images(room, hotel),
        room: RoomSummary {
            name: room_name.to_string(),
            capacity: room.rooms_capacity,
            room_type: room.rooms_type.clone(),
            room_class: room.rooms_class.clone(),
            bed_type: room.rooms_bed_type.clone(),
        },
    })
}

/// First room image, then hotel main photo, then exterior photo, then the
/// fixed fallback.
pub fn resolve_image(room: &Room, hotel: &Hotel) -> String {
    room.roomimages
        .first()
        .and_then(|img| non_empty(&img.image_url))
        .or_else(|| {
            hotel
                .main_photo
                .first()
                .map(String::as_str)
                .filter(|url| !url.is_empty())
        })
        .or_else(|| {
            hotel
                .exterior_photo
                .first()
                .and_then(|photo| non_empty(&photo.img_path))
        })
        .unwrap_or(FALLBACK_IMAGE_URL)
        .to_string()
}

/// Room images, hotel main photos and exterior photos, in that order,
/// without blanks or repeats.
pub fn collect_images(room: &Room, hotel: &Hotel) -> Vec<String> {
    let room_images = room
        .roomimages
        .iter()
        .filter_map(|img| img.image_url.as_deref());
    let main_photos = hotel.main_photo.iter().map(String::as_str);
    let exterior = hotel
        .exterior_photo
        .iter()
        .filter_map(|photo| photo.img_path.as_deref());

    let mut seen = HashSet::new();
    room_images
        .chain(main_photos)
        .chain(exterior)
        .filter(|url| !url.is_empty() && seen.insert(*url))
        .map(str::to_string)
        .collect()
}

fn join_location(city: Option<&str>, state: Option<&str>) -> String {
    match (city, state) {
        (Some(city), Some(state)) => format!("{city}, {state}"),
        (Some(part), None) | (None, Some(part)) => part.to_string(),
        (None, None) => String::new(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{hotel_json, room_json};
    use serde_json::json;

    #[test]
    fn test_late_night_deal_pricing() {
        let entry = json!({
            "id": 1,
            "rooms": [room_json(10, 1000.0, true, 20.0, hotel_json(1, "Eko Suites"))]
        });
        let out = flatten_entry(0, &entry);

        assert_eq!(out.len(), 1);
        let listing = &out.listings[0];
        assert_eq!(listing.price, 800.0);
        assert_eq!(listing.original_price, Some(1000.0));
        assert_eq!(listing.discount, Some(20.0));
        assert!(listing.has_discount());
    }

    #[test]
    fn test_no_deal_keeps_rate() {
        let entry = json!({
            "id": 1,
            "rooms": [room_json(10, 1000.0, false, 20.0, hotel_json(1, "Eko Suites"))]
        });
        let listing = &flatten_entry(0, &entry).listings[0];

        assert_eq!(listing.price, 1000.0);
        assert_eq!(listing.original_price, None);
        assert_eq!(listing.discount, None);
    }

    #[test]
    fn test_identity_and_display_fields() {
        let entry = json!({
            "id": 4,
            "rooms": [room_json(9, 500.0, false, 0.0, hotel_json(4, "Lagos Oriental"))]
        });
        let listing = &flatten_entry(0, &entry).listings[0];

        assert_eq!(listing.id, "4-9");
        assert_eq!(listing.name, "Lagos Oriental - Room 9");
        assert_eq!(listing.hotel_name, "Lagos Oriental");
        assert_eq!(listing.address, "3 Admiralty Way");
        assert_eq!(listing.location, "Lekki, Lagos");
        assert_eq!(listing.room.capacity, Some(2));
        assert_eq!(listing.room.bed_type.as_deref(), Some("King"));
    }

    #[test]
    fn test_missing_names_and_rating_default() {
        let room = Room {
            id: 2,
            hotel: Some(Hotel {
                id: 5,
                star_rating: Some(0.0),
                ..Hotel::default()
            }),
            ..Room::default()
        };
        let listing = normalize_room(&room).unwrap();

        assert_eq!(listing.name, "Unknown Hotel - Room");
        assert_eq!(listing.address, "Address not available");
        assert_eq!(listing.rating, 4.0);
        assert_eq!(listing.location, "");
        assert_eq!(listing.description, "");
    }

    #[test]
    fn test_location_trims_missing_parts() {
        assert_eq!(join_location(None, Some("Lagos")), "Lagos");
        assert_eq!(join_location(Some("Ikeja"), None), "Ikeja");
        assert_eq!(join_location(Some("Ikeja"), Some("Lagos")), "Ikeja, Lagos");
    }

    #[test]
    fn test_rooms_without_hotel_are_skipped() {
        let orphan = room_json(11, 700.0, false, 0.0, json!(null));
        let entries = vec![
            json!({"id": 1, "rooms": [
                room_json(10, 1000.0, false, 0.0, hotel_json(1, "A")),
                orphan,
            ]}),
            json!({"id": 2, "rooms": [
                room_json(20, 900.0, true, 10.0, hotel_json(2, "B")),
                room_json(21, 950.0, false, 0.0, hotel_json(2, "B")),
            ]}),
        ];

        let out = flatten_entries(&entries);
        assert_eq!(out.len(), 3);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].hotel_index, 0);
        assert_eq!(out.skipped[0].room_index, 1);
        assert_eq!(out.skipped[0].reason, SkipReason::MissingHotel);
    }

    #[test]
    fn test_malformed_room_does_not_fail_entry() {
        let entry = json!({"id": 1, "rooms": [
            {"id": "not-a-number", "hotel": hotel_json(1, "A")},
            room_json(10, 1000.0, false, 0.0, hotel_json(1, "A")),
        ]});

        let out = flatten_entry(3, &entry);
        assert_eq!(out.len(), 1);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].hotel_index, 3);
        assert!(matches!(out.skipped[0].reason, SkipReason::Malformed(_)));
    }

    #[test]
    fn test_non_finite_rate_is_skipped_as_malformed() {
        let mut bad = room_json(10, 0.0, true, 0.0, hotel_json(1, "A"));
        bad["rooms_rates_per_night"] = json!("NaN");
        bad["late_night_room_rate_off"] = json!("inf");
        let entry = json!({"id": 1, "rooms": [bad, room_json(11, 900.0, false, 0.0, hotel_json(1, "A"))]});

        let out = flatten_entry(0, &entry);
        assert_eq!(out.len(), 1);
        assert_eq!(out.listings[0].id, "1-11");
        assert!(out.listings.iter().all(|l| l.price.is_finite()));
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].room_index, 0);
        assert!(matches!(out.skipped[0].reason, SkipReason::Malformed(_)));
    }

    #[test]
    fn test_entry_without_rooms_array() {
        assert!(flatten_entry(0, &json!({"id": 1})).is_empty());
        assert!(flatten_entry(0, &json!({"id": 1, "rooms": "none"})).is_empty());
        assert!(flatten_entry(0, &json!({"id": 1, "rooms": []})).is_empty());
    }

    #[test]
    fn test_amenity_keywords_any_case() {
        let amenities = vec![
            Amenity {
                sub_item: Some("Free WIFI in lobby".to_string()),
                ..Amenity::default()
            },
            Amenity {
                sub_item: Some("24h Fitness centre".to_string()),
                ..Amenity::default()
            },
        ];
        let flags = AmenityFlags::from_amenities(&amenities);
        assert!(flags.wifi);
        assert!(flags.gym);
        assert!(!flags.parking);
        assert_eq!(flags.labels(), vec!["WiFi", "Gym"]);
    }

    #[test]
    fn test_absent_amenities_yield_all_false() {
        let room = Room {
            hotel: Some(Hotel::default()),
            ..Room::default()
        };
        let listing = normalize_room(&room).unwrap();
        assert_eq!(listing.amenities, AmenityFlags::default());
    }

    #[test]
    fn test_room_and_hotel_amenities_are_merged() {
        let mut room = room_json(1, 100.0, false, 0.0, hotel_json(1, "A"));
        room["rooms_amenities"] = json!([{"amenity": "Car", "subItem": "Secure Parking"}]);
        let listing = &flatten_entry(0, &json!({"id": 1, "rooms": [room]})).listings[0];

        assert!(listing.amenities.wifi);
        assert!(listing.amenities.parking);
        assert!(!listing.amenities.gym);
    }

    #[test]
    fn test_image_fallback_order() {
        let mut hotel = Hotel {
            main_photo: vec!["https://img/main.jpg".to_string()],
            exterior_photo: vec![crate::supplier::ExteriorPhoto {
                caption: None,
                img_path: Some("https://img/ext.jpg".to_string()),
            }],
            ..Hotel::default()
        };
        let mut room = Room {
            roomimages: vec![crate::supplier::RoomImage {
                id: Some(1),
                image_url: Some("https://img/room.jpg".to_string()),
            }],
            ..Room::default()
        };
        assert_eq!(resolve_image(&room, &hotel), "https://img/room.jpg");

        room.roomimages.clear();
        assert_eq!(resolve_image(&room, &hotel), "https://img/main.jpg");

        hotel.main_photo.clear();
        assert_eq!(resolve_image(&room, &hotel), "https://img/ext.jpg");

        hotel.exterior_photo.clear();
        assert_eq!(resolve_image(&room, &hotel), FALLBACK_IMAGE_URL);
    }

    #[test]
    fn test_combined_images_skip_blanks_and_repeats() {
        let hotel = Hotel {
            main_photo: vec![
                "https://img/a.jpg".to_string(),
                String::new(),
                "https://img/b.jpg".to_string(),
            ],
            exterior_photo: vec![crate::supplier::ExteriorPhoto {
                caption: Some("front".to_string()),
                img_path: Some("https://img/a.jpg".to_string()),
            }],
            ..Hotel::default()
        };
        let room = Room {
            roomimages: vec![crate::supplier::RoomImage {
                id: Some(1),
                image_url: Some("https://img/r.jpg".to_string()),
            }],
            ..Room::default()
        };

        assert_eq!(
            collect_images(&room, &hotel),
            vec!["https://img/r.jpg", "https://img/a.jpg", "https://img/b.jpg"]
        );
    }
}
