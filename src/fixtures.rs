// Raw API payloads shared by the unit tests

use serde_json::{json, Value};

pub fn hotel_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "hotel_name": name,
        "property_type": "Hotel",
        "describe_property": format!("{name} in the heart of the city"),
        "star_rating": 4.5,
        "location_building_address": "3 Admiralty Way",
        "location_state": "Lagos",
        "location_city": "Lekki",
        "location_country": "Nigeria",
        "amenities": [
            {"icon": "wifi", "amenity": "Internet", "subItem": "Free WiFi"}
        ],
        "main_photo": [format!("https://img.example/{id}/main.jpg")],
        "exterior_photo": [
            {"caption": "Front", "imgPath": format!("https://img.example/{id}/front.jpg")}
        ],
        "check_in_time": "14:00",
        "check_out_time": "12:00",
        "hotel_late_night_deals": false
    })
}

pub fn room_json(id: i64, rate: f64, deal: bool, off: f64, hotel: Value) -> Value {
    json!({
        "id": id,
        "room_name": format!("Room {id}"),
        "rooms_rates_per_night": rate,
        "rooms_capacity": 2,
        "rooms_type": "Double",
        "rooms_class": "Standard",
        "rooms_bed_type": "King",
        "rooms_amenities": [],
        "late_night_deals": deal,
        "late_night_room_rate_off": off,
        "roomimages": [],
        "hotel": hotel
    })
}

/// A hotel entry whose rooms are `(room_id, rate, discount)`; a discount of
/// zero means no late-night deal.
pub fn entry_json(hotel_id: i64, name: &str, rooms: &[(i64, f64, f64)]) -> Value {
    let rooms: Vec<Value> = rooms
        .iter()
        .map(|&(room_id, rate, off)| {
            room_json(room_id, rate, off > 0.0, off, hotel_json(hotel_id, name))
        })
        .collect();
    json!({"id": hotel_id, "rooms": rooms})
}

pub fn page_json(entries: Vec<Value>, next: Option<&str>) -> Value {
    json!({
        "count": entries.len(),
        "next": next,
        "previous": null,
        "results": entries
    })
}
