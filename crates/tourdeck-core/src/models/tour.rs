use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scheduled location within a tour.
///
/// Stops are plain input data; overlay enrichment happens in the composer,
/// which returns new values rather than mutating these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Scheduled time label, e.g. "11:30 AM".
    pub time: String,
    pub address: String,
    /// Floor or unit label, e.g. "3rd Floor".
    pub floor: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floorplan_url: Option<String>,
}

/// An ordered itinerary of stops for a client visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub client_name: String,
    pub date: NaiveDate,
    /// Start time label for the first stop, e.g. "11:30 AM".
    pub start_time: String,
    pub stops: Vec<Stop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tour_round_trips_through_json() {
        let tour = Tour {
            client_name: "Elpis Biopharmaceuticals".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 24).unwrap(),
            start_time: "11:30 AM".to_string(),
            stops: vec![Stop {
                time: "11:30 AM".to_string(),
                address: "10 Beaver St, Waltham, MA".to_string(),
                floor: "3rd Floor".to_string(),
                lat: 42.3763,
                lon: -71.2351,
                image_url: Some("https://example.com/prop1.jpg".to_string()),
                floorplan_url: None,
            }],
            hero_image: None,
            logo: None,
        };

        let json = serde_json::to_string(&tour).unwrap();
        let back: Tour = serde_json::from_str(&json).unwrap();
        assert_eq!(tour, back);
    }

    #[test]
    fn stop_optional_fields_default_to_none() {
        let stop: Stop = serde_json::from_str(
            r#"{"time":"1:00 PM","address":"1 Main St","floor":"2nd Floor","lat":42.4,"lon":-71.3}"#,
        )
        .unwrap();
        assert!(stop.image_url.is_none());
        assert!(stop.floorplan_url.is_none());
    }
}
