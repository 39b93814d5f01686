//! # Response Models
//!
//! Typed views of the JSON returned by the WorldTides v3 API. The wire format
//! uses camelCase and terse names (`lat`, `requestLat`, `id`); the Rust fields
//! use descriptive names, and each alias is declared next to its field.
//!
//! Unknown fields (e.g. `copyright`) are ignored. Missing required fields make
//! deserialization fail, which the client reports as a validation error.

use serde::{Deserialize, Serialize};

/// Envelope returned by the `stations` query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationResponse {
    /// Status code echoed in the body (200 on success)
    pub status: u16,
    /// Credits consumed by this call
    #[serde(rename = "callCount")]
    pub call_count: u32,
    #[serde(rename = "requestLat")]
    pub latitude: f64,
    #[serde(rename = "requestLon")]
    pub longitude: f64,
    /// Search radius in kilometres, as the server understood it
    #[serde(rename = "stationDistance")]
    pub station_distance: u32,
    /// Stations ordered as the server returned them; absent means none found
    #[serde(default)]
    pub stations: Vec<Station>,
}

/// A tide-measurement location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "id")]
    pub identifier: String,
    pub name: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// IANA timezone name, e.g. `America/Los_Angeles`
    pub timezone: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wire_aliases() {
        let response: StationResponse = serde_json::from_value(json!({
            "status": 200,
            "callCount": 1,
            "requestLat": 33.768321,
            "requestLon": -118.195617,
            "stationDistance": 50,
            "stations": [{
                "id": "noaa:9410660",
                "name": "Los Angeles",
                "lat": 33.72,
                "lon": -118.272,
                "timezone": "America/Los_Angeles"
            }]
        }))
        .unwrap();

        assert_eq!(response.call_count, 1);
        assert_eq!(response.station_distance, 50);
        assert_eq!(response.stations[0].identifier, "noaa:9410660");
        assert_eq!(response.stations[0].timezone, "America/Los_Angeles");
    }

    #[test]
    fn missing_stations_defaults_to_empty() {
        let response: StationResponse = serde_json::from_value(json!({
            "status": 200,
            "callCount": 1,
            "requestLat": 10.0,
            "requestLon": 10.0,
            "stationDistance": 50
        }))
        .unwrap();
        assert!(response.stations.is_empty());
    }

    #[test]
    fn station_requires_every_field() {
        let result = serde_json::from_value::<Station>(json!({
            "id": "noaa:9410660",
            "name": "Los Angeles",
            "lat": 33.72,
            "lon": -118.272
        }));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("timezone"));
    }

    #[test]
    fn serializes_back_to_wire_names() {
        let station = Station {
            identifier: "x".into(),
            name: "Somewhere".into(),
            latitude: 1.0,
            longitude: 2.0,
            timezone: "UTC".into(),
        };
        let value = serde_json::to_value(&station).unwrap();
        assert_eq!(value["id"], "x");
        assert_eq!(value["lat"], 1.0);
        assert!(value.get("identifier").is_none());
    }
}
