use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::geofence::GeoPoint;

/// Issue category, matching the category strings the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Category {
    #[serde(rename = "Technical")]
    #[value(name = "technical")]
    Technical,
    #[serde(rename = "Parking")]
    #[value(name = "parking")]
    Parking,
    #[serde(rename = "Electrical & Lighting")]
    #[value(name = "electrical")]
    ElectricalAndLighting,
    #[serde(rename = "Academics & Administration")]
    #[value(name = "academics")]
    AcademicsAndAdministration,
    #[serde(rename = "Sanitation")]
    #[value(name = "sanitation")]
    Sanitation,
    #[serde(rename = "Others")]
    #[value(name = "others")]
    Others,
}

impl Category {
    /// The display string the backend uses for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technical => "Technical",
            Category::Parking => "Parking",
            Category::ElectricalAndLighting => "Electrical & Lighting",
            Category::AcademicsAndAdministration => "Academics & Administration",
            Category::Sanitation => "Sanitation",
            Category::Others => "Others",
        }
    }
}

/// Wire shape of a report location: the coordinate plus the reverse-geocoded
/// address shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
}

impl ReportLocation {
    pub fn new(point: GeoPoint, address: String) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            address: Some(address),
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Payload for creating a report. The image is a base64 data URI.
#[derive(Debug, Clone, Serialize)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub image: String,
    pub location: ReportLocation,
    pub category: Category,
    pub tags: Vec<String>,
}

/// A stored report as returned by the listing endpoint.
///
/// The image fields are omitted from deserialization defaults so listings
/// from older backend versions (no solutionImage) still parse.
#[derive(Debug, Clone, Deserialize)]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    pub location: ReportLocation,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "solutionImage", default)]
    pub solution_image: Option<String>,
}

impl Report {
    pub fn is_resolved(&self) -> bool {
        self.status.as_deref() == Some("resolved")
    }
}

/// Split a comma-separated tag string into trimmed tags, dropping empties.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&Category::ElectricalAndLighting).unwrap();
        assert_eq!(json, r#""Electrical & Lighting""#);

        let parsed: Category = serde_json::from_str(r#""Sanitation""#).unwrap();
        assert_eq!(parsed, Category::Sanitation);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags("pothole, road , urgent"),
            vec!["pothole", "road", "urgent"]
        );
        assert_eq!(parse_tags(""), Vec::<String>::new());
        assert_eq!(parse_tags(" , ,"), Vec::<String>::new());
    }

    #[test]
    fn test_new_report_serialization() {
        let report = NewReport {
            title: "Broken light".to_string(),
            description: "Lamp post out near gate 2".to_string(),
            image: "data:image/jpeg;base64,AAAA".to_string(),
            location: ReportLocation::new(
                GeoPoint::new(19.0213, 72.8707),
                "Main Quad, Campus".to_string(),
            ),
            category: Category::ElectricalAndLighting,
            tags: vec!["lighting".to_string()],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["category"], "Electrical & Lighting");
        assert_eq!(value["location"]["latitude"], 19.0213);
        assert_eq!(value["location"]["address"], "Main Quad, Campus");
    }

    #[test]
    fn test_report_deserializes_with_missing_optionals() {
        let json = r#"{
            "_id": "abc123",
            "title": "Leaky tap",
            "description": "Washroom tap running",
            "location": {"latitude": 19.021, "longitude": 72.8705},
            "category": "Sanitation",
            "status": "resolved",
            "createdAt": "2025-03-02T10:15:00Z"
        }"#;

        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.id, "abc123");
        assert!(report.is_resolved());
        assert!(report.solution_image.is_none());
        assert!(report.tags.is_empty());
        assert!(report.location.address.is_none());
    }
}
