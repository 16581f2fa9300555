use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::station_id::is_valid_box_id;
use crate::services::opensensemap::SenseBoxApi;

pub const DEFAULT_SENSOR_TITLE: &str = "temperatur";

/// Case-insensitive substring match against a sensor title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorTitleMatcher {
    needle: String,
}

impl SensorTitleMatcher {
    pub fn new(phrase: &str) -> Self {
        Self {
            needle: phrase.trim().to_lowercase(),
        }
    }

    pub fn phrase(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, title: &str) -> bool {
        !self.needle.is_empty() && title.to_lowercase().contains(&self.needle)
    }
}

impl Default for SensorTitleMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SENSOR_TITLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorResolution {
    Found(String),
    InvalidStationId,
    /// The box answered but has no sensor whose title matches.
    NotApplicable,
    /// Metadata could not be fetched or decoded.
    Unavailable(String),
}

impl SensorResolution {
    pub fn sensor_id(&self) -> Option<&str> {
        match self {
            SensorResolution::Found(id) => Some(id),
            _ => None,
        }
    }
}

/// Descriptors are inspected one at a time; a malformed entry only affects itself.
#[derive(Debug, Deserialize)]
struct BoxMetadata {
    #[serde(default)]
    sensors: Vec<JsonValue>,
}

pub async fn resolve_sensor<A>(
    api: &A,
    box_id: &str,
    matcher: &SensorTitleMatcher,
) -> SensorResolution
where
    A: SenseBoxApi + ?Sized,
{
    if !is_valid_box_id(box_id) {
        return SensorResolution::InvalidStationId;
    }

    let url = api.box_url(box_id);
    let payload = match api.get_json(&url).await {
        Ok(payload) => payload,
        Err(err) => return SensorResolution::Unavailable(err.to_string()),
    };

    match find_sensor(payload, matcher) {
        Ok(Some(sensor_id)) => SensorResolution::Found(sensor_id),
        Ok(None) => SensorResolution::NotApplicable,
        Err(reason) => SensorResolution::Unavailable(format!("malformed box metadata: {reason}")),
    }
}

fn find_sensor(payload: JsonValue, matcher: &SensorTitleMatcher) -> Result<Option<String>, String> {
    let metadata: BoxMetadata = serde_json::from_value(payload).map_err(|err| err.to_string())?;
    let Some(sensor) = metadata.sensors.iter().find(|sensor| {
        sensor
            .get("title")
            .and_then(JsonValue::as_str)
            .is_some_and(|title| matcher.matches(title))
    }) else {
        return Ok(None);
    };
    Ok(sensor
        .get("_id")
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::{find_sensor, SensorTitleMatcher};
    use serde_json::json;

    #[test]
    fn matcher_is_case_insensitive_substring() {
        let matcher = SensorTitleMatcher::default();
        assert!(matcher.matches("Temperatur"));
        assert!(matcher.matches("Temperature"));
        assert!(matcher.matches("Lufttemperatur"));
        assert!(matcher.matches("TEMPERATUR (DHT22)"));
        assert!(!matcher.matches("rel. Luftfeuchte"));
    }

    #[test]
    fn matcher_with_blank_phrase_matches_nothing() {
        let matcher = SensorTitleMatcher::new("   ");
        assert!(!matcher.matches("Temperatur"));
    }

    #[test]
    fn matcher_can_target_other_sensor_types() {
        let matcher = SensorTitleMatcher::new("PM2.5");
        assert_eq!(matcher.phrase(), "pm2.5");
        assert!(matcher.matches("pm2.5 (SDS011)"));
    }

    #[test]
    fn first_matching_sensor_wins() {
        let payload = json!({
            "sensors": [
                {"_id": "aaa", "title": "Luftdruck"},
                {"_id": "bbb", "title": "Temperatur"},
                {"_id": "ccc", "title": "Temperatur (Boden)"},
            ]
        });
        assert_eq!(
            find_sensor(payload, &SensorTitleMatcher::default()),
            Ok(Some("bbb".to_string()))
        );
    }

    #[test]
    fn missing_sensor_list_is_not_applicable() {
        let payload = json!({"_id": "5eba5fbad46fb8001b799786", "name": "Box"});
        assert_eq!(find_sensor(payload, &SensorTitleMatcher::default()), Ok(None));
    }

    #[test]
    fn descriptors_without_title_are_skipped() {
        let payload = json!({
            "sensors": [
                {"_id": "aaa"},
                {"_id": "bbb", "title": "Temperature"},
            ]
        });
        assert_eq!(
            find_sensor(payload, &SensorTitleMatcher::default()),
            Ok(Some("bbb".to_string()))
        );
    }

    #[test]
    fn odd_entries_after_the_match_are_ignored() {
        let payload = json!({
            "sensors": [
                {"_id": "abc", "title": "Temperatur"},
                {"_id": 5, "title": "PM10"},
                "not a descriptor",
                {"_id": "def", "title": ["Temperatur"]},
            ]
        });
        assert_eq!(
            find_sensor(payload, &SensorTitleMatcher::default()),
            Ok(Some("abc".to_string()))
        );
    }

    #[test]
    fn odd_entries_before_the_match_are_skipped() {
        let payload = json!({
            "sensors": [
                null,
                {"_id": 7, "title": 42},
                {"_id": "bbb", "title": "Temperature"},
            ]
        });
        assert_eq!(
            find_sensor(payload, &SensorTitleMatcher::default()),
            Ok(Some("bbb".to_string()))
        );
    }

    #[test]
    fn match_without_string_id_is_not_applicable() {
        let payload = json!({"sensors": [{"_id": 5, "title": "Temperatur"}]});
        assert_eq!(find_sensor(payload, &SensorTitleMatcher::default()), Ok(None));
    }

    #[test]
    fn non_object_payload_is_malformed() {
        assert!(find_sensor(json!([1, 2, 3]), &SensorTitleMatcher::default()).is_err());
        assert!(find_sensor(json!({"sensors": "nope"}), &SensorTitleMatcher::default()).is_err());
    }
}
