use serde_json::Value;
use url::Url;

use crate::collectors::CandidateRecord;
use crate::error::AppError;
use crate::extract::field::{FieldSource, RawField};
use crate::extract::normalize::normalize;

const LOCATION_PARTS: [&str; 3] = ["city", "region", "country"];

/// SmartRecruiters public postings feed
/// (`api.smartrecruiters.com/v1/companies/{id}/postings`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmartRecruiters;

impl SmartRecruiters {
    pub fn name(&self) -> &'static str {
        "smartrecruiters"
    }

    /// Map the feed's `content` array to candidate records, in feed order.
    /// Postings without a `name` carry no title and are dropped.
    pub fn parse_postings(
        &self,
        feed: &Value,
        feed_url: &Url,
    ) -> Result<Vec<CandidateRecord>, AppError> {
        let postings = feed
            .get("content")
            .and_then(|v| v.as_array())
            .ok_or_else(|| AppError::Page("Missing 'content' in postings feed".to_string()))?;

        tracing::info!("Found {} jobs from API", postings.len());

        let mut records = Vec::new();
        for raw in postings {
            if let Some(record) = parse_posting(raw, feed_url) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn parse_posting(raw: &Value, feed_url: &Url) -> Option<CandidateRecord> {
    let name = raw.get("name").and_then(|v| v.as_str())?;

    let location = raw.get("location").and_then(join_location).map(|text| RawField {
        text,
        source: FieldSource::Feed("location"),
    });

    let url = raw
        .get("ref")
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| feed_url.to_string());

    Some(CandidateRecord {
        title: RawField {
            text: normalize(name),
            source: FieldSource::Feed("name"),
        },
        location,
        url,
    })
}

/// "City, Region, Country" with absent or blank parts left out.
fn join_location(location: &Value) -> Option<String> {
    let parts: Vec<&str> = LOCATION_PARTS
        .iter()
        .filter_map(|key| location.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn feed_url() -> Url {
        Url::parse("https://api.smartrecruiters.com/v1/companies/MicroStrategy1/postings").unwrap()
    }

    #[test]
    fn maps_postings_in_order() {
        let feed = json!({
            "offset": 0,
            "limit": 100,
            "totalFound": 3,
            "content": [
                {
                    "id": "744000001",
                    "name": "Senior Software Engineer",
                    "ref": "https://api.smartrecruiters.com/v1/companies/MicroStrategy1/postings/744000001",
                    "location": { "city": "Tysons Corner", "region": "VA", "country": "us", "remote": false }
                },
                { "id": "744000002", "location": { "city": "Madrid" } },
                {
                    "id": "744000003",
                    "name": "Sales Engineer",
                    "location": { "city": "", "region": null, "country": "pl" }
                },
                { "id": "744000004", "name": "Support Analyst", "location": {} }
            ]
        });

        let records = SmartRecruiters.parse_postings(&feed, &feed_url()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].title.text, "Senior Software Engineer");
        assert_eq!(records[0].title.source, FieldSource::Feed("name"));
        assert_eq!(records[0].location.as_ref().unwrap().text, "Tysons Corner, VA, us");
        assert!(records[0].url.ends_with("/postings/744000001"));

        assert_eq!(records[1].location.as_ref().unwrap().text, "pl");
        assert_eq!(records[1].url, feed_url().to_string());

        assert_eq!(records[2].title.text, "Support Analyst");
        assert_eq!(records[2].location, None);
    }

    #[test]
    fn missing_content_is_a_fault() {
        let err = SmartRecruiters
            .parse_postings(&json!({ "message": "Company not found" }), &feed_url())
            .unwrap_err();
        assert!(matches!(err, AppError::Page(_)));
    }

    #[test]
    fn empty_content_is_empty() {
        let records = SmartRecruiters
            .parse_postings(&json!({ "content": [] }), &feed_url())
            .unwrap();
        assert!(records.is_empty());
    }
}
