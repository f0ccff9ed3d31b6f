//! Kakao Local API document post-processing.
//!
//! Documents are passed through as raw JSON so the browser sees exactly what
//! Kakao returned; only filtering, dedup and ordering happen here.

use serde_json::Value;
use std::collections::HashSet;

use wxgate_core::SearchDedup;

/// Administrative suffixes accepted as neighborhood-level results.
const NEIGHBORHOOD_SUFFIXES: [char; 3] = ['동', '읍', '면'];

/// `address_name` of a search document, or `""`.
pub fn address_name(doc: &Value) -> &str {
    doc.get("address_name").and_then(Value::as_str).unwrap_or_default()
}

/// Whether `doc` names a 동, 읍 or 면.
pub fn is_neighborhood(doc: &Value) -> bool {
    address_name(doc)
        .trim_end()
        .chars()
        .last()
        .is_some_and(|c| NEIGHBORHOOD_SUFFIXES.contains(&c))
}

/// Keep neighborhood documents only, in order.
pub fn filter_neighborhoods(documents: &[Value]) -> Vec<Value> {
    documents.iter().filter(|doc| is_neighborhood(doc)).cloned().collect()
}

/// Keep the first document for each `(x, y)` pair.
pub fn dedup_by_coordinates(documents: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    documents
        .into_iter()
        .filter(|doc| {
            let x = doc.get("x").map(coordinate).unwrap_or_default();
            let y = doc.get("y").map(coordinate).unwrap_or_default();
            seen.insert((x, y))
        })
        .collect()
}

/// Keep the first document for each composed region, sorted by that region.
pub fn dedup_by_region(documents: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut kept: Vec<(String, Value)> = documents
        .into_iter()
        .filter_map(|doc| {
            let region = region_of(&doc);
            seen.insert(region.clone()).then_some((region, doc))
        })
        .collect();

    kept.sort_by(|a, b| a.0.cmp(&b.0));
    kept.into_iter().map(|(_, doc)| doc).collect()
}

/// Apply the configured dedup strategy.
pub fn dedup(documents: Vec<Value>, mode: SearchDedup) -> Vec<Value> {
    match mode {
        SearchDedup::Coordinates => dedup_by_coordinates(documents),
        SearchDedup::Region => dedup_by_region(documents),
    }
}

/// `"region_1 region_2 region_3"` from an `address` object.
///
/// Missing depths are skipped. Returns `None` when nothing is present.
pub fn compose_region(address: &Value) -> Option<String> {
    let parts: Vec<&str> = ["region_1depth_name", "region_2depth_name", "region_3depth_name"]
        .iter()
        .filter_map(|field| address.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Region string from the first coord2address document.
pub fn first_region(payload: &Value) -> Option<String> {
    payload.pointer("/documents/0/address").and_then(compose_region)
}

fn region_of(doc: &Value) -> String {
    doc.get("address")
        .and_then(compose_region)
        .unwrap_or_else(|| address_name(doc).trim().to_string())
}

// Kakao sends coordinates as strings, but tolerate numbers.
fn coordinate(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(name: &str, x: &str, y: &str) -> Value {
        json!({ "address_name": name, "x": x, "y": y })
    }

    #[test]
    fn test_is_neighborhood() {
        assert!(is_neighborhood(&doc("서울 강남구 역삼동", "1", "1")));
        assert!(is_neighborhood(&doc("경기 양평군 양평읍", "1", "1")));
        assert!(is_neighborhood(&doc("강원 홍천군 내면", "1", "1")));
        assert!(!is_neighborhood(&doc("서울 강남구", "1", "1")));
        assert!(!is_neighborhood(&doc("서울 강남구 역삼동 123-4", "1", "1")));
        assert!(!is_neighborhood(&json!({ "x": "1" })));
    }

    #[test]
    fn test_filter_keeps_order() {
        let docs = vec![doc("서울 강남구", "0", "0"), doc("B동", "1", "1"), doc("A면", "2", "2")];
        let filtered = filter_neighborhoods(&docs);
        assert_eq!(filtered.len(), 2);
        assert_eq!(address_name(&filtered[0]), "B동");
        assert_eq!(address_name(&filtered[1]), "A면");
    }

    #[test]
    fn test_dedup_by_coordinates_keeps_first() {
        let docs = vec![
            doc("서울 강남구 역삼동", "127.03", "37.50"),
            doc("서울 강남구 역삼1동", "127.03", "37.50"),
            doc("서울 강남구 역삼2동", "127.04", "37.49"),
        ];
        let deduped = dedup_by_coordinates(docs);

        assert_eq!(deduped.len(), 2);
        assert_eq!(address_name(&deduped[0]), "서울 강남구 역삼동");
        assert_eq!(address_name(&deduped[1]), "서울 강남구 역삼2동");
    }

    #[test]
    fn test_dedup_numeric_coordinates() {
        let docs = vec![
            json!({ "address_name": "서울 강남구 역삼동", "x": 1, "y": 1 }),
            json!({ "address_name": "서울 강남구 역삼동", "x": 1, "y": 1 }),
        ];
        let deduped = dedup(filter_neighborhoods(&docs), SearchDedup::Coordinates);
        assert_eq!(deduped, vec![json!({ "address_name": "서울 강남구 역삼동", "x": 1, "y": 1 })]);
    }

    #[test]
    fn test_dedup_by_region_sorts() {
        let docs = vec![
            json!({ "address_name": "서울 중구 명동", "address": {
                "region_1depth_name": "서울", "region_2depth_name": "중구", "region_3depth_name": "명동" } }),
            json!({ "address_name": "서울 강남구 역삼동", "x": "1", "address": {
                "region_1depth_name": "서울", "region_2depth_name": "강남구", "region_3depth_name": "역삼동" } }),
            json!({ "address_name": "서울 강남구 역삼동", "x": "2", "address": {
                "region_1depth_name": "서울", "region_2depth_name": "강남구", "region_3depth_name": "역삼동" } }),
            doc("부산 중구 남포동", "3", "3"),
        ];
        let deduped = dedup_by_region(docs);

        let names: Vec<&str> = deduped.iter().map(address_name).collect();
        assert_eq!(names, vec!["부산 중구 남포동", "서울 강남구 역삼동", "서울 중구 명동"]);
        assert_eq!(deduped[1]["x"], "1");
    }

    #[test]
    fn test_compose_region() {
        let address = json!({ "region_1depth_name": "서울", "region_2depth_name": "강남구", "region_3depth_name": "역삼동" });
        assert_eq!(compose_region(&address).as_deref(), Some("서울 강남구 역삼동"));

        let partial = json!({ "region_1depth_name": "세종특별자치시", "region_2depth_name": "", "region_3depth_name": "" });
        assert_eq!(compose_region(&partial).as_deref(), Some("세종특별자치시"));

        assert_eq!(compose_region(&json!({})), None);
    }

    #[test]
    fn test_first_region() {
        let payload = json!({ "documents": [{ "address": {
            "region_1depth_name": "서울", "region_2depth_name": "종로구", "region_3depth_name": "청운동" } }] });
        assert_eq!(first_region(&payload).as_deref(), Some("서울 종로구 청운동"));
        assert_eq!(first_region(&json!({ "documents": [] })), None);
        assert_eq!(first_region(&json!({ "documents": [{ "address": null }] })), None);
    }
}
