//! Wire shapes of the collaborating movie backends.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{domain::MovieId, error::DecodeError};

/// Film catalogue record, as served inside a `results` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFilm {
    pub episode_id: i64,
    pub title: String,
    #[serde(default)]
    pub opening_crawl: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// JSON-document store record; its identifier is the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawKeyedMovie {
    pub title: String,
    #[serde(default)]
    pub opening_text: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMovieRecord {
    Film(RawFilm),
    Keyed { key: String, movie: RawKeyedMovie },
}

/// Response to a create request. Document stores report the generated key
/// as `name`; other backends use `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovieResponse {
    #[serde(alias = "id")]
    pub name: MovieId,
}

/// Splits a list response body into raw records, preserving document order.
pub fn decode_collection(body: Value) -> Result<Vec<RawMovieRecord>, DecodeError> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => decode_films(items),
        Value::Object(mut map) => {
            if matches!(map.get("results"), Some(Value::Array(_))) {
                let Some(Value::Array(items)) = map.remove("results") else {
                    return Err(DecodeError::UnexpectedShape("results is not an array"));
                };
                return decode_films(items);
            }

            let mut records = Vec::with_capacity(map.len());
            for (key, value) in map {
                if value.is_null() {
                    continue;
                }
                let movie = serde_json::from_value::<RawKeyedMovie>(value).map_err(|source| {
                    DecodeError::MalformedRecord {
                        key: key.clone(),
                        source,
                    }
                })?;
                records.push(RawMovieRecord::Keyed { key, movie });
            }
            Ok(records)
        }
        _ => Err(DecodeError::UnexpectedShape(
            "expected an object, an array or null",
        )),
    }
}

fn decode_films(items: Vec<Value>) -> Result<Vec<RawMovieRecord>, DecodeError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<RawFilm>(value)
                .map(RawMovieRecord::Film)
                .map_err(|source| DecodeError::MalformedRecord {
                    key: format!("#{index}"),
                    source,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_results_envelope() {
        let records = decode_collection(json!({
            "count": 1,
            "results": [{
                "episode_id": 4,
                "title": "A New Hope",
                "opening_crawl": "...",
                "release_date": "1977-05-25",
                "director": "George Lucas"
            }]
        }))
        .expect("decode");

        assert_eq!(
            records,
            vec![RawMovieRecord::Film(RawFilm {
                episode_id: 4,
                title: "A New Hope".to_string(),
                opening_crawl: Some("...".to_string()),
                release_date: Some("1977-05-25".to_string()),
            })]
        );
    }

    #[test]
    fn keyed_records_keep_document_order_and_skip_nulls() {
        let records = decode_collection(json!({
            "-Nb": { "title": "Second" },
            "gone": null,
            "-Na": { "title": "First", "openingText": "text" }
        }))
        .expect("decode");

        let keys: Vec<&str> = records
            .iter()
            .map(|record| match record {
                RawMovieRecord::Keyed { key, .. } => key.as_str(),
                RawMovieRecord::Film(_) => panic!("unexpected film record"),
            })
            .collect();
        assert_eq!(keys, vec!["-Nb", "-Na"]);
    }

    #[test]
    fn null_body_is_an_empty_collection() {
        assert!(decode_collection(Value::Null).expect("decode").is_empty());
    }

    #[test]
    fn record_without_title_is_malformed() {
        let err = decode_collection(json!({ "abc": { "openingText": "x" } }))
            .expect_err("title is required");
        assert!(matches!(err, DecodeError::MalformedRecord { ref key, .. } if key == "abc"));
    }

    #[test]
    fn scalar_body_is_rejected() {
        assert!(matches!(
            decode_collection(json!("nope")),
            Err(DecodeError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn create_response_accepts_name_or_id() {
        let by_name: CreateMovieResponse =
            serde_json::from_value(json!({ "name": "-Nxyz" })).expect("name");
        assert_eq!(by_name.name, MovieId::Key("-Nxyz".to_string()));

        let by_id: CreateMovieResponse = serde_json::from_value(json!({ "id": 9 })).expect("id");
        assert_eq!(by_id.name, MovieId::Number(9));
    }
}
