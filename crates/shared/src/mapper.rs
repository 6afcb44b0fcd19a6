//! Normalizes backend records into [`Movie`].

use crate::{
    domain::{Movie, MovieId},
    protocol::{RawFilm, RawKeyedMovie, RawMovieRecord},
};

pub fn to_movie(raw: RawMovieRecord) -> Movie {
    match raw {
        RawMovieRecord::Film(film) => film_to_movie(film),
        RawMovieRecord::Keyed { key, movie } => keyed_to_movie(key, movie),
    }
}

pub fn to_movies(raw: Vec<RawMovieRecord>) -> Vec<Movie> {
    raw.into_iter().map(to_movie).collect()
}

fn film_to_movie(film: RawFilm) -> Movie {
    Movie {
        id: MovieId::Number(film.episode_id),
        title: film.title,
        opening_text: film.opening_crawl.unwrap_or_default(),
        release_date: film.release_date.unwrap_or_default(),
    }
}

fn keyed_to_movie(key: String, movie: RawKeyedMovie) -> Movie {
    Movie {
        id: MovieId::Key(key),
        title: movie.title,
        opening_text: movie.opening_text.unwrap_or_default(),
        release_date: movie.release_date.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::protocol::decode_collection;

    #[test]
    fn maps_film_catalogue_response() {
        let raw = decode_collection(json!({
            "results": [{
                "episode_id": 4,
                "title": "A New Hope",
                "opening_crawl": "...",
                "release_date": "1977-05-25"
            }]
        }))
        .expect("decode");

        assert_eq!(
            to_movies(raw),
            vec![Movie {
                id: MovieId::Number(4),
                title: "A New Hope".to_string(),
                opening_text: "...".to_string(),
                release_date: "1977-05-25".to_string(),
            }]
        );
    }

    #[test]
    fn maps_keyed_document_response() {
        let raw = decode_collection(json!({
            "abc123": {
                "title": "Movie X",
                "openingText": "text",
                "releaseDate": "2020-01-01"
            }
        }))
        .expect("decode");

        assert_eq!(
            to_movies(raw),
            vec![Movie {
                id: MovieId::Key("abc123".to_string()),
                title: "Movie X".to_string(),
                opening_text: "text".to_string(),
                release_date: "2020-01-01".to_string(),
            }]
        );
    }

    #[test]
    fn missing_optional_fields_map_to_empty() {
        let movie = to_movie(RawMovieRecord::Film(RawFilm {
            episode_id: 1,
            title: "The Phantom Menace".to_string(),
            opening_crawl: None,
            release_date: None,
        }));
        assert_eq!(movie.opening_text, "");
        assert_eq!(movie.release_date, "");

        let movie = to_movie(RawMovieRecord::Keyed {
            key: "k".to_string(),
            movie: RawKeyedMovie {
                title: "Untitled draft".to_string(),
                opening_text: None,
                release_date: Some("2021-02-03".to_string()),
            },
        });
        assert_eq!(movie.id, MovieId::Key("k".to_string()));
        assert_eq!(movie.opening_text, "");
        assert_eq!(movie.release_date, "2021-02-03");
    }
}
