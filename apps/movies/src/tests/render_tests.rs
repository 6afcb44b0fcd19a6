use super::*;
use shared::domain::{MovieId, NewMovie};

fn movies() -> Vec<Movie> {
    vec![
        NewMovie::new(
            "A New Hope",
            "\r\nIt is a period of civil war.\r\nRebel spaceships...",
            "1977-05-25",
        )
        .into_movie(MovieId::Number(4)),
        NewMovie::new("Movie X", "", "").into_movie(MovieId::Key("abc123".to_string())),
    ]
}

#[test]
fn loading_takes_precedence() {
    let state = FetchState {
        movies: movies(),
        is_loading: true,
        error: Some("boom".to_string()),
        is_retrying: true,
    };
    assert_eq!(render_state(&state), LOADING_MESSAGE);
}

#[test]
fn error_shows_cancel_hint_only_while_retrying() {
    let mut state = FetchState {
        movies: movies(),
        error: Some("Something went wrong! Retrying...".to_string()),
        is_retrying: true,
        ..FetchState::default()
    };
    assert_eq!(
        render_state(&state),
        format!("Something went wrong! Retrying...\n{CANCEL_HINT}")
    );

    state.is_retrying = false;
    assert_eq!(render_state(&state), "Something went wrong! Retrying...");
}

#[test]
fn empty_collection_renders_placeholder() {
    assert_eq!(render_state(&FetchState::default()), EMPTY_MESSAGE);
}

#[test]
fn movies_render_with_first_line_of_opening_text() {
    assert_eq!(
        render_movies(&movies()),
        "[4] A New Hope (1977-05-25)\n    It is a period of civil war.\n[abc123] Movie X"
    );
}
