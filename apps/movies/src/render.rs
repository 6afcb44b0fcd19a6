//! Plain-text rendering of the movie list and its status messages.

use std::fmt::Write as _;

use client_core::FetchState;
use shared::domain::Movie;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const EMPTY_MESSAGE: &str = "Found no movies.";
pub const CANCEL_HINT: &str = "Retrying shortly. Enter 'c' to cancel.";

/// Loading wins over an error, an error wins over the list.
pub fn render_state(state: &FetchState) -> String {
    if state.is_loading {
        return LOADING_MESSAGE.to_string();
    }
    if let Some(error) = &state.error {
        if state.is_retrying {
            return format!("{error}\n{CANCEL_HINT}");
        }
        return error.clone();
    }
    if state.movies.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }
    render_movies(&state.movies)
}

pub fn render_movies(movies: &[Movie]) -> String {
    let mut out = String::new();
    for (index, movie) in movies.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let _ = write!(out, "[{}] {}", movie.id, movie.title);
        if !movie.release_date.is_empty() {
            let _ = write!(out, " ({})", movie.release_date);
        }
        if let Some(first_line) = movie
            .opening_text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
        {
            let _ = write!(out, "\n    {first_line}");
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
