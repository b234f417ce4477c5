use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use cinematch_core::{wire, BuildError, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod parse;

use parse::{parse_id_list, parse_quoted_list, unescape_text, ParseListError};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

pub fn build_app(engine: Arc<Engine>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/suggestions", get(suggestions_handler))
        .route("/similarity", post(similarity_handler))
        .route("/recommend", post(recommend_handler))
        .with_state(AppState { engine })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[derive(Deserialize)]
pub struct SimilarityForm {
    pub name: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize {
    10
}

#[derive(Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

pub async fn suggestions_handler(
    State(state): State<AppState>,
) -> Result<Json<SuggestionsResponse>, (StatusCode, String)> {
    let suggestions = state.engine.suggestions().map_err(internal_error)?;
    Ok(Json(SuggestionsResponse { suggestions }))
}

/// Top-k lookup for a single title. Responds with the `---`-joined title
/// list, or the fixed sentinel when the title is unknown.
pub async fn similarity_handler(
    State(state): State<AppState>,
    Form(form): Form<SimilarityForm>,
) -> Result<String, (StatusCode, String)> {
    let k = form.k.clamp(1, 100);
    let outcome = state
        .engine
        .recommend(form.name.trim(), k)
        .map_err(internal_error)?;
    Ok(wire::render(outcome.as_deref()))
}

fn internal_error(err: BuildError) -> (StatusCode, String) {
    tracing::error!(error = %err, "index unavailable");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// The recommendation-page request: scalar movie fields plus parallel
/// bracket-delimited lists describing the cast and the recommended titles.
#[derive(Deserialize)]
pub struct RecommendPageForm {
    pub title: String,
    pub imdb_id: String,
    pub poster: String,
    pub genres: String,
    pub overview: String,
    pub rating: String,
    pub vote_count: String,
    pub release_date: String,
    pub runtime: String,
    pub status: String,
    pub rec_movies: String,
    pub rec_posters: String,
    pub cast_ids: String,
    pub cast_names: String,
    pub cast_chars: String,
    pub cast_profiles: String,
    pub cast_bdays: String,
    pub cast_bios: String,
    pub cast_places: String,
}

#[derive(Serialize)]
pub struct MovieCard {
    pub poster: String,
    pub title: String,
}

#[derive(Serialize)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: String,
    pub profile: String,
    pub birthday: String,
    pub birthplace: String,
    pub biography: String,
}

#[derive(Serialize)]
pub struct RecommendPage {
    pub title: String,
    pub imdb_id: String,
    pub poster: String,
    pub genres: String,
    pub overview: String,
    pub rating: String,
    pub vote_count: String,
    pub release_date: String,
    pub runtime: String,
    pub status: String,
    pub movie_cards: Vec<MovieCard>,
    pub casts: Vec<CastMember>,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("malformed list in field {field}: {source}")]
    BadList {
        field: &'static str,
        #[source]
        source: ParseListError,
    },

    #[error("{left} has {left_len} entries but {right} has {right_len}")]
    LengthMismatch {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

/// Assemble the recommendation page payload from the AJAX request. Every
/// delimited list is parsed strictly and cross-checked for length before
/// any pairing happens.
pub async fn recommend_handler(
    Form(form): Form<RecommendPageForm>,
) -> Result<Json<RecommendPage>, RequestError> {
    let rec_movies = quoted(&form.rec_movies, "rec_movies")?;
    let rec_posters = quoted(&form.rec_posters, "rec_posters")?;
    same_len("rec_posters", rec_posters.len(), "rec_movies", rec_movies.len())?;

    let cast_ids = parse_id_list(&form.cast_ids).map_err(|source| RequestError::BadList {
        field: "cast_ids",
        source,
    })?;
    let cast_names = quoted(&form.cast_names, "cast_names")?;
    let cast_chars = quoted(&form.cast_chars, "cast_chars")?;
    let cast_profiles = quoted(&form.cast_profiles, "cast_profiles")?;
    let cast_bdays = quoted(&form.cast_bdays, "cast_bdays")?;
    let cast_bios = quoted(&form.cast_bios, "cast_bios")?;
    let cast_places = quoted(&form.cast_places, "cast_places")?;
    for (name, len) in [
        ("cast_ids", cast_ids.len()),
        ("cast_chars", cast_chars.len()),
        ("cast_profiles", cast_profiles.len()),
        ("cast_bdays", cast_bdays.len()),
        ("cast_bios", cast_bios.len()),
        ("cast_places", cast_places.len()),
    ] {
        same_len("cast_names", cast_names.len(), name, len)?;
    }

    let movie_cards = rec_posters
        .into_iter()
        .zip(rec_movies)
        .map(|(poster, title)| MovieCard { poster, title })
        .collect();

    let casts = cast_names
        .into_iter()
        .enumerate()
        .map(|(i, name)| CastMember {
            id: cast_ids[i],
            name,
            character: cast_chars[i].clone(),
            profile: cast_profiles[i].clone(),
            birthday: cast_bdays[i].clone(),
            birthplace: cast_places[i].clone(),
            biography: unescape_text(&cast_bios[i]),
        })
        .collect();

    Ok(Json(RecommendPage {
        title: form.title,
        imdb_id: form.imdb_id,
        poster: form.poster,
        genres: form.genres,
        overview: form.overview,
        rating: form.rating,
        vote_count: form.vote_count,
        release_date: form.release_date,
        runtime: form.runtime,
        status: form.status,
        movie_cards,
        casts,
    }))
}

fn quoted(raw: &str, field: &'static str) -> Result<Vec<String>, RequestError> {
    parse_quoted_list(raw).map_err(|source| RequestError::BadList { field, source })
}

fn same_len(
    left: &'static str,
    left_len: usize,
    right: &'static str,
    right_len: usize,
) -> Result<(), RequestError> {
    if left_len != right_len {
        return Err(RequestError::LengthMismatch {
            left,
            left_len,
            right,
            right_len,
        });
    }
    Ok(())
}
