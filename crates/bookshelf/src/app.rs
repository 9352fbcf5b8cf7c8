use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        auth::{login, register},
        books::{
            create_book, delete_book, get_book, list_books, update_book, upload_book_image,
            UPLOADS_ROUTE,
        },
        health::livez,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Every book route authenticates through the `AuthUser` extractor.
    let book_routes = Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/books/{id}/image", post(upload_book_image));

    Router::new()
        .route("/livez", get(livez))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .merge(book_routes)
        .nest_service(
            &format!("/{UPLOADS_ROUTE}"),
            ServeDir::new(&state.upload_dir),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.request_timeout,
        ))
        .with_state(state)
}
