use axum::{
    Router,
    http::{HeaderValue, header::CACHE_CONTROL},
    middleware::{from_fn, from_fn_with_state, map_response},
};
use log::info;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::Error;
use crate::markup::wrap_in_base;
use crate::state::AppState;

mod account;
mod archive;
mod auth;
mod conversation;
mod digest;
mod emoji;
mod error;
mod file;
mod integration;
mod mail;
mod markup;
mod message;
mod slack;
mod state;
mod style;
mod user;

type Result<T> = std::result::Result<T, Error>;

#[tokio::main]
async fn main() -> Result<()> {
    let config = integration::Config::default();
    error::show_details(config.env.is_development());

    let state = AppState::init(&config).await?;
    let app = app(state);

    let addr = config.env.addr();
    info!("Serving on {addr} ({:?}), public URL {}", config.env, config.base_url);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    let signed_in = Router::new()
        .merge(archive::pages(state.clone()))
        .merge(archive::api(state.clone()))
        .merge(account::api(state.clone()))
        .route_layer(from_fn(auth::middleware::authorize));

    let public = Router::new()
        .merge(conversation::pages(state.clone()))
        .merge(digest::api(state.clone()))
        .merge(file::api(state.clone()));

    Router::new()
        .merge(signed_in)
        .merge(public)
        .layer(from_fn_with_state(
            state.clone(),
            auth::middleware::validate_session,
        ))
        .layer(map_response(wrap_in_base))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
}
