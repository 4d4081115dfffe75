// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::pages::app::App;
use super::pages::shell::shell;
use super::state::AppState;
use crate::config::ConfigData;
use crate::database::DbPool;
use axum::Router;
use axum::extract::{Request, State};
use axum::handler::Handler;
use axum::response::{IntoResponse, Response};
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list, render_app_to_stream_with_context};
use miette::IntoDiagnostic;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

pub async fn run_server(config: Arc<ConfigData>, db_connection_pool: DbPool) -> miette::Result<()> {
	let web_config = get_configuration(None).into_diagnostic()?;
	let site_addr = config.web.bind_addr.clone();
	let leptos_options = web_config.leptos_options;
	let routes = generate_route_list(App);

	let app_state = AppState {
		leptos_options,
		config,
		db_connection_pool,
	};

	let app = Router::new().leptos_routes_with_context(
		&app_state,
		routes,
		{
			let app_state = app_state.clone();
			move || provide_context(app_state.clone())
		},
		{
			let leptos_options = app_state.leptos_options.clone();
			move || shell(leptos_options.clone())
		},
	);
	let app = with_site_files(app, &app_state).with_state(app_state);

	tracing::info!(address = %site_addr, "Listening on http://{}", site_addr);
	let listener = TcpListener::bind(&site_addr).await.into_diagnostic()?;
	axum::serve(listener, app.into_make_service()).await.into_diagnostic()?;

	Ok(())
}

/// Icons, the manifest and the wasm bundle come from the site root; anything else renders the app's not-found page.
fn with_site_files(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
	let site_files = ServeDir::new(&*app_state.leptos_options.site_root)
		.not_found_service(render_fallback.with_state(app_state.clone()));
	router.fallback_service(site_files)
}

async fn render_fallback(State(state): State<AppState>, request: Request) -> Response {
	tracing::debug!(uri = %request.uri(), "No route or file matched; rendering the app");
	let handler = render_app_to_stream_with_context(
		{
			let state = state.clone();
			move || provide_context(state.clone())
		},
		move || shell(state.leptos_options.clone()),
	);
	handler(request).await.into_response()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::{DatabaseConfig, WebConfig};
	use diesel::SqliteConnection;
	use diesel::r2d2::{ConnectionManager, Pool};
	use tokio::io::{AsyncReadExt, AsyncWriteExt};
	use tokio::net::TcpStream;

	#[tokio::test]
	async fn serves_files_from_the_site_root() {
		let site_root = std::env::temp_dir().join(format!("gs-timetable-site-{}", std::process::id()));
		std::fs::create_dir_all(&site_root).unwrap();
		std::fs::write(site_root.join("site.webmanifest"), "{\"name\":\"GS Timetable\"}").unwrap();

		let db_connection_pool = Pool::builder()
			.max_size(1)
			.build(ConnectionManager::<SqliteConnection>::new(":memory:"))
			.unwrap();
		let app_state = AppState {
			leptos_options: LeptosOptions::builder()
				.output_name("gs-timetable")
				.site_root(site_root.to_string_lossy().to_string())
				.build(),
			config: Arc::new(ConfigData {
				web: WebConfig {
					bind_addr: String::from("127.0.0.1:0"),
				},
				database: DatabaseConfig::default(),
			}),
			db_connection_pool,
		};
		let app = with_site_files(Router::new(), &app_state).with_state(app_state);

		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let address = listener.local_addr().unwrap();
		tokio::spawn(async move { axum::serve(listener, app.into_make_service()).await });

		let mut stream = TcpStream::connect(address).await.unwrap();
		stream
			.write_all(b"GET /site.webmanifest HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
			.await
			.unwrap();
		let mut response = String::new();
		stream.read_to_string(&mut response).await.unwrap();

		assert!(response.starts_with("HTTP/1.1 200"));
		assert!(response.ends_with("{\"name\":\"GS Timetable\"}"));
		std::fs::remove_dir_all(&site_root).unwrap();
	}
}
