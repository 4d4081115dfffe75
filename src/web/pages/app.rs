// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::errors::not_found::NotFound;
use super::lookup::StudentLookup;
use leptos::prelude::*;
use leptos_meta::{Html, Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

// Hyphenated on purpose; the home screen title in the head tags is spelled "GS Timetable".
pub const APP_TITLE: &str = "GS-Timetable";

#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="ko" />
		<Title text=APP_TITLE />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=StudentLookup />
			</Routes>
		</Router>
	}
}
