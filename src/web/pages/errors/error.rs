// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use leptos::prelude::*;

#[component]
pub fn Error(message: String) -> impl IntoView {
	view! {
		<div class="error_message">
			<h2>"문제가 발생했습니다"</h2>
			<p>{message}</p>
		</div>
	}
}
