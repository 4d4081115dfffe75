// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> miette::Result<()> {
	tracing_subscriber::fmt::init();
	gs_timetable::cli::run_from_args().await
}

#[cfg(not(feature = "ssr"))]
pub fn main() {}
