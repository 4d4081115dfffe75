// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::timetable::StudentSchedule;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(feature = "ssr")]
use diesel::SqliteConnection;
#[cfg(feature = "ssr")]
use diesel::r2d2::{ConnectionManager, PooledConnection};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct DataSummary {
	pub student_count: i64,
	pub timetable_count: i64,
	pub last_updated_at: Option<String>,
}

impl DataSummary {
	/// Lookups only make sense once both students and a timetable have been imported.
	pub fn has_data(&self) -> bool {
		self.student_count > 0 && self.timetable_count > 0
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum LookupOutcome {
	/// Nothing to search for yet.
	NoQuery,
	NotFound,
	Found(StudentSchedule),
}

#[cfg(feature = "ssr")]
fn db_connection() -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, ServerFnError> {
	use crate::web::state::AppState;

	let state = expect_context::<AppState>();
	Ok(state.db_connection_pool.get()?)
}

#[server]
pub async fn get_data_summary() -> Result<DataSummary, ServerFnError> {
	use crate::database::get_stats;

	let mut db_connection = db_connection()?;
	let stats = get_stats(&mut db_connection)?;
	Ok(DataSummary {
		student_count: stats.student_count,
		timetable_count: stats.timetable_count,
		last_updated_at: stats.last_updated_at,
	})
}

#[server]
pub async fn get_class_numbers() -> Result<Vec<i32>, ServerFnError> {
	use crate::database::list_classes;

	let mut db_connection = db_connection()?;
	Ok(list_classes(&mut db_connection)?)
}

#[server]
pub async fn get_student_numbers(class_no: i32) -> Result<Vec<i32>, ServerFnError> {
	use crate::database::list_student_numbers;

	let mut db_connection = db_connection()?;
	Ok(list_student_numbers(&mut db_connection, class_no)?)
}

/// Finds a student by ID, or by class and number when no ID is given, and builds their schedule for a day.
#[server]
pub async fn lookup_schedule(
	student_id: Option<String>,
	class_no: Option<i32>,
	student_no: Option<i32>,
	day: Option<String>,
) -> Result<LookupOutcome, ServerFnError> {
	use crate::database::{student_by_class_number, student_by_id};
	use crate::timetable::Weekday;
	use crate::timetable::schedule::student_schedule;

	let mut db_connection = db_connection()?;

	let student_id = student_id.filter(|id| !id.trim().is_empty());
	let student = match (student_id, class_no, student_no) {
		(Some(student_id), _, _) => student_by_id(&mut db_connection, &student_id)?,
		(None, Some(class_no), Some(student_no)) => student_by_class_number(&mut db_connection, class_no, student_no)?,
		_ => return Ok(LookupOutcome::NoQuery),
	};
	let Some(student) = student else {
		return Ok(LookupOutcome::NotFound);
	};

	let weekday = day
		.as_deref()
		.and_then(Weekday::parse)
		.unwrap_or_else(Weekday::today);
	tracing::debug!(student_id = %student.student_id, %weekday, "Building schedule");

	let schedule = student_schedule(&mut db_connection, &student, weekday).map_err(|error| {
		tracing::warn!(student_id = %student.student_id, source = ?error, "Couldn't build schedule");
		ServerFnError::new(error)
	})?;
	Ok(LookupOutcome::Found(schedule))
}
