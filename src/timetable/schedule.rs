// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::destination::{
	follows_destination_for_subject, group_class_no_from_room, resolve_destination, resolve_destination_raw,
	schedule_pattern_class_no,
};
use super::{FIRST_PERIOD, LAST_PERIOD, ScheduleEntry, StudentSchedule, Weekday};
use crate::database::{timetable_for_day, timetable_period};
use crate::model::{Student, TimetablePattern};
use diesel::SqliteConnection;
use miette::{IntoDiagnostic, bail};
use std::collections::HashMap;

/// Builds a student's day, one entry per period.
///
/// The base row for each period comes from the student's pattern class. When the period sends the student to
/// another class (a block classroom, a free period or a move-class exception), the subject is taken from that
/// class's timetable instead; the destination is always resolved from the base row.
pub fn schedule_for_student(
	db_connection: &mut SqliteConnection,
	student: &Student,
	weekday: Weekday,
) -> miette::Result<Vec<ScheduleEntry>> {
	let Some(pattern_class_no) = schedule_pattern_class_no(student) else {
		bail!(
			"Can't determine which class timetable applies to student {}",
			student.student_id
		);
	};

	let mut by_period: HashMap<i32, TimetablePattern> = timetable_for_day(db_connection, pattern_class_no, weekday)
		.into_diagnostic()?
		.into_iter()
		.map(|row| (row.period, row))
		.collect();

	let mut entries = Vec::new();
	for period in FIRST_PERIOD..=LAST_PERIOD {
		let base_row = by_period.remove(&period);
		let subject_row = subject_row_for_period(db_connection, student, weekday, base_row.as_ref())?;

		let entry = match subject_row {
			Some((basis_class_no, row)) => ScheduleEntry {
				period,
				basis_class_no,
				block_code: Some(row.block_code.clone()),
				subject_teacher: row.subject_teacher.clone(),
				destination: resolve_destination(student, base_row.as_ref()),
			},
			None => ScheduleEntry {
				period,
				basis_class_no: pattern_class_no,
				block_code: None,
				subject_teacher: String::from("시간표 없음"),
				destination: resolve_destination(student, None),
			},
		};
		entries.push(entry);
	}

	Ok(entries)
}

pub fn student_schedule(
	db_connection: &mut SqliteConnection,
	student: &Student,
	weekday: Weekday,
) -> miette::Result<StudentSchedule> {
	let entries = schedule_for_student(db_connection, student, weekday)?;
	Ok(StudentSchedule {
		student: student.into(),
		weekday,
		entries,
	})
}

fn subject_row_for_period(
	db_connection: &mut SqliteConnection,
	student: &Student,
	weekday: Weekday,
	base_row: Option<&TimetablePattern>,
) -> miette::Result<Option<(i32, TimetablePattern)>> {
	let Some(base_row) = base_row else {
		return Ok(None);
	};
	let base = Some((base_row.class_no, base_row.clone()));

	if !follows_destination_for_subject(base_row) {
		return Ok(base);
	}

	let raw_destination = resolve_destination_raw(student, Some(base_row));
	let target_class_no = match group_class_no_from_room(&raw_destination) {
		Some(class_no) if class_no != base_row.class_no => class_no,
		_ => return Ok(base),
	};

	let override_row =
		timetable_period(db_connection, target_class_no, weekday, base_row.period).into_diagnostic()?;
	Ok(match override_row {
		Some(row) => Some((target_class_no, row)),
		None => base,
	})
}
