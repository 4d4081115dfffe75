// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::timetable::ClassroomField;
use serde::{Deserialize, Serialize};

#[cfg(feature = "ssr")]
use crate::schema::{student_master, timetable_pattern};
#[cfg(feature = "ssr")]
use diesel::prelude::*;

/// A student's class placement and the classrooms assigned to them for each class block.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "ssr", derive(Insertable, Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = student_master, check_for_backend(diesel::sqlite::Sqlite)))]
pub struct Student {
	/// Digits only; grade, two-digit class number and two-digit student number, e.g. `20115`.
	pub student_id: String,
	pub student_name: String,
	pub class_no: Option<i32>,
	pub student_no: Option<i32>,
	/// The room of the student's home class, used whenever a period sends them "home".
	pub homeroom_location: Option<String>,
	pub move_classroom: Option<String>,
	pub basic1_classroom: Option<String>,
	pub basic2_classroom: Option<String>,
	pub inquiry1_classroom: Option<String>,
	pub inquiry2_classroom: Option<String>,
	pub inquiry3_classroom: Option<String>,
	pub liberal_classroom: Option<String>,
}

impl Student {
	/// Gets the classroom assigned for a block, ignoring blank values.
	pub fn classroom(&self, field: ClassroomField) -> Option<&str> {
		let value = match field {
			ClassroomField::Move => &self.move_classroom,
			ClassroomField::Basic1 => &self.basic1_classroom,
			ClassroomField::Basic2 => &self.basic2_classroom,
			ClassroomField::Inquiry1 => &self.inquiry1_classroom,
			ClassroomField::Inquiry2 => &self.inquiry2_classroom,
			ClassroomField::Inquiry3 => &self.inquiry3_classroom,
			ClassroomField::Liberal => &self.liberal_classroom,
		};
		value.as_deref().filter(|value| !value.is_empty())
	}
}

/// One period of a class's weekly timetable.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "ssr", derive(Insertable, Queryable, Selectable))]
#[cfg_attr(feature = "ssr", diesel(table_name = timetable_pattern, check_for_backend(diesel::sqlite::Sqlite)))]
pub struct TimetablePattern {
	pub class_no: i32,
	/// Korean weekday label as produced by [crate::timetable::Weekday::label].
	pub weekday: String,
	pub period: i32,
	/// Whitespace-free block code, e.g. `기초1`, `탐2`, `동아리`.
	pub block_code: String,
	pub subject_name: Option<String>,
	pub teacher_name: Option<String>,
	pub subject_teacher: String,
	/// Location override for the period; either a room or one of the special location markers.
	pub exception_location: Option<String>,
}
