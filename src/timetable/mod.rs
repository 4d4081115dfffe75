// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timetable rules: weekdays, periods, class blocks and where a student has to be for each period.

pub mod destination;
#[cfg(feature = "ssr")]
pub mod schedule;

use serde::{Deserialize, Serialize};
use std::fmt;

pub const FIRST_PERIOD: i32 = 1;
pub const LAST_PERIOD: i32 = 7;

/// Exception location marker meaning "the student's own move class".
pub const SPECIAL_LOCATION_MOVE: &str = "__MOVE_CLASSROOM__";
/// Exception location marker meaning "the student's home class".
pub const SPECIAL_LOCATION_HOMEROOM: &str = "__HOMEROOM__";

/// Subject keywords that pin a period to a fixed location during import, checked in order.
pub const UPLOAD_EXCEPTION_RULES: [(&str, &str); 4] = [
	("동아리", SPECIAL_LOCATION_MOVE),
	("진로2", SPECIAL_LOCATION_MOVE),
	("스포츠", "체육관"),
	("공강", SPECIAL_LOCATION_HOMEROOM),
];

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Weekday {
	Monday,
	Tuesday,
	Wednesday,
	Thursday,
	Friday,
}

impl Weekday {
	pub const ALL: [Weekday; 5] = [
		Self::Monday,
		Self::Tuesday,
		Self::Wednesday,
		Self::Thursday,
		Self::Friday,
	];

	/// The label stored in the timetable and shown to users.
	pub fn label(self) -> &'static str {
		match self {
			Self::Monday => "월",
			Self::Tuesday => "화",
			Self::Wednesday => "수",
			Self::Thursday => "목",
			Self::Friday => "금",
		}
	}

	/// The ASCII code used in page URLs.
	pub fn code(self) -> &'static str {
		match self {
			Self::Monday => "mon",
			Self::Tuesday => "tue",
			Self::Wednesday => "wed",
			Self::Thursday => "thu",
			Self::Friday => "fri",
		}
	}

	/// Accepts `월`, `월요일`, `mon`, `Monday` and similar spellings.
	pub fn parse(text: &str) -> Option<Self> {
		let compact = text.trim().replace("요일", "");
		let compact = compact.trim();
		if compact.is_empty() {
			return None;
		}
		if let Some(day) = Self::ALL.into_iter().find(|day| day.label() == compact) {
			return Some(day);
		}

		let key: String = compact.to_lowercase().chars().take(3).collect();
		Self::ALL.into_iter().find(|day| day.code() == key)
	}

	pub fn from_chrono(weekday: chrono::Weekday) -> Option<Self> {
		match weekday {
			chrono::Weekday::Mon => Some(Self::Monday),
			chrono::Weekday::Tue => Some(Self::Tuesday),
			chrono::Weekday::Wed => Some(Self::Wednesday),
			chrono::Weekday::Thu => Some(Self::Thursday),
			chrono::Weekday::Fri => Some(Self::Friday),
			chrono::Weekday::Sat | chrono::Weekday::Sun => None,
		}
	}

	/// Today's school day in local time; weekends show Monday.
	#[cfg(feature = "ssr")]
	pub fn today() -> Self {
		use chrono::Datelike;
		Self::from_chrono(chrono::Local::now().weekday()).unwrap_or(Self::Monday)
	}
}

impl fmt::Display for Weekday {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// The per-student classroom column a class block sends the student to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassroomField {
	Move,
	Basic1,
	Basic2,
	Inquiry1,
	Inquiry2,
	Inquiry3,
	Liberal,
}

impl ClassroomField {
	pub fn for_block(block_code: &str) -> Option<Self> {
		let key = normalize_block(block_code);
		if key.starts_with("기초1") {
			Some(Self::Basic1)
		} else if key.starts_with("기초2") {
			Some(Self::Basic2)
		} else if key.starts_with("탐1") || key.starts_with("탐구1") {
			Some(Self::Inquiry1)
		} else if key.starts_with("탐2") || key.starts_with("탐구2") {
			Some(Self::Inquiry2)
		} else if key.starts_with("탐3") || key.starts_with("탐구3") {
			Some(Self::Inquiry3)
		} else if key.starts_with("교양") {
			Some(Self::Liberal)
		} else if key.starts_with("이동반") || key.starts_with("선택반") {
			Some(Self::Move)
		} else {
			None
		}
	}
}

/// Removes all whitespace from a block code.
pub fn normalize_block(block_code: &str) -> String {
	block_code.chars().filter(|c| !c.is_whitespace()).collect()
}

/// What the lookup page shows about a student.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StudentSummary {
	pub student_id: String,
	pub student_name: String,
	pub class_no: Option<i32>,
	pub student_no: Option<i32>,
	pub homeroom_location: Option<String>,
}

impl From<&crate::model::Student> for StudentSummary {
	fn from(student: &crate::model::Student) -> Self {
		Self {
			student_id: student.student_id.clone(),
			student_name: student.student_name.clone(),
			class_no: student.class_no,
			student_no: student.student_no,
			homeroom_location: student.homeroom_location.clone(),
		}
	}
}

/// A single period in a student's day.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScheduleEntry {
	pub period: i32,
	/// The class whose timetable supplied the subject for this period.
	pub basis_class_no: i32,
	pub block_code: Option<String>,
	pub subject_teacher: String,
	pub destination: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StudentSchedule {
	pub student: StudentSummary,
	pub weekday: Weekday,
	pub entries: Vec<ScheduleEntry>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_weekday_spellings() {
		assert_eq!(Weekday::parse("월"), Some(Weekday::Monday));
		assert_eq!(Weekday::parse(" 수요일 "), Some(Weekday::Wednesday));
		assert_eq!(Weekday::parse("Thursday"), Some(Weekday::Thursday));
		assert_eq!(Weekday::parse("fri"), Some(Weekday::Friday));
		assert_eq!(Weekday::parse("토"), None);
		assert_eq!(Weekday::parse(""), None);
	}

	#[test]
	fn weekend_has_no_school_day() {
		assert_eq!(Weekday::from_chrono(chrono::Weekday::Sat), None);
		assert_eq!(Weekday::from_chrono(chrono::Weekday::Tue), Some(Weekday::Tuesday));
	}

	#[test]
	fn blocks_map_to_classroom_fields() {
		assert_eq!(ClassroomField::for_block("기초1"), Some(ClassroomField::Basic1));
		assert_eq!(ClassroomField::for_block("기초 2"), Some(ClassroomField::Basic2));
		assert_eq!(ClassroomField::for_block("탐구1"), Some(ClassroomField::Inquiry1));
		assert_eq!(ClassroomField::for_block("탐2A"), Some(ClassroomField::Inquiry2));
		assert_eq!(ClassroomField::for_block("탐3"), Some(ClassroomField::Inquiry3));
		assert_eq!(ClassroomField::for_block("교양"), Some(ClassroomField::Liberal));
		assert_eq!(ClassroomField::for_block("선택반"), Some(ClassroomField::Move));
		assert_eq!(ClassroomField::for_block("동아리"), None);
		assert_eq!(ClassroomField::for_block(""), None);
	}
}
