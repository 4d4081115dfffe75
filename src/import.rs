// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loads the student roster and class timetables from a KDL roster file.
//!
//! ```kdl
//! student "20115" name="김하늘" class=1 number=15 homeroom=201 move=801 inquiry1=401
//! student name="이바다" class=2 number=3
//! period class=8 day="월" period=1 block="기초1" subject="수학" teacher="박선생"
//! period class=8 day=tue period=2 block="동아리" subject-teacher="동아리 / 최선생"
//! ```
//!
//! Rows that can't be used are skipped and reported as warnings, mirroring a spreadsheet import.

use crate::database::{self, DataStats, LAST_UPDATED_KEY};
use crate::model::{Student, TimetablePattern};
use crate::timetable::{UPLOAD_EXCEPTION_RULES, Weekday, normalize_block};
use diesel::prelude::*;
use kdl::{KdlDocument, KdlNode, KdlValue};
use miette::{IntoDiagnostic, bail};
use std::collections::HashSet;
use tokio::fs::read_to_string;

/// Grade used to build student IDs when a row only has class and number.
pub const DEFAULT_GRADE: i32 = 2;

#[derive(Debug, Default)]
pub struct RosterImport {
	pub students: Vec<Student>,
	pub timetable: Vec<TimetablePattern>,
	pub warnings: Vec<String>,
}

pub async fn read_roster(roster_path: &str, default_grade: i32) -> miette::Result<RosterImport> {
	let contents = read_to_string(roster_path).await.into_diagnostic()?;
	parse_roster(&contents, default_grade)
}

pub fn parse_roster(contents: &str, default_grade: i32) -> miette::Result<RosterImport> {
	let document: KdlDocument = contents.parse()?;

	let mut import = RosterImport::default();
	let mut seen_students: HashSet<String> = HashSet::new();
	let mut seen_periods: HashSet<(i32, Weekday, i32)> = HashSet::new();

	for (index, node) in document.nodes().iter().enumerate() {
		let entry_no = index + 1;
		match node.name().value() {
			"student" => match parse_student(node, default_grade) {
				Ok(student) => {
					if seen_students.insert(student.student_id.clone()) {
						import.students.push(student);
					} else {
						import
							.warnings
							.push(format!("Entry {}: duplicate student ID {} skipped", entry_no, student.student_id));
					}
				}
				Err(reason) => import.warnings.push(format!("Entry {}: {}", entry_no, reason)),
			},
			"period" => match parse_period(node) {
				Ok((weekday, row)) => {
					if seen_periods.insert((row.class_no, weekday, row.period)) {
						import.timetable.push(row);
					} else {
						import.warnings.push(format!(
							"Entry {}: duplicate period {}반 {} {}교시 skipped",
							entry_no, row.class_no, row.weekday, row.period
						));
					}
				}
				Err(reason) => import.warnings.push(format!("Entry {}: {}", entry_no, reason)),
			},
			other => import
				.warnings
				.push(format!("Entry {}: unknown entry type `{}` ignored", entry_no, other)),
		}
	}

	if import.students.is_empty() {
		bail!("The roster has no usable student entries");
	}
	if import.timetable.is_empty() {
		bail!("The roster has no usable timetable entries");
	}

	Ok(import)
}

/// Replaces the stored roster and timetable with an import and records when it happened.
pub fn apply_import(db_connection: &mut SqliteConnection, import: &RosterImport) -> QueryResult<DataStats> {
	let updated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
	db_connection.transaction(|db_connection| {
		database::replace_students(db_connection, &import.students)?;
		database::replace_timetable(db_connection, &import.timetable)?;
		database::set_meta(db_connection, LAST_UPDATED_KEY, &updated_at)?;
		database::get_stats(db_connection)
	})
}

fn parse_student(node: &KdlNode, default_grade: i32) -> Result<Student, String> {
	let Some(student_name) = property_text(node, "name") else {
		return Err(String::from("student has no name"));
	};
	let student_id = argument_text(node, 0);
	let homeroom_location = property_text(node, "homeroom");
	let mut class_no = property_int(node, "class");
	let mut student_no = property_int(node, "number");

	if let Some(student_id) = &student_id {
		if class_no.is_none() || student_no.is_none() {
			if let Some((parsed_class, parsed_no)) = class_number_from_student_id(student_id) {
				class_no = class_no.or(Some(parsed_class));
				student_no = student_no.or(Some(parsed_no));
			}
		}
	}
	if class_no.is_none() {
		class_no = homeroom_location.as_deref().and_then(class_from_homeroom);
	}

	let student_id = match (student_id, class_no, student_no) {
		(Some(student_id), _, _) => student_id,
		(None, Some(class_no), Some(student_no)) => format!("{}{:02}{:02}", default_grade, class_no, student_no),
		_ => return Err(format!("could not build a student ID for {}", student_name)),
	};
	let student_id: String = student_id.chars().filter(char::is_ascii_digit).collect();
	if student_id.is_empty() {
		return Err(format!("student ID for {} has no digits", student_name));
	}

	Ok(Student {
		student_id,
		student_name,
		class_no,
		student_no,
		homeroom_location,
		move_classroom: property_text(node, "move"),
		basic1_classroom: property_text(node, "basic1"),
		basic2_classroom: property_text(node, "basic2"),
		inquiry1_classroom: property_text(node, "inquiry1"),
		inquiry2_classroom: property_text(node, "inquiry2"),
		inquiry3_classroom: property_text(node, "inquiry3"),
		liberal_classroom: property_text(node, "liberal"),
	})
}

fn parse_period(node: &KdlNode) -> Result<(Weekday, TimetablePattern), String> {
	let class_no = property_int(node, "class");
	let weekday = property_text(node, "day").and_then(|day| Weekday::parse(&day));
	let period = property_int(node, "period");
	let block_code = property_text(node, "block")
		.map(|block| normalize_block(&block))
		.filter(|block| !block.is_empty());

	let (Some(class_no), Some(weekday), Some(period), Some(block_code)) = (class_no, weekday, period, block_code) else {
		return Err(String::from("period is missing its class, day, period or block"));
	};

	let mut subject_name = property_text(node, "subject");
	let mut teacher_name = property_text(node, "teacher");
	if let Some(combined) = property_text(node, "subject-teacher") {
		if subject_name.is_none() || teacher_name.is_none() {
			let (parsed_subject, parsed_teacher) = split_subject_teacher(&combined);
			subject_name = subject_name.or(parsed_subject);
			teacher_name = teacher_name.or(parsed_teacher);
		}
	}

	let subject_teacher = build_subject_teacher(subject_name.as_deref(), teacher_name.as_deref());
	let exception_location = property_text(node, "exception")
		.or_else(|| derive_exception_location(subject_name.as_deref(), &subject_teacher));

	let row = TimetablePattern {
		class_no,
		weekday: weekday.label().to_string(),
		period,
		block_code,
		subject_name,
		teacher_name,
		subject_teacher,
		exception_location,
	};
	Ok((weekday, row))
}

/// Splits `과목 / 교사` or `과목 교사` into its parts.
fn split_subject_teacher(text: &str) -> (Option<String>, Option<String>) {
	let text = text.trim();
	if text.is_empty() {
		return (None, None);
	}
	let non_empty = |part: &str| Some(part.trim().to_string()).filter(|part| !part.is_empty());
	if let Some((subject, teacher)) = text.split_once('/') {
		return (non_empty(subject), non_empty(teacher));
	}
	if let Some((subject, teacher)) = text.rsplit_once(' ') {
		return (non_empty(subject), non_empty(teacher));
	}
	(Some(text.to_string()), None)
}

fn build_subject_teacher(subject_name: Option<&str>, teacher_name: Option<&str>) -> String {
	match (subject_name, teacher_name) {
		(Some(subject), Some(teacher)) => format!("{} / {}", subject, teacher),
		(Some(only), None) | (None, Some(only)) => only.to_string(),
		(None, None) => String::from("미입력"),
	}
}

fn derive_exception_location(subject_name: Option<&str>, subject_teacher: &str) -> Option<String> {
	let haystack: String = format!("{} {}", subject_name.unwrap_or_default(), subject_teacher)
		.chars()
		.filter(|c| *c != ' ')
		.collect();
	UPLOAD_EXCEPTION_RULES
		.iter()
		.find(|(keyword, _)| haystack.contains(keyword))
		.map(|(_, location)| location.to_string())
}

/// Reads class and number from an ID laid out as grade, class, two-digit number (`20115` is class 1, number 15).
fn class_number_from_student_id(student_id: &str) -> Option<(i32, i32)> {
	let digits: String = student_id.chars().filter(char::is_ascii_digit).collect();
	if digits.len() < 4 {
		return None;
	}
	let class_no = digits[1..digits.len() - 2].parse().ok()?;
	let student_no = digits[digits.len() - 2..].parse().ok()?;
	Some((class_no, student_no))
}

/// `2-3` is class 3; otherwise the first number in the text.
fn class_from_homeroom(homeroom: &str) -> Option<i32> {
	let numbers: Vec<&str> = homeroom
		.split(|c: char| !c.is_ascii_digit())
		.filter(|part| !part.is_empty())
		.collect();
	let number = if homeroom.contains('-') {
		numbers.last()
	} else {
		numbers.first()
	};
	number.and_then(|number| number.parse().ok())
}

fn argument_text(node: &KdlNode, index: usize) -> Option<String> {
	node.entries()
		.iter()
		.filter(|entry| entry.name().is_none())
		.nth(index)
		.and_then(|entry| value_text(entry.value()))
}

fn property_text(node: &KdlNode, key: &str) -> Option<String> {
	node.entries()
		.iter()
		.find(|entry| entry.name().map(|name| name.value()) == Some(key))
		.and_then(|entry| value_text(entry.value()))
}

/// Integer properties also accept text such as `3반`; the last number in it is used.
fn property_int(node: &KdlNode, key: &str) -> Option<i32> {
	let text = property_text(node, key)?;
	text.split(|c: char| !c.is_ascii_digit())
		.filter(|part| !part.is_empty())
		.last()
		.and_then(|number| number.parse().ok())
}

/// Trimmed text of a value; numbers are written without a fractional part when they have none (`801.0` is `801`).
fn value_text(value: &KdlValue) -> Option<String> {
	let text = if let Some(text) = value.as_string() {
		text.trim().to_string()
	} else if let Some(number) = value.as_integer() {
		number.to_string()
	} else if let Some(number) = value.as_float() {
		if number.fract() == 0.0 {
			format!("{}", number as i64)
		} else {
			number.to_string()
		}
	} else {
		return None;
	};
	Some(text).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::database::tests::memory_connection;
	use crate::database::{student_by_class_number, student_by_id, timetable_period};
	use crate::timetable::{SPECIAL_LOCATION_HOMEROOM, SPECIAL_LOCATION_MOVE};

	const ROSTER: &str = r#"
student "20115" name="김하늘" class=1 number=15 homeroom=201 move=801 inquiry1="401"
student name="이바다" class=2 number=3
period class=8 day="월" period=1 block="기초 1" subject="수학" teacher="박선생"
period class=8 day=tue period=2 block="동아리" subject-teacher="동아리 / 최선생"
"#;

	#[test]
	fn reads_students_and_periods() {
		let import = parse_roster(ROSTER, DEFAULT_GRADE).unwrap();
		assert!(import.warnings.is_empty(), "{:?}", import.warnings);

		let first = &import.students[0];
		assert_eq!(first.student_id, "20115");
		assert_eq!(first.homeroom_location.as_deref(), Some("201"));
		assert_eq!(first.move_classroom.as_deref(), Some("801"));
		assert_eq!(first.inquiry1_classroom.as_deref(), Some("401"));
		assert_eq!(import.students[1].student_id, "20203");

		let math = &import.timetable[0];
		assert_eq!(math.weekday, "월");
		assert_eq!(math.block_code, "기초1");
		assert_eq!(math.subject_teacher, "수학 / 박선생");
		assert_eq!(math.exception_location, None);

		let club = &import.timetable[1];
		assert_eq!(club.weekday, "화");
		assert_eq!(club.subject_name.as_deref(), Some("동아리"));
		assert_eq!(club.teacher_name.as_deref(), Some("최선생"));
		assert_eq!(club.exception_location.as_deref(), Some(SPECIAL_LOCATION_MOVE));
	}

	#[test]
	fn fills_class_and_number_from_student_id() {
		let import = parse_roster(
			"student \"2-03-07\" name=\"박별\"\nperiod class=3 day=\"금\" period=7 block=\"공강\" subject=\"공강\"\n",
			DEFAULT_GRADE,
		)
		.unwrap();
		let student = &import.students[0];
		assert_eq!(student.student_id, "20307");
		assert_eq!(student.class_no, Some(3));
		assert_eq!(student.student_no, Some(7));
		assert_eq!(
			import.timetable[0].exception_location.as_deref(),
			Some(SPECIAL_LOCATION_HOMEROOM)
		);
	}

	#[test]
	fn explicit_exception_wins() {
		let import = parse_roster(
			"student \"20101\" name=\"가\"\nperiod class=1 day=\"수\" period=3 block=\"스포츠\" subject=\"스포츠\" exception=\"운동장\"\n",
			DEFAULT_GRADE,
		)
		.unwrap();
		assert_eq!(import.timetable[0].exception_location.as_deref(), Some("운동장"));
	}

	#[test]
	fn skips_bad_rows_with_warnings() {
		let roster = r#"
student "20115" name="김하늘"
student "20115" name="김하늘 중복"
student class=1
student name="번호없음"
period class=1 day="토" period=1 block="국어" subject="국어"
period class=1 day="월" period=1 block="국어" subject="국어"
period class=1 day="mon" period=1 block="영어" subject="영어"
teacher "박선생"
"#;
		let import = parse_roster(roster, DEFAULT_GRADE).unwrap();
		assert_eq!(import.students.len(), 1);
		assert_eq!(import.timetable.len(), 1);
		assert_eq!(import.warnings.len(), 6, "{:?}", import.warnings);
		assert!(import.warnings.iter().any(|warning| warning.contains("duplicate student ID 20115")));
		assert!(import.warnings.iter().any(|warning| warning.contains("unknown entry type `teacher`")));
	}

	#[test]
	fn requires_both_sections() {
		assert!(parse_roster("student \"20115\" name=\"김하늘\"\n", DEFAULT_GRADE).is_err());
		assert!(parse_roster("period class=1 day=\"월\" period=1 block=\"국어\"\n", DEFAULT_GRADE).is_err());
		assert!(parse_roster("student {", DEFAULT_GRADE).is_err());
	}

	#[test]
	fn subject_teacher_formats() {
		assert_eq!(
			split_subject_teacher("화학 / 오선생"),
			(Some(String::from("화학")), Some(String::from("오선생")))
		);
		assert_eq!(
			split_subject_teacher("생활과 윤리 한선생"),
			(Some(String::from("생활과 윤리")), Some(String::from("한선생")))
		);
		assert_eq!(split_subject_teacher("자습"), (Some(String::from("자습")), None));
		assert_eq!(build_subject_teacher(None, Some("오선생")), "오선생");
		assert_eq!(build_subject_teacher(None, None), "미입력");
	}

	#[test]
	fn homeroom_class_rules() {
		assert_eq!(class_from_homeroom("2-3"), Some(3));
		assert_eq!(class_from_homeroom("301호"), Some(301));
		assert_eq!(class_from_homeroom("본관"), None);
	}

	#[test]
	fn applying_replaces_stored_data() {
		let mut db_connection = memory_connection();
		let import = parse_roster(ROSTER, DEFAULT_GRADE).unwrap();

		let stats = apply_import(&mut db_connection, &import).unwrap();
		assert_eq!(stats.student_count, 2);
		assert_eq!(stats.timetable_count, 2);
		assert!(stats.last_updated_at.is_some());

		assert!(student_by_id(&mut db_connection, "20115").unwrap().is_some());
		assert!(student_by_class_number(&mut db_connection, 2, 3).unwrap().is_some());
		assert!(timetable_period(&mut db_connection, 8, Weekday::Tuesday, 2).unwrap().is_some());
	}
}
