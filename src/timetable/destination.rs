// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{ClassroomField, SPECIAL_LOCATION_HOMEROOM, SPECIAL_LOCATION_MOVE, normalize_block};
use crate::model::{Student, TimetablePattern};

const NO_TIMETABLE: &str = "시간표 없음";
const MOVE_CLASSROOM_UNSET: &str = "이동반교실 미설정";
const OWN_CHOICE_CLASS: &str = "본인선택반";

/// Where the student should go for a period, formatted for display.
///
/// Club periods always read "본인선택반"; numeric rooms such as `801` are shown as the class they belong to (`8반`).
pub fn resolve_destination(student: &Student, row: Option<&TimetablePattern>) -> String {
	if let Some(row) = row {
		if normalize_block(&row.block_code) == "동아리" {
			return String::from(OWN_CHOICE_CLASS);
		}
	}
	format_destination_display(&resolve_destination_raw(student, row))
}

/// Where the student should go for a period, as stored (rooms are left as raw numbers).
pub fn resolve_destination_raw(student: &Student, row: Option<&TimetablePattern>) -> String {
	let Some(row) = row else {
		return String::from(NO_TIMETABLE);
	};

	// Fixed blocks win over whatever exception the import attached to them.
	match normalize_block(&row.block_code).as_str() {
		"진로2" => return move_classroom_text(student),
		"공강" => return homeroom_text(student),
		_ => (),
	}

	if let Some(exception) = row.exception_location.as_deref().filter(|value| !value.is_empty()) {
		return resolve_exception_location(exception, student);
	}

	if let Some(field) = ClassroomField::for_block(&row.block_code) {
		if let Some(classroom) = student.classroom(field) {
			return classroom.to_string();
		}
	}

	homeroom_text(student)
}

/// Whether the subject for a period comes from the destination class's timetable instead of the student's own.
pub fn follows_destination_for_subject(row: &TimetablePattern) -> bool {
	let block = normalize_block(&row.block_code);
	if block.is_empty() {
		return false;
	}
	if block == "공강" || ClassroomField::for_block(&block).is_some() {
		return true;
	}
	row.exception_location.as_deref() == Some(SPECIAL_LOCATION_MOVE)
}

/// The class whose timetable drives the student's day: the move class if one is assigned, otherwise their own class.
pub fn schedule_pattern_class_no(student: &Student) -> Option<i32> {
	student
		.move_classroom
		.as_deref()
		.and_then(group_class_no_from_room)
		.or(student.class_no)
}

/// Extracts a class number from a room value; three or more digits drop the last two (`801` is class 8).
pub fn group_class_no_from_room(value: &str) -> Option<i32> {
	let digits: String = value.chars().filter(char::is_ascii_digit).collect();
	if digits.is_empty() {
		return None;
	}
	if digits.len() >= 3 {
		return digits[..digits.len() - 2].parse().ok();
	}
	digits.parse().ok()
}

fn resolve_exception_location(token: &str, student: &Student) -> String {
	match token {
		SPECIAL_LOCATION_HOMEROOM | "본반" => homeroom_text(student),
		SPECIAL_LOCATION_MOVE | "본인선택반" | "본인 선택반" => move_classroom_text(student),
		_ => token.to_string(),
	}
}

fn homeroom_text(student: &Student) -> String {
	if let Some(homeroom) = student.homeroom_location.as_deref().filter(|value| !value.is_empty()) {
		return homeroom.to_string();
	}
	match student.class_no {
		Some(class_no) if class_no != 0 => format!("{}반", class_no),
		_ => String::from("본반"),
	}
}

fn move_classroom_text(student: &Student) -> String {
	student
		.classroom(ClassroomField::Move)
		.map(str::to_string)
		.unwrap_or_else(|| String::from(MOVE_CLASSROOM_UNSET))
}

fn format_destination_display(value: &str) -> String {
	let text = value.trim();
	if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
		if let Some(class_no) = group_class_no_from_room(text) {
			return format!("{}반", class_no);
		}
	}
	text.to_string()
}
