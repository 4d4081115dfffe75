// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::model::{Student, TimetablePattern};
use crate::schema::{app_meta, student_master, timetable_pattern};
use crate::timetable::Weekday;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use miette::{Diagnostic, IntoDiagnostic};
use std::error::Error;
use std::fmt;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub const LAST_UPDATED_KEY: &str = "last_updated_at";

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

// To get boxed errors (as returned by the migration runner) into miette, we need a wrapper type for them.
#[derive(Debug, Diagnostic)]
pub struct MigrationError(pub Box<dyn Error + Send + Sync>);

impl fmt::Display for MigrationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&self.0, f)
	}
}

impl Error for MigrationError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		self.0.source()
	}
}

pub fn connect_db(config: &ConfigData) -> miette::Result<DbPool> {
	let manager: ConnectionManager<SqliteConnection> = ConnectionManager::new(config.database.path.as_str());
	Pool::builder().test_on_check_out(true).build(manager).into_diagnostic()
}

pub fn run_embedded_migrations(db_connection_pool: &DbPool) -> Result<(), MigrationError> {
	let mut db_connection = match db_connection_pool.get() {
		Ok(connection) => connection,
		Err(error) => return Err(MigrationError(Box::new(error))),
	};
	migrate(&mut db_connection)
}

pub fn migrate(db_connection: &mut SqliteConnection) -> Result<(), MigrationError> {
	match db_connection.run_pending_migrations(MIGRATIONS) {
		Ok(_) => Ok(()),
		Err(error) => Err(MigrationError(error)),
	}
}

/// Row counts and the time of the last import.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DataStats {
	pub student_count: i64,
	pub timetable_count: i64,
	pub last_updated_at: Option<String>,
}

pub fn list_classes(db_connection: &mut SqliteConnection) -> QueryResult<Vec<i32>> {
	let classes: Vec<Option<i32>> = student_master::table
		.select(student_master::class_no)
		.filter(student_master::class_no.is_not_null())
		.distinct()
		.order(student_master::class_no)
		.load(db_connection)?;
	Ok(classes.into_iter().flatten().collect())
}

pub fn list_student_numbers(db_connection: &mut SqliteConnection, class_no: i32) -> QueryResult<Vec<i32>> {
	let numbers: Vec<Option<i32>> = student_master::table
		.select(student_master::student_no)
		.filter(student_master::class_no.eq(class_no))
		.filter(student_master::student_no.is_not_null())
		.distinct()
		.order(student_master::student_no)
		.load(db_connection)?;
	Ok(numbers.into_iter().flatten().collect())
}

/// Looks up a student by ID; anything that isn't a digit is ignored, so `2-01-15` finds `20115`.
pub fn student_by_id(db_connection: &mut SqliteConnection, student_id: &str) -> QueryResult<Option<Student>> {
	let normalized: String = student_id.chars().filter(char::is_ascii_digit).collect();
	if normalized.is_empty() {
		return Ok(None);
	}
	student_master::table
		.find(normalized)
		.select(Student::as_select())
		.first(db_connection)
		.optional()
}

pub fn student_by_class_number(
	db_connection: &mut SqliteConnection,
	class_no: i32,
	student_no: i32,
) -> QueryResult<Option<Student>> {
	student_master::table
		.filter(student_master::class_no.eq(class_no))
		.filter(student_master::student_no.eq(student_no))
		.select(Student::as_select())
		.first(db_connection)
		.optional()
}

pub fn timetable_for_day(
	db_connection: &mut SqliteConnection,
	class_no: i32,
	weekday: Weekday,
) -> QueryResult<Vec<TimetablePattern>> {
	timetable_pattern::table
		.filter(timetable_pattern::class_no.eq(class_no))
		.filter(timetable_pattern::weekday.eq(weekday.label()))
		.order(timetable_pattern::period)
		.select(TimetablePattern::as_select())
		.load(db_connection)
}

pub fn timetable_period(
	db_connection: &mut SqliteConnection,
	class_no: i32,
	weekday: Weekday,
	period: i32,
) -> QueryResult<Option<TimetablePattern>> {
	timetable_pattern::table
		.find((class_no, weekday.label(), period))
		.select(TimetablePattern::as_select())
		.first(db_connection)
		.optional()
}

/// Replaces every student with the given rows in one transaction.
pub fn replace_students(db_connection: &mut SqliteConnection, students: &[Student]) -> QueryResult<usize> {
	db_connection.transaction(|db_connection| {
		diesel::delete(student_master::table).execute(db_connection)?;
		for student in students {
			diesel::insert_into(student_master::table)
				.values(student)
				.execute(db_connection)?;
		}
		Ok(students.len())
	})
}

/// Replaces the whole timetable with the given rows in one transaction.
pub fn replace_timetable(db_connection: &mut SqliteConnection, rows: &[TimetablePattern]) -> QueryResult<usize> {
	db_connection.transaction(|db_connection| {
		diesel::delete(timetable_pattern::table).execute(db_connection)?;
		for row in rows {
			diesel::insert_into(timetable_pattern::table)
				.values(row)
				.execute(db_connection)?;
		}
		Ok(rows.len())
	})
}

pub fn set_meta(db_connection: &mut SqliteConnection, key: &str, value: &str) -> QueryResult<()> {
	diesel::replace_into(app_meta::table)
		.values((app_meta::meta_key.eq(key), app_meta::meta_value.eq(value)))
		.execute(db_connection)?;
	Ok(())
}

pub fn get_meta(db_connection: &mut SqliteConnection, key: &str) -> QueryResult<Option<String>> {
	app_meta::table
		.find(key)
		.select(app_meta::meta_value)
		.first(db_connection)
		.optional()
}

pub fn get_stats(db_connection: &mut SqliteConnection) -> QueryResult<DataStats> {
	let student_count = student_master::table.count().get_result(db_connection)?;
	let timetable_count = timetable_pattern::table.count().get_result(db_connection)?;
	let last_updated_at = get_meta(db_connection, LAST_UPDATED_KEY)?;
	Ok(DataStats {
		student_count,
		timetable_count,
		last_updated_at,
	})
}

pub fn clear_all_data(db_connection: &mut SqliteConnection) -> QueryResult<()> {
	db_connection.transaction(|db_connection| {
		diesel::delete(student_master::table).execute(db_connection)?;
		diesel::delete(timetable_pattern::table).execute(db_connection)?;
		diesel::delete(app_meta::table).execute(db_connection)?;
		Ok(())
	})
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub(crate) fn memory_connection() -> SqliteConnection {
		let mut db_connection = SqliteConnection::establish(":memory:").unwrap();
		migrate(&mut db_connection).unwrap();
		db_connection
	}

	pub(crate) fn student(student_id: &str, class_no: i32, student_no: i32) -> Student {
		Student {
			student_id: student_id.to_string(),
			student_name: format!("학생{}", student_id),
			class_no: Some(class_no),
			student_no: Some(student_no),
			..Student::default()
		}
	}

	pub(crate) fn period(class_no: i32, weekday: Weekday, period: i32, block_code: &str, subject: &str) -> TimetablePattern {
		TimetablePattern {
			class_no,
			weekday: weekday.label().to_string(),
			period,
			block_code: block_code.to_string(),
			subject_name: Some(subject.to_string()),
			teacher_name: None,
			subject_teacher: subject.to_string(),
			exception_location: None,
		}
	}

	#[test]
	fn empty_database_has_no_data() {
		let mut db_connection = memory_connection();
		assert_eq!(get_stats(&mut db_connection).unwrap(), DataStats::default());
		assert!(list_classes(&mut db_connection).unwrap().is_empty());
	}

	#[test]
	fn finds_students_by_id_and_class_number() {
		let mut db_connection = memory_connection();
		let students = [student("20115", 1, 15), student("20203", 2, 3), student("20101", 1, 1)];
		assert_eq!(replace_students(&mut db_connection, &students).unwrap(), 3);

		let found = student_by_id(&mut db_connection, "2-01-15").unwrap().unwrap();
		assert_eq!(found, students[0]);
		assert_eq!(student_by_id(&mut db_connection, "abc").unwrap(), None);
		assert_eq!(student_by_id(&mut db_connection, "29999").unwrap(), None);

		let found = student_by_class_number(&mut db_connection, 2, 3).unwrap().unwrap();
		assert_eq!(found.student_id, "20203");

		assert_eq!(list_classes(&mut db_connection).unwrap(), vec![1, 2]);
		assert_eq!(list_student_numbers(&mut db_connection, 1).unwrap(), vec![1, 15]);
	}

	#[test]
	fn replacing_data_drops_old_rows() {
		let mut db_connection = memory_connection();
		replace_students(&mut db_connection, &[student("20115", 1, 15)]).unwrap();
		replace_students(&mut db_connection, &[student("20301", 3, 1)]).unwrap();
		assert_eq!(student_by_id(&mut db_connection, "20115").unwrap(), None);

		replace_timetable(
			&mut db_connection,
			&[
				period(1, Weekday::Monday, 2, "기초1", "수학"),
				period(1, Weekday::Monday, 1, "국어", "국어"),
				period(1, Weekday::Tuesday, 1, "영어", "영어"),
			],
		)
		.unwrap();
		let monday: Vec<i32> = timetable_for_day(&mut db_connection, 1, Weekday::Monday)
			.unwrap()
			.into_iter()
			.map(|row| row.period)
			.collect();
		assert_eq!(monday, vec![1, 2]);
		let tuesday = timetable_period(&mut db_connection, 1, Weekday::Tuesday, 1).unwrap().unwrap();
		assert_eq!(tuesday.subject_teacher, "영어");
	}

	#[test]
	fn stats_and_clear() {
		let mut db_connection = memory_connection();
		replace_students(&mut db_connection, &[student("20115", 1, 15)]).unwrap();
		replace_timetable(&mut db_connection, &[period(1, Weekday::Friday, 7, "국어", "국어")]).unwrap();
		set_meta(&mut db_connection, LAST_UPDATED_KEY, "2025-03-01 08:00:00").unwrap();
		set_meta(&mut db_connection, LAST_UPDATED_KEY, "2025-03-02 08:00:00").unwrap();

		let stats = get_stats(&mut db_connection).unwrap();
		assert_eq!(stats.student_count, 1);
		assert_eq!(stats.timetable_count, 1);
		assert_eq!(stats.last_updated_at.as_deref(), Some("2025-03-02 08:00:00"));

		clear_all_data(&mut db_connection).unwrap();
		assert_eq!(get_stats(&mut db_connection).unwrap(), DataStats::default());
	}
}
