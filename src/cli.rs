// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::{DEFAULT_CONFIG_PATH, parse_config};
use crate::database::{clear_all_data, connect_db, get_stats, run_embedded_migrations};
use crate::import::{DEFAULT_GRADE, apply_import, read_roster};
use crate::web::server::run_server;
use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;
use std::sync::Arc;

/// Student timetable lookup for GS-Timetable.
#[derive(Debug, Parser)]
#[command(name = "gs-timetable")]
pub struct Cli {
	/// Path to the KDL configuration file.
	#[arg(long, default_value = DEFAULT_CONFIG_PATH)]
	pub config: String,

	#[command(subcommand)]
	pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
	/// Run the web server (the default).
	Serve,

	/// Replace the stored students and timetable with a KDL roster file.
	Import {
		/// Path to the roster file.
		roster: String,

		/// Grade used to build IDs for students listed only by class and number.
		#[arg(long, default_value_t = DEFAULT_GRADE)]
		grade: i32,
	},

	/// Delete all students, timetable rows and import metadata.
	Clear,

	/// Show how much data is stored.
	Stats,
}

pub async fn run_from_args() -> miette::Result<()> {
	let cli = Cli::parse();

	let config = parse_config(&cli.config).await?;
	tracing::debug!(path = %cli.config, ?config, "Loaded configuration");

	let db_connection_pool = connect_db(&config)?;
	run_embedded_migrations(&db_connection_pool)?;

	match cli.command.unwrap_or(CliCommand::Serve) {
		CliCommand::Serve => {
			if let Err(error) = run_server(Arc::new(config), db_connection_pool).await {
				tracing::error!(source = ?error, "Web server failed to run");
				return Err(error);
			}
		}
		CliCommand::Import { roster, grade } => {
			let import = read_roster(&roster, grade).await?;
			for warning in import.warnings.iter() {
				tracing::warn!(%warning, "Skipped roster entry");
			}

			let mut db_connection = db_connection_pool.get().into_diagnostic()?;
			let stats = apply_import(&mut db_connection, &import).into_diagnostic()?;
			tracing::info!(
				students = stats.student_count,
				periods = stats.timetable_count,
				skipped = import.warnings.len(),
				"Imported roster"
			);
		}
		CliCommand::Clear => {
			let mut db_connection = db_connection_pool.get().into_diagnostic()?;
			clear_all_data(&mut db_connection).into_diagnostic()?;
			tracing::info!("Cleared all timetable data");
		}
		CliCommand::Stats => {
			let mut db_connection = db_connection_pool.get().into_diagnostic()?;
			let stats = get_stats(&mut db_connection).into_diagnostic()?;
			println!("Students: {}", stats.student_count);
			println!("Timetable rows: {}", stats.timetable_count);
			println!("Last updated: {}", stats.last_updated_at.as_deref().unwrap_or("never"));
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> Cli {
		Cli::try_parse_from(args).unwrap()
	}

	#[test]
	fn serves_by_default() {
		let cli = parse(&["gs-timetable"]);
		assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
		assert!(cli.command.is_none());
	}

	#[test]
	fn import_takes_roster_and_grade() {
		let cli = parse(&["gs-timetable", "--config", "prod.kdl", "import", "roster.kdl", "--grade", "3"]);
		assert_eq!(cli.config, "prod.kdl");
		match cli.command {
			Some(CliCommand::Import { roster, grade }) => {
				assert_eq!(roster, "roster.kdl");
				assert_eq!(grade, 3);
			}
			other => panic!("unexpected command: {:?}", other),
		}
	}

	#[test]
	fn import_defaults_grade() {
		match parse(&["gs-timetable", "import", "roster.kdl"]).command {
			Some(CliCommand::Import { grade, .. }) => assert_eq!(grade, DEFAULT_GRADE),
			other => panic!("unexpected command: {:?}", other),
		}
	}
}
