// © 2025 GS Timetable Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kdl::{KdlDocument, KdlNode};
use miette::{IntoDiagnostic, Result, bail};
use tokio::fs::read_to_string;

pub const DEFAULT_CONFIG_PATH: &str = "config.kdl";
pub const DEFAULT_DATABASE_PATH: &str = "gs-timetable.db";

pub async fn parse_config(config_path: &str) -> Result<ConfigData> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	parse_config_document(&config_file_contents)
}

pub fn parse_config_document(contents: &str) -> Result<ConfigData> {
	let document: KdlDocument = contents.parse()?;

	let Some(web_node) = document.get("web") else {
		bail!("Config is missing the `web` block");
	};
	let web = WebConfig::from_node(web_node)?;
	let database = match document.get("database") {
		Some(database_node) => DatabaseConfig::from_node(database_node)?,
		None => DatabaseConfig::default(),
	};

	Ok(ConfigData { web, database })
}

#[derive(Debug)]
pub struct ConfigData {
	pub web: WebConfig,
	pub database: DatabaseConfig,
}

#[derive(Debug)]
pub struct WebConfig {
	/// Socket address the HTTP server listens on, e.g. `127.0.0.1:3000`
	pub bind_addr: String,
}

impl WebConfig {
	fn from_node(node: &KdlNode) -> Result<Self> {
		let Some(children) = node.children() else {
			bail!("The `web` block has no settings");
		};
		let Some(bind_addr) = children.get_arg("bind_addr") else {
			bail!("The `web` block is missing `bind_addr`");
		};
		let Some(bind_addr) = bind_addr.as_string() else {
			bail!("`bind_addr` must be a string");
		};

		Ok(Self {
			bind_addr: bind_addr.to_string(),
		})
	}
}

#[derive(Debug)]
pub struct DatabaseConfig {
	/// SQLite database file; created on first start.
	pub path: String,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			path: String::from(DEFAULT_DATABASE_PATH),
		}
	}
}

impl DatabaseConfig {
	fn from_node(node: &KdlNode) -> Result<Self> {
		let Some(path) = node.children().and_then(|children| children.get_arg("path")) else {
			return Ok(Self::default());
		};
		let Some(path) = path.as_string() else {
			bail!("`database.path` must be a string");
		};

		Ok(Self {
			path: path.to_string(),
		})
	}
}
