use std::env;
use std::fs;
use std::path::PathBuf;

use changelog::{classifier_for, ChangelogDoc, RemoteConfig};
use git::{GitHistory, History};

use crate::config;
use crate::error::{CliError, Result};
use crate::ui;

pub fn execute(overwrite: bool, path: Option<String>, verbose: bool) -> Result<()> {
    let root: PathBuf = match path {
        Some(path) => fs::canonicalize(path)
            .map_err(|e| CliError::Io(e).with_context("Failed to resolve project path"))?,
        None => env::current_dir()?,
    };

    let config = config::load(&root);
    let log_path = root.join(&config.changelog_name);

    if verbose {
        println!("Project: {}", config.project_name);
        println!("Changelog: {}", log_path.display());
    }

    if overwrite {
        if log_path.exists() {
            fs::remove_file(&log_path)
                .map_err(|e| CliError::Io(e).with_context("Failed to remove existing changelog"))?;
            ui::info_message("Discarded the existing changelog");
        } else {
            ui::warning_message("Skipping overwrite, no existing changelog found");
        }
    }

    let history = GitHistory::new(&root);

    if !history.is_available() {
        ui::warning_message("Git not enabled in this directory. Not generating a changelog.");
        return Ok(());
    }

    let classifier = classifier_for(&RemoteConfig {
        api_key: config.api_key,
        run_locally: config.local,
        project_name: config.project_name,
    });

    let mut doc = ChangelogDoc::new(&log_path, &history, classifier.as_ref());
    doc.generate()?;
    doc.save()?;

    ui::success_message(&format!("Saved changelog to {}", log_path.display()));

    Ok(())
}
