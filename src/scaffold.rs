use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::path::Path;
use std::process::Command;

use crate::app_config::ScaffoldConfig;
use crate::file_utils::FileManager;

// @module: Sphinx project scaffold generation

/// Runs the external project scaffold tool
pub struct ScaffoldRunner;

impl ScaffoldRunner {
    /// Argument list for the scaffold tool, program name excluded
    pub fn command_args(config: &ScaffoldConfig, destination: &Path) -> Vec<String> {
        let mut args = vec![destination.to_string_lossy().to_string()];

        args.push(if config.separate_source { "--sep" } else { "--no-sep" }.to_string());
        // Must not prompt for anything missing here
        args.push("--quiet".to_string());
        args.extend(["--dot".to_string(), config.dot.clone()]);
        args.extend(["--project".to_string(), config.project.clone()]);
        args.extend(["--author".to_string(), config.author.clone()]);
        args.extend(["-v".to_string(), config.version.clone()]);
        args.extend(["--release".to_string(), config.release.clone()]);
        args.extend(["--language".to_string(), config.language.clone()]);
        args.extend(["--suffix".to_string(), config.suffix.clone()]);
        args.extend(["--master".to_string(), config.master_name().to_string()]);

        if config.epub {
            args.push("--epub".to_string());
        }
        args.extend(config.extensions.iter().map(|ext| format!("--ext-{}", ext)));

        args.push(if config.makefile { "--makefile" } else { "--no-makefile" }.to_string());
        args.push(if config.batchfile { "--batchfile" } else { "--no-batchfile" }.to_string());
        match config.use_make_mode {
            Some(true) => args.push("--use-make-mode".to_string()),
            Some(false) => args.push("--no-use-make-mode".to_string()),
            None => {}
        }

        args
    }

    /// Remove `destination` and regenerate the project skeleton in it
    pub fn run(config: &ScaffoldConfig, destination: &Path) -> Result<()> {
        if FileManager::dir_exists(destination) {
            info!("Removing {:?}", destination);
            FileManager::remove_dir_if_exists(destination);
        }

        let args = Self::command_args(config, destination);
        debug!("Running {} {}", config.program, args.join(" "));

        let status = Command::new(&config.program)
            .args(&args)
            .status()
            .with_context(|| format!("Failed to start {}", config.program))?;

        if !status.success() {
            return Err(anyhow!("{} exited with {}", config.program, status));
        }

        info!("Generated project skeleton in {:?}", destination);
        Ok(())
    }
}
