//! Generation engine adapter: shells out to the external `cookiecutter`
//! executable with the finalized context. The template tree itself is
//! never rendered here.

use std::path::{Path, PathBuf};
use std::process::Command;

use proof_form::{BakeFailure, BakeRequest, ExpressionRenderer, GenerationEngine, JinjaRenderer};
use serde_json::Value;

#[derive(Debug, Clone)]
pub(crate) struct CookiecutterProcess {
    executable: String,
}

impl CookiecutterProcess {
    pub fn new() -> CookiecutterProcess {
        CookiecutterProcess {
            executable: "cookiecutter".to_owned(),
        }
    }

    #[cfg(test)]
    pub fn with_executable(executable: impl Into<String>) -> CookiecutterProcess {
        CookiecutterProcess {
            executable: executable.into(),
        }
    }

    /// The path the generated project lands at. The engine itself prints
    /// nothing on success, so the templated top-level directory name of
    /// the template tree is rendered against the final context; when the
    /// template has none, the output root is reported.
    fn generated_path(&self, request: &BakeRequest) -> PathBuf {
        let output_root = request
            .target
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let mut template_dir = PathBuf::from(&request.target.template);
        if let Some(sub) = &request.target.directory {
            template_dir = template_dir.join(sub);
        }

        match templated_dir_name(&template_dir) {
            Some(raw_name) => {
                let renderer = JinjaRenderer::new();
                let context = serde_json::json!({ "cookiecutter": request.context });
                match renderer.render(&raw_name, &context) {
                    Ok(rendered) => output_root.join(rendered),
                    Err(_) => output_root,
                }
            }
            None => output_root,
        }
    }
}

impl GenerationEngine for CookiecutterProcess {
    fn bake(&self, request: &BakeRequest) -> Result<PathBuf, BakeFailure> {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(&request.target.template).arg("--no-input");

        if request.target.overwrite_if_exists {
            cmd.arg("--overwrite-if-exists");
        }
        if let Some(directory) = &request.target.directory {
            cmd.arg("--directory").arg(directory);
        }
        if let Some(checkout) = &request.target.checkout {
            cmd.arg("--checkout").arg(checkout);
        }
        if let Some(output_dir) = &request.target.output_dir {
            cmd.arg("--output-dir").arg(output_dir);
        }
        if let Some(config_file) = &request.target.config_file {
            cmd.arg("--config-file").arg(config_file);
        }

        if let Some(entries) = request.context.as_object() {
            for (key, value) in entries {
                cmd.arg(format!("{}={}", key, context_arg(value)));
            }
        }

        let output = cmd.output().map_err(|e| {
            BakeFailure::new(format!(
                "could not run '{}': {} (is cookiecutter installed?)",
                self.executable, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim().lines().last().unwrap_or("unknown failure");
            return Err(BakeFailure::new(format!(
                "cookiecutter exited with {}: {}",
                output.status, detail
            )));
        }

        Ok(self.generated_path(request))
    }
}

/// A context value as a command-line argument: strings pass through,
/// nested group mappings are serialized as JSON.
fn context_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Find the template's `{{ ... }}` top-level directory, if any.
fn templated_dir_name(template_dir: &Path) -> Option<String> {
    let entries = std::fs::read_dir(template_dir).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().is_dir() && name.contains("{{") && name.contains("}}") {
            return Some(name);
        }
    }
    None
}
