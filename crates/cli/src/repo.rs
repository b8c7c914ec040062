//! Template repository resolution: local directories are used in place,
//! remote repositories are cloned (via the `git` executable) into the
//! cache directory and the requested ref checked out. Resolution happens
//! once at startup; the loaded schema then lives in the server state for
//! the rest of the process.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::UserConfig;

/// A template resolved to a local directory.
#[derive(Debug)]
pub(crate) struct ResolvedTemplate {
    /// Root of the (cloned or local) template repository.
    pub repo_dir: PathBuf,
    /// Directory holding `cookiecutter.json`; differs from `repo_dir`
    /// when `--directory` selects a subfolder.
    pub schema_dir: PathBuf,
    /// Display name for the form title.
    pub name: String,
}

impl ResolvedTemplate {
    pub fn schema_file(&self) -> PathBuf {
        self.schema_dir.join("cookiecutter.json")
    }
}

/// Resolve a template argument to a local directory with a schema file.
pub(crate) fn resolve_template(
    template: &str,
    checkout: Option<&str>,
    directory: Option<&str>,
    config: &UserConfig,
) -> Result<ResolvedTemplate, String> {
    let expanded = expand_abbreviation(template, config);

    let repo_dir = if is_repo_url(&expanded) {
        clone_or_update(&expanded, checkout, &config.repos_dir())?
    } else {
        let local = PathBuf::from(&expanded);
        if !local.is_dir() {
            return Err(format!(
                "template '{}' is neither a local directory nor a repository URL",
                template
            ));
        }
        if let Some(checkout) = checkout {
            git(&local, &["checkout", checkout])?;
        }
        local
    };

    let schema_dir = match directory {
        Some(sub) => repo_dir.join(sub),
        None => repo_dir.clone(),
    };

    if !schema_dir.join("cookiecutter.json").is_file() {
        return Err(format!(
            "no cookiecutter.json found in '{}'",
            schema_dir.display()
        ));
    }

    let name = schema_dir
        .file_name()
        .or_else(|| repo_dir.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_owned());

    Ok(ResolvedTemplate {
        repo_dir,
        schema_dir,
        name,
    })
}

/// Expand `gh:user/repo`-style shorthands. An exact abbreviation key is
/// replaced wholesale; a `prefix:rest` argument substitutes `rest` for
/// `{0}` in the expansion.
pub(crate) fn expand_abbreviation(template: &str, config: &UserConfig) -> String {
    if let Some(expansion) = config.abbreviation(template) {
        return expansion;
    }
    if let Some((prefix, rest)) = template.split_once(':') {
        if let Some(expansion) = config.abbreviation(prefix) {
            if expansion.contains("{0}") {
                return expansion.replace("{0}", rest);
            }
        }
    }
    template.to_owned()
}

pub(crate) fn is_repo_url(template: &str) -> bool {
    template.starts_with("http://")
        || template.starts_with("https://")
        || template.starts_with("ssh://")
        || template.starts_with("git@")
        || template.ends_with(".git")
}

/// Clone the repository into the cache, or refresh an existing clone.
fn clone_or_update(url: &str, checkout: Option<&str>, repos_dir: &Path) -> Result<PathBuf, String> {
    let clone_dir = repos_dir.join(repo_dir_name(url));

    if clone_dir.join(".git").is_dir() {
        git(&clone_dir, &["fetch", "origin"])?;
    } else {
        std::fs::create_dir_all(repos_dir)
            .map_err(|e| format!("could not create cache dir '{}': {}", repos_dir.display(), e))?;
        let output = Command::new("git")
            .arg("clone")
            .arg(url)
            .arg(&clone_dir)
            .output()
            .map_err(|e| format!("could not run git: {}", e))?;
        if !output.status.success() {
            return Err(format!(
                "git clone of '{}' failed: {}",
                url,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
    }

    if let Some(checkout) = checkout {
        git(&clone_dir, &["checkout", checkout])?;
    }

    Ok(clone_dir)
}

fn git(repo: &Path, args: &[&str]) -> Result<(), String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| format!("could not run git: {}", e))?;
    if output.status.success() {
        Ok(())
    } else {
        Err(format!(
            "git {} failed in '{}': {}",
            args.join(" "),
            repo.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

/// Directory name for a clone: last path segment without `.git`.
fn repo_dir_name(url: &str) -> String {
    let tail = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or("template");
    tail.trim_end_matches(".git").to_owned()
}
