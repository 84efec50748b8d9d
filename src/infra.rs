use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

/// Best-effort source of paths changed in the repository containing `root`.
///
/// Implementations never fail: any problem yields an empty set.
pub trait ChangeOracle: Send + Sync {
    fn changed_paths(&self, root: &Path, head: Option<&str>, base: &str) -> BTreeSet<PathBuf>;
}

#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
        }
    }
}

impl GitCli {
    fn run_raw<I, S>(&self, args: I, cwd: &Path) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<String> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().into_owned())
            .collect();
        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(cwd)
            .output()
            .with_context(|| format!("failed to execute {} {:?}", self.binary, args))?;

        if !output.status.success() {
            bail!(
                "{} {} failed: {}",
                self.binary,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn repository_root(&self, root: &Path) -> Result<PathBuf> {
        let stdout = self.run_raw(["rev-parse", "--show-toplevel"], root)?;
        let toplevel = PathBuf::from(stdout.trim());
        fs::canonicalize(&toplevel)
            .with_context(|| format!("failed to resolve repository root {}", toplevel.display()))
    }

    fn try_changed_paths(
        &self,
        root: &Path,
        head: Option<&str>,
        base: &str,
    ) -> Result<BTreeSet<PathBuf>> {
        let head = head.filter(|head| !head.is_empty());
        let repo = self.repository_root(root)?;
        let diff = self.run_raw(diff_args(head, base), &repo)?;
        let mut changed = parse_name_only(&diff);

        if head.is_none() {
            let untracked =
                self.run_raw(["ls-files", "--others", "--exclude-standard"], &repo)?;
            changed.extend(parse_name_only(&untracked));
        }

        Ok(changed.into_iter().map(|path| repo.join(path)).collect())
    }
}

impl ChangeOracle for GitCli {
    fn changed_paths(&self, root: &Path, head: Option<&str>, base: &str) -> BTreeSet<PathBuf> {
        match self.try_changed_paths(root, head, base) {
            Ok(changed) => {
                debug!(count = changed.len(), "loaded changed paths");
                changed
            }
            Err(err) => {
                warn!(
                    root = %root.display(),
                    error = %format!("{err:#}"),
                    "change detection unavailable"
                );
                BTreeSet::new()
            }
        }
    }
}

fn diff_args(head: Option<&str>, base: &str) -> Vec<String> {
    let mut args = vec!["diff".to_string(), "--name-only".to_string()];
    if let Some(head) = head {
        args.push(head.to_string());
    }
    args.push(base.to_string());
    args
}

pub fn parse_name_only(output: &str) -> BTreeSet<PathBuf> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}
