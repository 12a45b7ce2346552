//! Library updater backed by the `git` executable.

use std::{path::Path, process::Command};

use eyre::{Result, WrapErr, bail};
use kbuild_pipeline::{LibraryUpdater, Progress};
use tracing::debug;

/// Keeps a checkout at a refspec using `git` from `PATH`.
///
/// A missing checkout is cloned first. The refspec is then fetched and
/// checked out detached, which works for branches, tags and commits.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCliUpdater;

impl GitCliUpdater {
    /// The `git` invocations needed to bring `local_path` to `refspec`.
    pub fn commands(local_path: &Path, git_url: &str, refspec: &str) -> Vec<Vec<String>> {
        let dir = local_path.to_string_lossy().into_owned();
        let mut commands = Vec::new();

        if !local_path.join(".git").exists() {
            commands.push(vec![
                "clone".to_string(),
                "--no-checkout".to_string(),
                git_url.to_string(),
                dir.clone(),
            ]);
        }
        commands.push(vec![
            "-C".to_string(),
            dir.clone(),
            "fetch".to_string(),
            "--depth=1".to_string(),
            git_url.to_string(),
            refspec.to_string(),
        ]);
        commands.push(vec![
            "-C".to_string(),
            dir,
            "checkout".to_string(),
            "--detach".to_string(),
            "FETCH_HEAD".to_string(),
        ]);
        commands
    }
}

impl LibraryUpdater for GitCliUpdater {
    fn upgrade(
        &self,
        local_path: &Path,
        git_url: &str,
        refspec: &str,
        progress: &dyn Progress,
    ) -> Result<()> {
        for args in Self::commands(local_path, git_url, refspec) {
            progress.message(&format!("git {}", args.join(" ")));
            run_git(&args)?;
        }
        Ok(())
    }
}

fn run_git(args: &[String]) -> Result<()> {
    debug!(?args, "running git");
    let output = Command::new("git")
        .args(args)
        .output()
        .wrap_err("failed to run git")?;

    if !output.status.success() {
        bail!(
            "git {} exited with {}:\n{}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim_end()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_checkout_is_cloned() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("formats");
        let d = dir.to_string_lossy().into_owned();

        let commands = GitCliUpdater::commands(&dir, "https://example.com/f.git", "v1");

        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[0],
            vec!["clone", "--no-checkout", "https://example.com/f.git", d.as_str()]
        );
        assert_eq!(
            commands[2],
            vec!["-C", d.as_str(), "checkout", "--detach", "FETCH_HEAD"]
        );
    }

    #[test]
    fn test_existing_checkout_is_fetched() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join(".git")).unwrap();
        let d = temp.path().to_string_lossy().into_owned();

        let commands = GitCliUpdater::commands(temp.path(), "https://example.com/f.git", "master");

        assert_eq!(
            commands[0],
            vec![
                "-C",
                d.as_str(),
                "fetch",
                "--depth=1",
                "https://example.com/f.git",
                "master"
            ]
        );
        assert_eq!(commands.len(), 2);
    }
}
