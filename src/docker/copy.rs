//! Copy files out of an image.

use std::path::Path;
use std::time::Duration;

use crate::error::{Result, TagshipError};
use crate::process::{CommandRunner, CommandSpec};

const REMOVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Removes the container when dropped, also on error or panic
struct ContainerGuard<'a, R: CommandRunner> {
    id: String,
    cwd: &'a Path,
    runner: &'a R,
}

impl<R: CommandRunner> Drop for ContainerGuard<'_, R> {
    fn drop(&mut self) {
        let rm = CommandSpec::new("docker", self.cwd)
            .args(["rm", self.id.as_str()])
            .timeout(REMOVE_TIMEOUT);
        match self.runner.run(&rm) {
            Ok(output) if output.success() => {
                log::debug!("Removed container {}", self.id);
            }
            Ok(output) => log::warn!(
                "Failed to remove container {} (exit code {:?}): {}",
                self.id,
                output.code,
                output.stderr.trim()
            ),
            Err(e) => log::warn!("Failed to remove container {}: {}", self.id, e),
        }
    }
}

/// Copy `src` from `image` to the local path `dest`.
///
/// A stopped container is created from the image (for `platform` if
/// given), the path is copied out with `docker cp` and the container is
/// removed again whether or not the copy succeeded.
pub fn copy_from_image<R: CommandRunner>(
    runner: &R,
    cwd: &Path,
    image: &str,
    src: &str,
    dest: &Path,
    platform: Option<&str>,
) -> Result<()> {
    let mut create = CommandSpec::new("docker", cwd).arg("create");
    if let Some(platform) = platform {
        create = create.arg(format!("--platform={}", platform));
    }
    let id = runner.run_checked(&create.arg(image))?;
    let id = id.lines().last().unwrap_or_default().trim().to_string();
    if id.is_empty() {
        return Err(TagshipError::ToolFailed {
            command: format!("docker create {}", image),
            code: 0,
            stderr: "no container id returned".to_string(),
        });
    }

    let guard = ContainerGuard {
        id,
        cwd,
        runner,
    };

    let source = format!("{}:{}", guard.id, src);
    let cp = CommandSpec::new("docker", cwd)
        .arg("cp")
        .arg(source)
        .arg(dest.to_string_lossy());
    runner.run_checked(&cp)?;
    log::info!("Copied {} from {} to {}", src, image, dest.display());
    Ok(())
}
