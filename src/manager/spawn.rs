/*!
 * Process Spawning
 * Fire-and-forget executable launch with the desktop child setup hook
 */

use super::types::{ManagerError, ManagerResult};
use crate::core::types::Pid;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::env;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Spawn the command line as a detached child process.
///
/// The first whitespace-delimited token is the program name and is resolved
/// against the search path; the remaining tokens become the argument vector.
/// The child runs with default priority and without the shell's OOM
/// protection. The caller owns the returned handle for later reaping; the
/// spawn itself never waits.
pub(crate) fn spawn_executable(exec: &str) -> ManagerResult<(Pid, Child)> {
    let mut tokens = exec.split_whitespace();
    let program = tokens
        .next()
        .ok_or_else(|| ManagerError::SpawnFailed("empty command line".to_string()))?;
    let resolved = resolve_program(program)
        .ok_or_else(|| ManagerError::SpawnFailed(format!("{}: not found", program)))?;

    let mut command = Command::new(&resolved);
    command
        .args(tokens)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    // Runs between fork and exec: only async-signal-safe calls allowed.
    unsafe {
        command.pre_exec(|| {
            reset_priority();
            unprotect_oom();
            Ok(())
        });
    }

    let child = command
        .spawn()
        .map_err(|e| ManagerError::SpawnFailed(format!("{}: {}", program, e)))?;
    let pid = child.id();

    info!("Spawned '{}' (pid {})", exec, pid);
    Ok((pid, child))
}

/// Resolve a program name against PATH.
///
/// Names containing a separator are taken as-is; bare names are searched in
/// PATH order for an executable regular file.
fn resolve_program(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 {
        return is_executable(direct).then(|| direct.to_path_buf());
    }

    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Give the child default priority if it inherited the shell's elevation.
unsafe fn reset_priority() {
    *libc::__errno_location() = 0;
    let priority = libc::getpriority(libc::PRIO_PROCESS, 0);
    if *libc::__errno_location() == 0 && priority < 0 {
        libc::setpriority(libc::PRIO_PROCESS, 0, 0);
    }
}

/// The shell may run OOM-protected; its children must not.
unsafe fn unprotect_oom() {
    const OOM_SCORE_ADJ: &[u8] = b"/proc/self/oom_score_adj\0";
    let fd = libc::open(OOM_SCORE_ADJ.as_ptr().cast(), libc::O_WRONLY);
    if fd >= 0 {
        let reset = b"0";
        let _ = libc::write(fd, reset.as_ptr().cast(), reset.len());
        libc::close(fd);
    }
}

/// Spawned-child table for zombie reaping.
///
/// Children are never awaited at spawn time; the state-check loop sweeps the
/// table with non-blocking `try_wait` so exited children do not linger as
/// zombies.
#[derive(Debug, Default)]
pub(crate) struct ChildTable {
    children: DashMap<Pid, Child>,
}

impl ChildTable {
    pub(crate) fn new() -> Self {
        Self {
            children: DashMap::new(),
        }
    }

    pub(crate) fn insert(&self, pid: Pid, child: Child) {
        self.children.insert(pid, child);
    }

    /// Collect exited children. Returns how many were reaped.
    pub(crate) fn reap(&self) -> usize {
        let mut exited = Vec::new();

        for mut entry in self.children.iter_mut() {
            let pid = *entry.key();
            match entry.value_mut().try_wait() {
                Ok(Some(status)) => {
                    debug!("Child {} exited with {:?}", pid, status.code());
                    exited.push(pid);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Error checking child {}: {}", pid, e);
                    exited.push(pid);
                }
            }
        }

        for pid in &exited {
            self.children.remove(pid);
        }
        exited.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_spawn_and_reap() {
        let (pid, child) = spawn_executable("sleep 0.05").unwrap();
        assert!(pid > 0);

        let table = ChildTable::new();
        table.insert(pid, child);
        assert_eq!(table.len(), 1);

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(table.reap(), 1);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_spawn_with_arguments() {
        let (pid, mut child) = spawn_executable("sleep 0.05").unwrap();
        assert!(pid > 0);
        child.wait().unwrap();
    }

    #[test]
    fn test_spawn_missing_program() {
        let result = spawn_executable("definitely-not-a-real-binary-name");
        assert!(matches!(result, Err(ManagerError::SpawnFailed(_))));
    }

    #[test]
    fn test_spawn_empty_command_line() {
        let result = spawn_executable("   ");
        assert!(matches!(result, Err(ManagerError::SpawnFailed(_))));
    }

    #[test]
    fn test_resolve_absolute_path() {
        let resolved = resolve_program("/bin/sleep");
        if Path::new("/bin/sleep").exists() {
            assert_eq!(resolved, Some(PathBuf::from("/bin/sleep")));
        }
    }

    #[test]
    fn test_resolve_bare_name_searches_path() {
        assert!(resolve_program("sleep").is_some());
        assert!(resolve_program("definitely-not-a-real-binary-name").is_none());
    }
}
