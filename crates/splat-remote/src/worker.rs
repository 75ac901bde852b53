//! Command template for the remote training worker.
//!
//! The remote host runs a training entry point (COLMAP plus the Brush
//! trainer, driven by a script such as `windows_train.py`) against an
//! uploaded job directory. The wrapper produced here is the only contract
//! between the two machines: the worker reads `--input` and `--steps`,
//! writes `.ply` exports under the job directory, and exits non-zero on any
//! internal failure. Environment activation is left to the remote login
//! shell.

/// Builds the shell command that starts training inside `job_dir`.
///
/// Paths are double-quoted so job directories with spaces survive the
/// remote shell.
#[must_use]
pub fn wrapper_command(job_dir: &str, train_script: &str, steps: u32) -> String {
    format!("cd \"{job_dir}\" && python \"{train_script}\" --input \"{job_dir}\" --steps {steps}")
}

/// Builds the command that creates the job directory before upload.
#[must_use]
pub fn create_job_dir_command(job_dir: &str) -> String {
    format!("mkdir -p \"{job_dir}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_quotes_job_dir_and_forwards_steps() {
        let cmd = wrapper_command("/c/splat/jobs/job_1700000000", "C:/splat/windows_train.py", 30000);
        assert_eq!(
            cmd,
            "cd \"/c/splat/jobs/job_1700000000\" && \
             python \"C:/splat/windows_train.py\" --input \"/c/splat/jobs/job_1700000000\" --steps 30000"
        );
    }

    #[test]
    fn test_wrapper_survives_spaces_in_job_dir() {
        let cmd = wrapper_command("/c/splat jobs/job_1", "C:/splat/windows_train.py", 500);
        assert!(cmd.contains("cd \"/c/splat jobs/job_1\""));
        assert!(cmd.contains("--input \"/c/splat jobs/job_1\""));
        assert!(cmd.ends_with("--steps 500"));
    }

    #[test]
    fn test_create_job_dir_is_recursive() {
        assert_eq!(
            create_job_dir_command("/c/splat/jobs/job_9"),
            "mkdir -p \"/c/splat/jobs/job_9\""
        );
    }
}
