//! Handoff to the external compositor.
//!
//! The compositor turns the finished HTML into a paginated PDF. It runs as
//! a subprocess with a wall-clock timeout; its combined output is captured
//! and returned verbatim, both on success and on failure.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A composed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    /// Everything the compositor wrote to stdout and stderr.
    pub log: String,
}

/// Something that turns markup into a rendered artifact.
pub trait Compositor {
    fn compose(&self, markup: &str) -> Result<Artifact>;
}

/// Runs Prince: `prince <input.html> -o <output.pdf>`.
#[derive(Debug, Clone)]
pub struct PrinceCompositor {
    program: PathBuf,
    output: PathBuf,
    timeout: Duration,
    base_dir: Option<PathBuf>,
    extra_args: Vec<String>,
}

impl PrinceCompositor {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("prince"),
            output: output.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            base_dir: None,
            extra_args: Vec::new(),
        }
    }

    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Write the input document here so relative asset paths resolve.
    pub fn base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Extra compositor argument, placed before the input path.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }
}

fn read_log(file: &mut File) -> Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Compositor for PrinceCompositor {
    fn compose(&self, markup: &str) -> Result<Artifact> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix(".bookset-").suffix(".html");
            builder
        };
        let mut input = match &self.base_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        input.write_all(markup.as_bytes())?;
        input.flush()?;

        let mut log = tempfile::tempfile()?;
        info!(
            "Composing {} with {}",
            self.output.display(),
            self.program.display()
        );
        let started = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.extra_args)
            .arg(input.path())
            .arg("-o")
            .arg(&self.output)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log.try_clone()?))
            .stderr(Stdio::from(log.try_clone()?))
            .spawn()?;

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= self.timeout {
                if let Err(e) = child.kill() {
                    warn!("Failed to kill compositor: {e}");
                }
                child.wait()?;
                let log = read_log(&mut log)?;
                warn!("Compositor timed out after {:?}", self.timeout);
                return Err(Error::CompositorTimeout {
                    timeout: self.timeout,
                    log,
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let log = read_log(&mut log)?;
        if !status.success() {
            warn!("Compositor failed: {status}");
            return Err(Error::Compositor {
                status: status.to_string(),
                log,
            });
        }
        if !log.trim().is_empty() {
            debug!("Compositor log:\n{log}");
        }
        info!("Composed in {:.1}s", started.elapsed().as_secs_f64());
        Ok(Artifact {
            path: self.output.clone(),
            log,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn fake_prince(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("fake-prince");
        fs::write(&path, script).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn test_compose_success_returns_log() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_prince(
            dir.path(),
            "#!/bin/sh\necho \"prince: warning: font fallback\" >&2\ncp \"$1\" \"$3\"\n",
        );
        let output = dir.path().join("book.pdf");
        let artifact = PrinceCompositor::new(&output)
            .program(program)
            .base_dir(dir.path())
            .compose("<p>hallo</p>")
            .unwrap();

        assert_eq!(artifact.path, output);
        assert!(artifact.log.contains("font fallback"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "<p>hallo</p>");
    }

    #[test]
    fn test_extra_args_precede_input() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_prince(
            dir.path(),
            "#!/bin/sh\necho \"$1 $2\"\ncp \"$3\" \"$5\"\n",
        );
        let output = dir.path().join("book.pdf");
        let artifact = PrinceCompositor::new(&output)
            .program(program)
            .base_dir(dir.path())
            .arg("--media=print")
            .arg("--no-network")
            .compose("<p>hallo</p>")
            .unwrap();

        assert!(artifact.log.contains("--media=print --no-network"));
        assert_eq!(fs::read_to_string(&output).unwrap(), "<p>hallo</p>");
    }

    #[test]
    fn test_failure_propagates_log_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_prince(
            dir.path(),
            "#!/bin/sh\necho \"error: unknown property\"\necho \"line 2\" >&2\nexit 3\n",
        );
        let err = PrinceCompositor::new(dir.path().join("out.pdf"))
            .program(program)
            .compose("<p/>")
            .unwrap_err();

        match err {
            Error::Compositor { status, log } => {
                assert!(status.contains('3'), "status: {status}");
                assert!(log.contains("error: unknown property\n"));
                assert!(log.contains("line 2\n"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_timeout_kills_compositor() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_prince(dir.path(), "#!/bin/sh\necho started\nexec sleep 10\n");
        let started = Instant::now();
        let err = PrinceCompositor::new(dir.path().join("out.pdf"))
            .program(program)
            .timeout(Duration::from_millis(200))
            .compose("<p/>")
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(5));
        match err {
            Error::CompositorTimeout { log, .. } => assert!(log.contains("started")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PrinceCompositor::new(dir.path().join("out.pdf"))
            .program(dir.path().join("no-such-prince"))
            .compose("<p/>")
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
