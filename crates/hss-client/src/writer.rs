//! Privileged payload write with retry on authentication failure.
//!
//! Writing a block device needs root. The copy runs as an elevated helper
//! process that reads the operator's password on stdin. A rejected password
//! is ordinary operator error and the whole step is retried with a fresh
//! prompt; any other failure leaves the board in an unknown state and ends
//! the run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use hss_core::error::{HssError, HssResult};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::operator::Operator;

/// Diagnostics from the elevation program that mean the password was wrong.
pub const AUTH_MARKERS: &[&str] = &["incorrect password", "no password"];

const PASSWORD_PROMPT: &str = "Enter your password (required to write to block device)";

/// An elevation password. Never logged; `Debug` is redacted.
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Raw result of one helper invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr: String,
}

/// Outcome of one write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAttempt {
    Succeeded,
    FailedAuth(String),
    FailedOther(String),
}

impl WriteAttempt {
    pub fn classify(output: &CopyOutput) -> Self {
        if output.success {
            return Self::Succeeded;
        }
        let diagnostic = output.stderr.trim().to_string();
        if AUTH_MARKERS.iter().any(|m| diagnostic.contains(m)) {
            Self::FailedAuth(diagnostic)
        } else {
            Self::FailedOther(diagnostic)
        }
    }
}

/// Copies a payload onto a block device with elevated privileges.
#[allow(async_fn_in_trait)]
pub trait ElevatedCopy {
    async fn copy(&self, payload: &Path, device: &Path, credential: &Credential) -> HssResult<CopyOutput>;
}

/// Runs `<elevate> -S <helper> [helper args] <payload> <device>`, feeding
/// the password on stdin (`sudo -S` style).
#[derive(Debug, Clone)]
pub struct SudoCopy {
    pub elevate: String,
    pub helper: PathBuf,
    pub helper_args: Vec<String>,
}

impl SudoCopy {
    pub fn new(elevate: impl Into<String>, helper: impl Into<PathBuf>) -> Self {
        Self {
            elevate: elevate.into(),
            helper: helper.into(),
            helper_args: Vec::new(),
        }
    }

    /// Arguments placed between the helper and the positional paths.
    pub fn with_helper_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.helper_args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl ElevatedCopy for SudoCopy {
    async fn copy(&self, payload: &Path, device: &Path, credential: &Credential) -> HssResult<CopyOutput> {
        debug!(elevate = %self.elevate, helper = %self.helper.display(), "spawning elevated copy");

        let mut child = Command::new(&self.elevate)
            .arg("-S")
            .arg(&self.helper)
            .args(&self.helper_args)
            .arg(payload)
            .arg(device)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HssError::Other(format!("cannot run {}: {e}", self.elevate)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // The helper may exit before reading (cached credentials).
            let _ = stdin.write_all(credential.expose().as_bytes()).await;
            let _ = stdin.write_all(b"\n").await;
        }

        let output = child.wait_with_output().await?;
        Ok(CopyOutput {
            success: output.status.success(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Write `payload` to `device`, prompting for the password until it is
/// accepted. Returns the number of attempts made.
pub async fn write_payload<C, O>(copier: &C, operator: &mut O, payload: &Path, device: &Path) -> HssResult<u32>
where
    C: ElevatedCopy,
    O: Operator + ?Sized,
{
    let mut attempts = 0u32;
    loop {
        let credential = Credential::new(operator.secret(PASSWORD_PROMPT)?);
        attempts += 1;

        let output = copier.copy(payload, device, &credential).await?;
        drop(credential);

        match WriteAttempt::classify(&output) {
            WriteAttempt::Succeeded => {
                info!(device = %device.display(), attempts, "payload written");
                return Ok(attempts);
            }
            WriteAttempt::FailedAuth(diagnostic) => {
                warn!(attempts, "elevation rejected the password");
                operator.say(&format!("{diagnostic}\n..."));
            }
            WriteAttempt::FailedOther(diagnostic) => {
                return Err(HssError::WriteFailed { diagnostic });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::scripted::ScriptedOperator;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct FakeCopy {
        outcomes: RefCell<VecDeque<CopyOutput>>,
        seen: RefCell<Vec<String>>,
    }

    impl FakeCopy {
        fn new(outcomes: Vec<CopyOutput>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ElevatedCopy for FakeCopy {
        async fn copy(&self, _payload: &Path, _device: &Path, credential: &Credential) -> HssResult<CopyOutput> {
            self.seen.borrow_mut().push(credential.expose().to_string());
            Ok(self.outcomes.borrow_mut().pop_front().expect("unexpected copy"))
        }
    }

    fn ok() -> CopyOutput {
        CopyOutput {
            success: true,
            code: Some(0),
            stderr: String::new(),
        }
    }

    fn failed(stderr: &str) -> CopyOutput {
        CopyOutput {
            success: false,
            code: Some(1),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn classifies_auth_markers() {
        assert_eq!(WriteAttempt::classify(&ok()), WriteAttempt::Succeeded);
        assert!(matches!(
            WriteAttempt::classify(&failed("Sorry, try again.\nsudo: 1 incorrect password attempt\n")),
            WriteAttempt::FailedAuth(_)
        ));
        assert!(matches!(
            WriteAttempt::classify(&failed("sudo: no password was provided\n")),
            WriteAttempt::FailedAuth(_)
        ));
        assert_eq!(
            WriteAttempt::classify(&failed("Permission denied\n")),
            WriteAttempt::FailedOther("Permission denied".into())
        );
    }

    #[test]
    fn credential_debug_is_redacted() {
        assert_eq!(format!("{:?}", Credential::new("hunter2")), "Credential(***)");
    }

    #[tokio::test]
    async fn retries_after_auth_failures() {
        let copier = FakeCopy::new(vec![
            failed("sudo: 1 incorrect password attempt"),
            failed("sudo: no password was provided"),
            ok(),
        ]);
        let mut operator = ScriptedOperator::default().with_secrets(["a", "b", "c"]);

        let attempts = write_payload(&copier, &mut operator, Path::new("out.bin"), Path::new("/dev/sdb"))
            .await
            .unwrap();

        assert_eq!(attempts, 3);
        assert_eq!(operator.secret_prompts, 3);
        assert_eq!(*copier.seen.borrow(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn other_failure_is_fatal_after_one_attempt() {
        let copier = FakeCopy::new(vec![failed("write error: No space left on device"), ok()]);
        let mut operator = ScriptedOperator::default().with_secrets(["a", "b"]);

        let err = write_payload(&copier, &mut operator, Path::new("out.bin"), Path::new("/dev/sdb"))
            .await
            .unwrap_err();

        match err {
            HssError::WriteFailed { diagnostic } => {
                assert_eq!(diagnostic, "write error: No space left on device")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(copier.seen.borrow().len(), 1);
        assert_eq!(operator.secret_prompts, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn sudo_copy_passes_paths_and_password() {
        use std::os::unix::fs::PermissionsExt;

        // Stand-in for `sudo`: checks the password and runs the helper.
        let dir = tempfile::tempdir().unwrap();
        let elevate = dir.path().join("fake-sudo");
        std::fs::write(
            &elevate,
            "#!/bin/sh\n[ \"$1\" = \"-S\" ] || exit 9\nshift\nread pw\n\
             if [ \"$pw\" != \"secret\" ]; then echo 'sudo: 1 incorrect password attempt' >&2; exit 1; fi\n\
             exec \"$@\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&elevate, std::fs::Permissions::from_mode(0o755)).unwrap();

        let payload = dir.path().join("payload.bin");
        let device = dir.path().join("device.img");
        std::fs::write(&payload, b"payload bytes").unwrap();

        let copier = SudoCopy::new(elevate.to_string_lossy(), "cp");

        let rejected = copier
            .copy(&payload, &device, &Credential::new("wrong"))
            .await
            .unwrap();
        assert!(matches!(WriteAttempt::classify(&rejected), WriteAttempt::FailedAuth(_)));

        let accepted = copier
            .copy(&payload, &device, &Credential::new("secret"))
            .await
            .unwrap();
        assert_eq!(WriteAttempt::classify(&accepted), WriteAttempt::Succeeded);
        assert_eq!(std::fs::read(&device).unwrap(), b"payload bytes");
    }
}
