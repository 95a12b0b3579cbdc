//! External-process engines.
//!
//! Each engine is a command-line converter. The HTML is written to a
//! temporary `.html` file (so relative asset references resolve against a
//! real path) and the PDF is read back from stdout.

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info};

use super::{EngineError, EngineKind, PdfEngine};

/// Page geometry used by wkhtmltopdf. WeasyPrint takes its geometry from
/// the document's own CSS.
const PAGE_SIZE: &str = "Letter";
const PAGE_MARGIN: &str = "0.75in";

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ProcessEngine {
    kind: EngineKind,
    bin: String,
    timeout: Duration,
}

impl ProcessEngine {
    pub fn new(kind: EngineKind, bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            kind,
            bin: bin.into(),
            timeout,
        }
    }

    /// Command-line arguments converting `input` and writing the PDF to stdout.
    fn args(&self, input: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = match self.kind {
            EngineKind::WeasyPrint => vec!["--encoding".into(), "utf-8".into()],
            EngineKind::Wkhtmltopdf => {
                let mut args: Vec<OsString> =
                    vec!["--quiet".into(), "--page-size".into(), PAGE_SIZE.into()];
                for side in ["top", "right", "bottom", "left"] {
                    args.push(format!("--margin-{side}").into());
                    args.push(PAGE_MARGIN.into());
                }
                args.extend(
                    ["--encoding", "UTF-8", "--enable-local-file-access"].map(OsString::from),
                );
                args
            }
        };
        args.push(input.as_os_str().to_owned());
        args.push("-".into());
        args
    }

    fn io_error(&self, source: std::io::Error) -> EngineError {
        if source.kind() == std::io::ErrorKind::NotFound {
            EngineError::NotFound {
                engine: self.kind.id(),
                bin: self.bin.clone(),
            }
        } else {
            EngineError::Io {
                engine: self.kind.id(),
                source,
            }
        }
    }
}

#[async_trait]
impl PdfEngine for ProcessEngine {
    fn id(&self) -> &'static str {
        self.kind.id()
    }

    async fn render(&self, html: &str) -> Result<Vec<u8>, EngineError> {
        let input = write_input(html.to_owned())
            .await
            .map_err(|e| self.io_error(e))?;

        let args = self.args(input.path());
        debug!("Running {} {:?}", self.bin, args);

        let child = Command::new(&self.bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.io_error(e))?;

        // Dropping the timed-out future drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| EngineError::Timeout {
                engine: self.kind.id(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| self.io_error(e))?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                engine: self.kind.id(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

/// Writes `html` to a fresh temporary `.html` file on the blocking pool.
/// The file is removed when the returned handle is dropped.
async fn write_input(html: String) -> std::io::Result<NamedTempFile> {
    tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(".html")
            .tempfile()?;
        file.write_all(html.as_bytes())?;
        file.flush()?;
        Ok(file)
    })
    .await
    .map_err(std::io::Error::other)?
}

/// Runs `<bin> --version` and reports whether it exited successfully.
/// Called once per engine at startup.
pub async fn probe_available(kind: EngineKind, bin: &str) -> bool {
    let mut command = Command::new(bin);
    command
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let available = matches!(
        tokio::time::timeout(PROBE_TIMEOUT, command.status()).await,
        Ok(Ok(s)) if s.success()
    );
    info!("{} available: {available} ({bin})", kind.id());
    available
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(kind: EngineKind) -> Vec<String> {
        ProcessEngine::new(kind, "bin", Duration::from_secs(1))
            .args(Path::new("/tmp/in.html"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_wkhtmltopdf_uses_letter_with_three_quarter_inch_margins() {
        let args = args_of(EngineKind::Wkhtmltopdf);
        let joined = args.join(" ");
        assert!(joined.contains("--page-size Letter"));
        for side in ["top", "right", "bottom", "left"] {
            assert!(joined.contains(&format!("--margin-{side} 0.75in")));
        }
        assert!(joined.contains("--encoding UTF-8"));
        assert!(args.contains(&"--enable-local-file-access".to_string()));
    }

    #[test]
    fn test_both_engines_read_file_and_write_stdout() {
        for kind in EngineKind::ALL {
            let args = args_of(kind);
            let n = args.len();
            assert_eq!(args[n - 2], "/tmp/in.html");
            assert_eq!(args[n - 1], "-");
        }
    }

    #[tokio::test]
    async fn test_input_file_holds_html_and_is_removed_on_drop() {
        let html = "<html><body>Jane \u{e9}</body></html>";
        let file = write_input(html.to_string()).await.unwrap();
        let path = file.path().to_path_buf();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("html"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), html);

        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_found_error() {
        let engine = ProcessEngine::new(
            EngineKind::WeasyPrint,
            "definitely-not-a-real-binary-4f1c",
            Duration::from_secs(5),
        );
        let err = engine.render("<html></html>").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { engine: "weasyprint", .. }));
    }

    #[tokio::test]
    async fn test_probe_of_missing_binary_is_unavailable() {
        assert!(!probe_available(EngineKind::Wkhtmltopdf, "definitely-not-a-real-binary-4f1c").await);
    }
}
