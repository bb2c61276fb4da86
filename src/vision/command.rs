use std::io::{ErrorKind, Write};
use std::process::{Command, Output, Stdio};

use image::{DynamicImage, ImageOutputFormat};
use log::debug;

use crate::error::EngineError;

/// Replaced by the path of a temporary PNG of the image.
pub const IMAGE_PLACEHOLDER: &str = "{image}";
/// Replaced by the text to speak. Commands without it get the text on stdin.
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// A program plus argument template, e.g. `tesseract {image} stdout`.
///
/// The command is run directly (no shell). An image path is appended when no
/// argument contains `{image}`; text goes to stdin when none contains `{text}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        ExternalCommand { program: program.into(), args }
    }

    /// Splits a command line on whitespace. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<ExternalCommand> {
        let mut parts = line.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(ExternalCommand { program, args: parts.collect() })
    }

    /// Argument list with `placeholder` substituted by `value`.
    pub fn arguments_with(&self, placeholder: &str, value: &str) -> Vec<String> {
        if self.args.iter().any(|a| a.contains(placeholder)) {
            self.args.iter().map(|a| a.replace(placeholder, value)).collect()
        } else {
            let mut args = self.args.clone();
            args.push(value.to_owned());
            args
        }
    }

    /// Runs the program and returns its stdout. A non-zero exit is an error
    /// carrying the trimmed stderr.
    pub fn run(&self, args: &[String]) -> Result<String, EngineError> {
        debug!("running {} {:?}", self.program, args);
        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| self.spawn_error(source))?;
        self.finish(output)
    }

    /// Runs the program with `input` written to its stdin and returns stdout.
    pub fn run_with_stdin(&self, input: &[u8]) -> Result<String, EngineError> {
        debug!("running {} {:?} with {} bytes on stdin", self.program, self.args, input.len());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input) {
                // The program may exit without reading; its status decides.
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(EngineError::Staging(e.to_string())),
                _ => {}
            }
        }
        let output = child.wait_with_output().map_err(|source| self.spawn_error(source))?;
        self.finish(output)
    }

    fn spawn_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Spawn { program: self.program.clone(), source }
    }

    fn finish(&self, output: Output) -> Result<String, EngineError> {
        if !output.status.success() {
            return Err(EngineError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| EngineError::InvalidOutput)
    }

    /// Writes `image` to a temporary PNG, runs the command on it and returns stdout.
    /// The temporary file is removed when the call returns.
    pub fn run_on_image(&self, image: &DynamicImage) -> Result<String, EngineError> {
        let mut staged = tempfile::Builder::new()
            .prefix("sightline-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| EngineError::Staging(e.to_string()))?;
        image.write_to(staged.as_file_mut(), ImageOutputFormat::Png)
            .map_err(|e| EngineError::Staging(e.to_string()))?;
        staged.as_file_mut().flush().map_err(|e| EngineError::Staging(e.to_string()))?;

        let path = staged.path().to_string_lossy().into_owned();
        self.run(&self.arguments_with(IMAGE_PLACEHOLDER, &path))
    }

    /// Hands `text` to the command. Without a `{text}` argument the text goes
    /// to stdin, so client text can never be read as an option.
    pub fn run_with_text(&self, text: &str) -> Result<String, EngineError> {
        if self.args.iter().any(|a| a.contains(TEXT_PLACEHOLDER)) {
            self.run(&self.arguments_with(TEXT_PLACEHOLDER, text))
        } else {
            self.run_with_stdin(text.as_bytes())
        }
    }
}

impl std::fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_program_and_args() {
        let cmd = ExternalCommand::parse("  tesseract {image}   stdout ").unwrap();
        assert_eq!(cmd.program, "tesseract");
        assert_eq!(cmd.args, vec!["{image}", "stdout"]);
        assert_eq!(cmd.to_string(), "tesseract {image} stdout");
        assert!(ExternalCommand::parse("   ").is_none());
    }

    #[test]
    fn placeholder_is_substituted_or_appended() {
        let cmd = ExternalCommand::parse("say {text}").unwrap();
        assert_eq!(cmd.arguments_with(TEXT_PLACEHOLDER, "hi there"), vec!["hi there"]);

        let cmd = ExternalCommand::parse("detect --input={image} --json").unwrap();
        assert_eq!(cmd.arguments_with(IMAGE_PLACEHOLDER, "/tmp/x.png"), vec!["--input=/tmp/x.png", "--json"]);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let cmd = ExternalCommand::parse("sightline-no-such-program-xyz").unwrap();
        assert!(matches!(cmd.run(&[]), Err(EngineError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_and_reports_failures() {
        let echo = ExternalCommand::parse("echo said: {text}").unwrap();
        assert_eq!(echo.run_with_text("hello").unwrap(), "said: hello\n");

        let fail = ExternalCommand::new("sh", vec!["-c".into(), "echo oops >&2; exit 3".into()]);
        match fail.run(&[]) {
            Err(EngineError::Failed { stderr, .. }) => assert_eq!(stderr, "oops"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn text_without_placeholder_goes_to_stdin_not_argv() {
        let cat = ExternalCommand::parse("cat").unwrap();
        assert_eq!(cat.run_with_text("-w/tmp/clobbered").unwrap(), "-w/tmp/clobbered");

        // `sh -c` sees no extra positional argument; the text only arrives on stdin.
        let args = ExternalCommand::new("sh", vec!["-c".into(), "echo \"args=$#\"; cat".into()]);
        assert_eq!(args.run_with_text("--help").unwrap(), "args=0\n--help");
    }

    #[cfg(unix)]
    #[test]
    fn program_that_ignores_stdin_still_succeeds() {
        let t = ExternalCommand::parse("true").unwrap();
        assert_eq!(t.run_with_text(&"x".repeat(1 << 20)).unwrap(), "");
    }

    #[cfg(unix)]
    #[test]
    fn image_is_staged_as_a_png_file() {
        let image = DynamicImage::new_rgb8(8, 8);
        let check = ExternalCommand::new(
            "sh",
            vec!["-c".into(), "head -c 4 \"$0\" | tail -c 3".into(), IMAGE_PLACEHOLDER.into()],
        );
        assert_eq!(check.run_on_image(&image).unwrap(), "PNG");
    }
}
