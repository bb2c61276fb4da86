use image::DynamicImage;

use crate::error::EngineError;
use crate::vision::command::ExternalCommand;
use crate::vision::{Captioner, ObjectDetector, SpeechEngine, TextReader};

/// Detector that prints one class label per line for each detection.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    command: ExternalCommand,
}

impl CommandDetector {
    pub fn new(command: ExternalCommand) -> Self {
        CommandDetector { command }
    }
}

impl ObjectDetector for CommandDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<String>, EngineError> {
        let stdout = self.command.run_on_image(image)?;
        Ok(parse_labels(&stdout))
    }
}

fn parse_labels(stdout: &str) -> Vec<String> {
    stdout.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Captioner whose stdout is the caption.
#[derive(Debug, Clone)]
pub struct CommandCaptioner {
    command: ExternalCommand,
}

impl CommandCaptioner {
    pub fn new(command: ExternalCommand) -> Self {
        CommandCaptioner { command }
    }
}

impl Captioner for CommandCaptioner {
    fn caption(&self, image: &DynamicImage) -> Result<String, EngineError> {
        Ok(self.command.run_on_image(image)?.trim().to_owned())
    }
}

/// OCR engine whose stdout is the recognized text. The image is converted to
/// grayscale before it is handed over.
#[derive(Debug, Clone)]
pub struct CommandTextReader {
    command: ExternalCommand,
}

impl CommandTextReader {
    pub fn new(command: ExternalCommand) -> Self {
        CommandTextReader { command }
    }
}

impl TextReader for CommandTextReader {
    fn read_text(&self, image: &DynamicImage) -> Result<String, EngineError> {
        let gray = DynamicImage::ImageLuma8(image.to_luma8());
        Ok(self.command.run_on_image(&gray)?.trim().to_owned())
    }
}

/// Text-to-speech through a command such as `espeak-ng -s 150 --stdin`.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    command: ExternalCommand,
}

impl CommandSpeech {
    pub fn new(command: ExternalCommand) -> Self {
        CommandSpeech { command }
    }
}

impl SpeechEngine for CommandSpeech {
    fn speak(&self, text: &str) -> Result<(), EngineError> {
        self.command.run_with_text(text).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_one_per_line() {
        let labels = parse_labels("person\n  dog \n\nperson\r\n");
        assert_eq!(labels, vec!["person", "dog", "person"]);
        assert!(parse_labels("").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn command_engines_read_stdout() {
        let image = DynamicImage::new_rgb8(4, 4);

        let detector = CommandDetector::new(ExternalCommand::new(
            "sh",
            vec!["-c".into(), "printf 'cup\\nbook\\n'".into(), "{image}".into()],
        ));
        assert_eq!(detector.detect(&image).unwrap(), vec!["cup", "book"]);

        let captioner = CommandCaptioner::new(ExternalCommand::new(
            "sh",
            vec!["-c".into(), "echo '  a desk with a cup  '".into(), "{image}".into()],
        ));
        assert_eq!(captioner.caption(&image).unwrap(), "a desk with a cup");

        let speech = CommandSpeech::new(ExternalCommand::parse("true").unwrap());
        assert!(speech.speak("hello").is_ok());
    }
}
