//! Mock AI boundary.
//!
//! The analyzer contract is real, the answers are canned: fixtures are kept
//! as JSON and deserialized through the domain serde model, so the wire
//! shape a future remote backend must produce stays pinned by these tests.

use std::path::Path;

use fotolab_application::{ApplicationError, EditAnalyzer};
use fotolab_domain::{AnalysisReport, EditInstruction};

const ANALYSIS_FIXTURE: &str = r#"{
  "description": "Mock analysis - image appears underexposed & low-contrast.",
  "recommended_edits": [
    { "kind": "brightness", "value": 20.0 },
    { "kind": "contrast", "value": 10.0 }
  ]
}"#;

const PROMPT_FIXTURE: &str = r#"[
  { "kind": "temperature", "value": 15.0 },
  { "kind": "saturation", "value": 20.0 }
]"#;

#[derive(Debug, Default)]
pub struct MockEditAnalyzer;

impl EditAnalyzer for MockEditAnalyzer {
    fn analyze_image(
        &self,
        image_path: &Path,
        _prompt: &str,
    ) -> Result<AnalysisReport, ApplicationError> {
        if image_path.as_os_str().is_empty() {
            return Err(ApplicationError::Analysis(
                "image path must not be empty".to_string(),
            ));
        }
        serde_json::from_str(ANALYSIS_FIXTURE)
            .map_err(|error| ApplicationError::Analysis(error.to_string()))
    }

    fn edits_from_prompt(&self, prompt: &str) -> Result<Vec<EditInstruction>, ApplicationError> {
        if prompt.trim().is_empty() {
            return Err(ApplicationError::Analysis(
                "prompt must not be empty".to_string(),
            ));
        }
        serde_json::from_str(PROMPT_FIXTURE)
            .map_err(|error| ApplicationError::Analysis(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use fotolab_domain::AdjustmentKind;

    use super::*;

    #[test]
    fn analysis_fixture_suggests_brightness_and_contrast() {
        let report = MockEditAnalyzer
            .analyze_image(Path::new("sample.jpg"), "why so dark")
            .expect("mock analysis should parse");

        assert!(report.description.contains("underexposed"));
        assert_eq!(report.recommended_edits.len(), 2);
        assert_eq!(report.recommended_edits[0].kind, AdjustmentKind::Brightness);
        assert_eq!(report.recommended_edits[0].value, 20.0);
        assert_eq!(report.recommended_edits[1].kind, AdjustmentKind::Contrast);
        assert_eq!(report.recommended_edits[1].value, 10.0);
    }

    #[test]
    fn prompt_fixture_suggests_temperature_and_saturation() {
        let edits = MockEditAnalyzer
            .edits_from_prompt("warm this up a little")
            .expect("mock translation should parse");

        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0].kind, AdjustmentKind::Temperature);
        assert_eq!(edits[0].value, 15.0);
        assert_eq!(edits[1].kind, AdjustmentKind::Saturation);
        assert_eq!(edits[1].value, 20.0);
    }

    #[test]
    fn blank_prompt_is_an_analysis_error() {
        let result = MockEditAnalyzer.edits_from_prompt("   ");
        assert!(matches!(result, Err(ApplicationError::Analysis(_))));
    }
}
