use fotolab_application::{CaptureMetadata, ExportArtifact, ExportFormat, LoadedImage};
use fotolab_domain::{AnalysisReport, EditInstruction, SliderValues};

pub fn present_loaded_image(loaded: &LoadedImage) -> String {
    format!(
        "opened {} (kind={:?}, {}x{})",
        loaded.path, loaded.decoded.kind, loaded.decoded.width, loaded.decoded.height
    )
}

pub fn present_slider_values(values: &SliderValues) -> String {
    format!(
        "brightness={} contrast={} saturation={} temperature={}",
        values.brightness, values.contrast, values.saturation, values.temperature
    )
}

pub fn present_edit_list(edits: &[EditInstruction]) -> String {
    if edits.is_empty() {
        return "no edits".to_string();
    }
    edits
        .iter()
        .map(|edit| format!("{} {:+}", edit.kind.name(), edit.value))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn present_metadata(meta: &CaptureMetadata) -> String {
    if meta.is_empty() {
        return "no capture metadata".to_string();
    }

    let mut lines = Vec::new();
    let mut push = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{label}\t{value}"));
        }
    };

    push("make", meta.make.clone());
    push("model", meta.model.clone());
    push("lens", meta.lens_model.clone());
    push("captured", meta.date_time_original.clone());
    push("modified", meta.modify_date.clone());
    push(
        "dimensions",
        match (meta.width, meta.height) {
            (Some(width), Some(height)) => Some(format!("{width}x{height}")),
            _ => None,
        },
    );
    push("orientation", meta.orientation.map(|o| o.to_string()));
    push("iso", meta.iso.map(|iso| iso.to_string()));
    push("exposure", meta.exposure_time.clone());
    push("aperture", meta.f_number.map(|f| format!("f/{f}")));
    push("focal length", meta.focal_length_mm.map(|mm| format!("{mm}mm")));
    push(
        "gps",
        match (meta.gps_latitude, meta.gps_longitude) {
            (Some(lat), Some(lon)) => Some(format!("{lat:.5}, {lon:.5}")),
            _ => None,
        },
    );

    lines.join("\n")
}

pub fn present_analysis(report: &AnalysisReport) -> String {
    format!(
        "{}\nsuggested: {}",
        report.description,
        present_edit_list(&report.recommended_edits)
    )
}

pub fn present_export(artifact: &ExportArtifact) -> String {
    let format = match artifact.format {
        ExportFormat::Png => "png".to_string(),
        ExportFormat::Jpeg { quality } => format!("jpeg q{quality}"),
    };
    match &artifact.output_path {
        Some(path) => format!(
            "exported {} {}x{} ({} bytes) -> {}",
            format,
            artifact.width,
            artifact.height,
            artifact.bytes.len(),
            path
        ),
        None => format!(
            "exported {} {}x{} ({} bytes)",
            format,
            artifact.width,
            artifact.height,
            artifact.bytes.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fotolab_domain::AdjustmentKind;

    #[test]
    fn empty_metadata_presents_a_placeholder() {
        assert_eq!(
            present_metadata(&CaptureMetadata::default()),
            "no capture metadata"
        );
    }

    #[test]
    fn edit_list_is_comma_separated_with_signs() {
        let edits = [
            EditInstruction {
                kind: AdjustmentKind::Brightness,
                value: 20.0,
            },
            EditInstruction {
                kind: AdjustmentKind::Temperature,
                value: -15.0,
            },
        ];
        assert_eq!(present_edit_list(&edits), "brightness +20, temperature -15");
    }
}
