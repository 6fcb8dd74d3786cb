mod config;
mod logging;
mod ui;

use std::process::ExitCode;

use config::AppConfig;
use fotolab_adapters::{
    presenters, BackgroundPreviewPipeline, ExifMetadataReader, ImageCrateDecoder,
    ImageCrateExporter, MockEditAnalyzer, SystemClock,
};
use fotolab_application::{
    ApplyEditsCommand, EditorService, ExportFormat, ExportImageCommand, OpenImageCommand,
    SuggestEditsCommand,
};
use fotolab_domain::{AdjustmentKind, EditInstruction};

fn main() -> ExitCode {
    logging::init_logging();
    let args: Vec<String> = std::env::args().collect();
    let config = AppConfig::default();

    let command = parse_command(&args);
    match run_command(command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            print_usage();
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_editor_service() -> EditorService {
    EditorService::new(
        Box::new(ImageCrateDecoder),
        Box::new(ExifMetadataReader),
        Box::new(MockEditAnalyzer),
        Box::new(BackgroundPreviewPipeline::new()),
        Box::new(ImageCrateExporter),
        Box::new(SystemClock),
    )
}

#[derive(Debug, Clone)]
enum Command {
    Ui {
        image: String,
    },
    Meta {
        image: String,
    },
    Analyze {
        image: String,
        prompt: String,
    },
    Export {
        image: String,
        edits: Vec<EditInstruction>,
        format: ExportFormat,
        output: Option<String>,
    },
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

fn parse_command(args: &[String]) -> Result<Command, CommandError> {
    if args.len() <= 1 {
        return Err(CommandError::Usage("missing command".to_string()));
    }

    match args[1].as_str() {
        "ui" => {
            let image = require_image(args)?;
            Ok(Command::Ui { image })
        }
        "meta" => {
            let image = require_image(args)?;
            Ok(Command::Meta { image })
        }
        "analyze" => {
            let image = require_image(args)?;
            Ok(Command::Analyze {
                image,
                prompt: args[3..].join(" "),
            })
        }
        "export" => parse_export(args),
        other => Err(CommandError::Usage(format!("unknown command: {other}"))),
    }
}

fn require_image(args: &[String]) -> Result<String, CommandError> {
    args.get(2)
        .cloned()
        .ok_or_else(|| CommandError::Usage("missing image path".to_string()))
}

fn parse_export(args: &[String]) -> Result<Command, CommandError> {
    let image = require_image(args)?;
    let mut edits = Vec::new();
    let mut format_name: Option<String> = None;
    let mut quality: Option<u8> = None;
    let mut output: Option<String> = None;

    let mut rest = args[3..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--set" => {
                let spec = rest
                    .next()
                    .ok_or_else(|| CommandError::Usage("--set needs kind=value".to_string()))?;
                edits.push(parse_edit_spec(spec)?);
            }
            "--format" => {
                let name = rest
                    .next()
                    .ok_or_else(|| CommandError::Usage("--format needs png|jpeg".to_string()))?;
                format_name = Some(name.clone());
            }
            "--quality" => {
                let value = rest
                    .next()
                    .ok_or_else(|| CommandError::Usage("--quality needs a number".to_string()))?;
                quality = Some(value.parse::<u8>().map_err(|_| {
                    CommandError::Usage(format!("invalid quality: {value}"))
                })?);
            }
            "--out" => {
                let path = rest
                    .next()
                    .ok_or_else(|| CommandError::Usage("--out needs a path".to_string()))?;
                output = Some(path.clone());
            }
            other => {
                return Err(CommandError::Usage(format!("unknown flag: {other}")));
            }
        }
    }

    let format = match format_name.as_deref() {
        None | Some("jpeg") | Some("jpg") => ExportFormat::Jpeg {
            quality: quality.unwrap_or(AppConfig::default().jpeg_quality),
        },
        Some("png") => {
            if quality.is_some() {
                return Err(CommandError::Usage(
                    "--quality only applies to jpeg".to_string(),
                ));
            }
            ExportFormat::Png
        }
        Some(other) => {
            return Err(CommandError::Usage(format!("unknown format: {other}")));
        }
    };

    Ok(Command::Export {
        image,
        edits,
        format,
        output,
    })
}

fn parse_edit_spec(spec: &str) -> Result<EditInstruction, CommandError> {
    let (kind_text, value_text) = spec
        .split_once('=')
        .ok_or_else(|| CommandError::Usage(format!("expected kind=value, got: {spec}")))?;
    let kind = AdjustmentKind::parse(kind_text)
        .ok_or_else(|| CommandError::Usage(format!("unknown adjustment: {kind_text}")))?;
    let value = value_text
        .parse::<f32>()
        .map_err(|_| CommandError::Usage(format!("invalid value: {value_text}")))?;
    EditInstruction::new(kind, value)
        .map_err(|error| CommandError::Usage(error.to_string()))
}

fn run_command(
    command: Result<Command, CommandError>,
    config: &AppConfig,
) -> Result<(), CommandError> {
    match command? {
        Command::Ui { image } => {
            let mut service = build_editor_service();
            ui::launch_window(&mut service, config, &image).map_err(CommandError::Runtime)
        }
        Command::Meta { image } => {
            let mut service = build_editor_service();
            let loaded = service
                .open_image(headless_open(image))
                .map_err(|error| CommandError::Runtime(format!("open failed: {error}")))?;
            println!("{}", presenters::present_loaded_image(&loaded));
            println!("{}", presenters::present_metadata(&loaded.metadata));
            Ok(())
        }
        Command::Analyze { image, prompt } => {
            let mut service = build_editor_service();
            service
                .open_image(headless_open(image))
                .map_err(|error| CommandError::Runtime(format!("open failed: {error}")))?;
            let report = service
                .suggest_edits(SuggestEditsCommand { prompt })
                .map_err(|error| CommandError::Runtime(format!("analysis failed: {error}")))?;
            println!("{}", presenters::present_analysis(&report));
            Ok(())
        }
        Command::Export {
            image,
            edits,
            format,
            output,
        } => {
            let mut service = build_editor_service();
            service
                .open_image(headless_open(image))
                .map_err(|error| CommandError::Runtime(format!("open failed: {error}")))?;
            if !edits.is_empty() {
                let values = service
                    .apply_edits(ApplyEditsCommand { edits })
                    .map_err(|error| CommandError::Runtime(format!("apply failed: {error}")))?;
                println!("applied: {}", presenters::present_slider_values(&values));
            }
            let artifact = service
                .export_image(ExportImageCommand {
                    format,
                    output_path: output,
                })
                .map_err(|error| CommandError::Runtime(format!("export failed: {error}")))?;
            println!("{}", presenters::present_export(&artifact));
            Ok(())
        }
    }
}

fn headless_open(image: String) -> OpenImageCommand {
    OpenImageCommand {
        path: image,
        preview_width: 0,
        preview_height: 0,
    }
}

fn print_usage() {
    println!("usage:");
    println!("  fotolab ui <image>");
    println!("  fotolab meta <image>");
    println!("  fotolab analyze <image> [prompt...]");
    println!("  fotolab export <image> [--set kind=value]... [--format png|jpeg] [--quality N] [--out PATH]");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        std::iter::once("fotolab")
            .chain(parts.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parse_ui_command() {
        let command = parse_command(&args(&["ui", "photo.jpg"])).expect("ui should parse");
        assert!(matches!(command, Command::Ui { .. }));
    }

    #[test]
    fn parse_rejects_missing_image() {
        let result = parse_command(&args(&["meta"]));
        assert!(matches!(result, Err(CommandError::Usage(_))));
    }

    #[test]
    fn parse_analyze_joins_the_prompt() {
        let command = parse_command(&args(&["analyze", "photo.jpg", "fix", "the", "shadows"]))
            .expect("analyze should parse");
        match command {
            Command::Analyze { prompt, .. } => assert_eq!(prompt, "fix the shadows"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_export_flags() {
        let command = parse_command(&args(&[
            "export",
            "photo.jpg",
            "--set",
            "brightness=20",
            "--set",
            "temperature=-15",
            "--format",
            "jpeg",
            "--quality",
            "80",
            "--out",
            "final.jpg",
        ]))
        .expect("export should parse");

        match command {
            Command::Export {
                edits,
                format,
                output,
                ..
            } => {
                assert_eq!(edits.len(), 2);
                assert_eq!(edits[0].kind, AdjustmentKind::Brightness);
                assert_eq!(edits[1].value, -15.0);
                assert_eq!(format, ExportFormat::Jpeg { quality: 80 });
                assert_eq!(output.as_deref(), Some("final.jpg"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_export_defaults_to_configured_jpeg_quality() {
        let command =
            parse_command(&args(&["export", "photo.jpg"])).expect("export should parse");
        match command {
            Command::Export { format, .. } => {
                assert_eq!(format, ExportFormat::Jpeg { quality: 92 });
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_export_rejects_quality_for_png() {
        let result = parse_command(&args(&[
            "export",
            "photo.jpg",
            "--format",
            "png",
            "--quality",
            "80",
        ]));
        assert!(matches!(result, Err(CommandError::Usage(_))));
    }

    #[test]
    fn parse_export_rejects_bad_edit_specs() {
        for spec in ["brightness", "tint=5", "brightness=high"] {
            let result = parse_command(&args(&["export", "photo.jpg", "--set", spec]));
            assert!(
                matches!(result, Err(CommandError::Usage(_))),
                "spec {spec} should be rejected"
            );
        }
    }

    #[test]
    fn parse_rejects_unknown_commands() {
        let result = parse_command(&args(&["import", "folder"]));
        assert!(matches!(result, Err(CommandError::Usage(_))));
    }
}
