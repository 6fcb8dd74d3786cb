use std::time::{Duration, SystemTime, UNIX_EPOCH};

use font8x8::UnicodeFonts;
use image::io::Reader as ImageReader;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use fotolab_application::{
    ApplyEditsCommand, EditorService, ExportFormat, ExportImageCommand, OpenImageCommand,
    PollPreviewCommand, PreviewMetricsQuery, RedoCommand, SuggestEditsCommand, UndoCommand,
};
use fotolab_domain::{AdjustmentKind, EditInstruction, PreviewFrame, SliderValues};

use crate::config::AppConfig;

const SLIDER_MIN: f32 = -100.0;
const SLIDER_MAX: f32 = 100.0;
const CANVAS_MARGIN: usize = 20;
const HEADER_HEIGHT: usize = 44;
const WORKAREA_TOP: usize = 76;
const WORKAREA_BOTTOM_MARGIN: usize = 26;
const SPLIT_GUTTER: usize = 20;
const CONTROL_PANEL_WIDTH: usize = 280;
const CONTROL_INSET: usize = 16;
const SLIDER_HEIGHT: usize = 48;
const SLIDER_GAP: usize = 16;

// Dark theme
const COLOR_BACKDROP: u32 = 0x1C1D21;
const COLOR_PANEL: u32 = 0x26282E;
const COLOR_PANEL_EDGE: u32 = 0x3A3D46;
const COLOR_STAGE: u32 = 0x101114;
const COLOR_TEXT: u32 = 0xD8DAE0;
const COLOR_TEXT_DIM: u32 = 0x8A8E99;
const COLOR_TRACK: u32 = 0x3F434E;

#[derive(Debug, Clone, Copy)]
struct SliderSpec {
    kind: AdjustmentKind,
    top: usize,
    color: u32,
}

#[derive(Debug, Clone, Copy)]
struct SliderDrag {
    kind: AdjustmentKind,
    start_value: f32,
    live_value: f32,
}

#[derive(Debug, Clone)]
struct PreviewCanvas {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

pub fn launch_window(
    service: &mut EditorService,
    config: &AppConfig,
    image_path: &str,
) -> Result<(), String> {
    let width = config.window_width;
    let height = config.window_height;
    let sliders = slider_specs();
    let (stage_width, stage_height) = stage_size(width, height);

    let loaded = service
        .open_image(OpenImageCommand {
            path: image_path.to_string(),
            preview_width: stage_width as u32,
            preview_height: stage_height as u32,
        })
        .map_err(|error| format!("failed to open {image_path}: {error}"))?;

    let mut window = Window::new(
        &format!("fotolab | {image_path}"),
        width,
        height,
        WindowOptions::default(),
    )
    .map_err(|error| format!("failed to start UI window: {error}"))?;
    window.limit_update_rate(Some(Duration::from_micros(16_000)));

    let mut buffer = vec![COLOR_BACKDROP; width * height];
    let mut canvas = load_preview_canvas(image_path, stage_width, stage_height);
    let mut latest_frame: Option<PreviewFrame> = None;
    let mut drag: Option<SliderDrag> = None;
    let mut was_mouse_down = false;
    let mut status = format!(
        "opened {}x{} | drag sliders, ctrl+z undo, ctrl+y redo, a = ai suggest, e = export",
        loaded.decoded.width, loaded.decoded.height
    );

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let ctrl = window.is_key_down(Key::LeftCtrl) || window.is_key_down(Key::RightCtrl);

        if ctrl && window.is_key_pressed(Key::Z, KeyRepeat::No) {
            status = match service.undo(UndoCommand) {
                Ok(true) => "undo".to_string(),
                Ok(false) => "nothing to undo".to_string(),
                Err(error) => format!("undo failed: {error}"),
            };
        }
        if ctrl && window.is_key_pressed(Key::Y, KeyRepeat::No) {
            status = match service.redo(RedoCommand) {
                Ok(true) => "redo".to_string(),
                Ok(false) => "nothing to redo".to_string(),
                Err(error) => format!("redo failed: {error}"),
            };
        }
        if window.is_key_pressed(Key::A, KeyRepeat::No) {
            status = apply_suggestion(service);
        }
        if window.is_key_pressed(Key::E, KeyRepeat::No) {
            status = export_current(service, config);
        }

        let mouse_down = window.get_mouse_down(MouseButton::Left);
        let mouse_pos = window.get_mouse_pos(MouseMode::Clamp);
        let hovered =
            mouse_pos.and_then(|(x, y)| slider_at_position(x, y, &sliders, width));

        if mouse_down {
            if let Some((mouse_x, _)) = mouse_pos {
                if !was_mouse_down {
                    drag = hovered.map(|kind| SliderDrag {
                        kind,
                        start_value: service.slider_values().get(kind),
                        live_value: service.slider_values().get(kind),
                    });
                }
                if let Some(active) = drag.as_mut() {
                    let value = x_to_value(mouse_x, width);
                    if (active.live_value - value).abs() > f32::EPSILON {
                        active.live_value = value;
                        let mut transient = service.slider_values();
                        transient.set(active.kind, value);
                        if let Err(error) = service.preview_transient(&transient) {
                            status = format!("preview failed: {error}");
                        }
                    }
                }
            }
        } else {
            if let Some(finished) = drag.take() {
                if let Some(value) = commit_value(finished.start_value, finished.live_value) {
                    match service.apply_edits(ApplyEditsCommand {
                        edits: vec![EditInstruction {
                            kind: finished.kind,
                            value,
                        }],
                    }) {
                        Ok(_) => {
                            status = format!("{} -> {:+.0}", finished.kind.name(), value);
                        }
                        Err(error) => status = format!("apply failed: {error}"),
                    }
                }
            }
        }
        was_mouse_down = mouse_down;

        if let Some(frame) = service
            .poll_preview(PollPreviewCommand)
            .map_err(|error| format!("preview poll failed: {error}"))?
        {
            canvas = Some(scale_frame(&frame, stage_width, stage_height));
            latest_frame = Some(frame);
        }

        let shown_values = displayed_values(service.slider_values(), drag);
        draw_background(&mut buffer, width, height);
        draw_header(&mut buffer, width, image_path);
        draw_preview_panel(&mut buffer, width, height, &canvas);
        draw_control_panel(&mut buffer, width, height);
        draw_sliders(&mut buffer, width, &sliders, shown_values, drag.map(|d| d.kind).or(hovered));
        draw_status(
            &mut buffer,
            width,
            height,
            service,
            latest_frame.as_ref(),
            &status,
        )?;

        window
            .update_with_buffer(&buffer, width, height)
            .map_err(|error| format!("failed to update UI window: {error}"))?;
    }

    Ok(())
}

fn apply_suggestion(service: &mut EditorService) -> String {
    let report = match service.suggest_edits(SuggestEditsCommand {
        prompt: String::new(),
    }) {
        Ok(report) => report,
        Err(error) => return format!("analysis failed: {error}"),
    };
    match service.apply_edits(ApplyEditsCommand {
        edits: report.recommended_edits.clone(),
    }) {
        Ok(_) => format!("applied suggestion: {}", report.description),
        Err(error) => format!("suggestion apply failed: {error}"),
    }
}

fn export_current(service: &EditorService, config: &AppConfig) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or_default();
    let output_path = format!("{}/edited-{timestamp}.jpg", config.export_dir);

    match service.export_image(ExportImageCommand {
        format: ExportFormat::Jpeg {
            quality: config.jpeg_quality,
        },
        output_path: Some(output_path),
    }) {
        Ok(artifact) => format!(
            "exported {} ({} bytes)",
            artifact.output_path.unwrap_or_default(),
            artifact.bytes.len()
        ),
        Err(error) => format!("export failed: {error}"),
    }
}

/// During a drag the dragged slider shows its live value; everything else
/// shows the committed state.
fn displayed_values(committed: SliderValues, drag: Option<SliderDrag>) -> SliderValues {
    let mut values = committed;
    if let Some(active) = drag {
        values.set(active.kind, active.live_value);
    }
    values
}

/// `None` when the drag ended where it started (no history entry).
fn commit_value(start_value: f32, live_value: f32) -> Option<f32> {
    if (start_value - live_value).abs() < 0.5 {
        None
    } else {
        Some(live_value.round())
    }
}

fn load_preview_canvas(
    image_path: &str,
    stage_width: usize,
    stage_height: usize,
) -> Option<PreviewCanvas> {
    let image = ImageReader::open(image_path)
        .ok()?
        .with_guessed_format()
        .ok()?
        .decode()
        .ok()?;
    let source = image.to_rgb8();
    let src_width = source.width() as usize;
    let src_height = source.height() as usize;
    if src_width == 0 || src_height == 0 {
        return None;
    }

    let (dst_width, dst_height) = fit_within(src_width, src_height, stage_width, stage_height);
    let mut pixels = vec![0_u32; dst_width * dst_height];
    for y in 0..dst_height {
        let src_y = y * src_height / dst_height;
        for x in 0..dst_width {
            let src_x = x * src_width / dst_width;
            let [r, g, b] = source.get_pixel(src_x as u32, src_y as u32).0;
            pixels[y * dst_width + x] = ((r as u32) << 16) | ((g as u32) << 8) | (b as u32);
        }
    }

    Some(PreviewCanvas {
        width: dst_width,
        height: dst_height,
        pixels,
    })
}

fn scale_frame(frame: &PreviewFrame, stage_width: usize, stage_height: usize) -> PreviewCanvas {
    let src_width = frame.width as usize;
    let src_height = frame.height as usize;
    if src_width == 0 || src_height == 0 || frame.pixels.is_empty() {
        return PreviewCanvas {
            width: 1,
            height: 1,
            pixels: vec![0],
        };
    }

    let (dst_width, dst_height) = fit_within(src_width, src_height, stage_width, stage_height);
    let mut pixels = vec![0_u32; dst_width * dst_height];
    for y in 0..dst_height {
        let src_y = y * src_height / dst_height;
        for x in 0..dst_width {
            let src_x = x * src_width / dst_width;
            pixels[y * dst_width + x] = frame.pixels[src_y * src_width + src_x];
        }
    }

    PreviewCanvas {
        width: dst_width,
        height: dst_height,
        pixels,
    }
}

fn fit_within(
    src_width: usize,
    src_height: usize,
    max_width: usize,
    max_height: usize,
) -> (usize, usize) {
    let scale = (max_width as f32 / src_width as f32)
        .min(max_height as f32 / src_height as f32)
        .min(1.0);
    let width = ((src_width as f32 * scale).max(1.0)).round() as usize;
    let height = ((src_height as f32 * scale).max(1.0)).round() as usize;
    (width, height)
}

fn slider_specs() -> [SliderSpec; 4] {
    let start = WORKAREA_TOP + 56;
    let stride = SLIDER_HEIGHT + SLIDER_GAP;
    [
        SliderSpec {
            kind: AdjustmentKind::Brightness,
            top: start,
            color: 0xF2C14E,
        },
        SliderSpec {
            kind: AdjustmentKind::Contrast,
            top: start + stride,
            color: 0x7FB685,
        },
        SliderSpec {
            kind: AdjustmentKind::Saturation,
            top: start + stride * 2,
            color: 0xC77DFF,
        },
        SliderSpec {
            kind: AdjustmentKind::Temperature,
            top: start + stride * 3,
            color: 0xFF8552,
        },
    ]
}

fn draw_background(buffer: &mut [u32], width: usize, height: usize) {
    for value in buffer.iter_mut().take(width * height) {
        *value = COLOR_BACKDROP;
    }
}

fn draw_header(buffer: &mut [u32], width: usize, image_path: &str) {
    let left = CANVAS_MARGIN;
    let band_width = width.saturating_sub(CANVAS_MARGIN * 2);
    fill_rect(buffer, width, left, 16, band_width, HEADER_HEIGHT, COLOR_PANEL);
    draw_rect(buffer, width, left, 16, band_width, HEADER_HEIGHT, COLOR_PANEL_EDGE);
    draw_text(buffer, width, left + 14, 26, "FOTOLAB", COLOR_TEXT);
    draw_text(buffer, width, left + 14, 42, image_path, COLOR_TEXT_DIM);
}

fn draw_preview_panel(
    buffer: &mut [u32],
    width: usize,
    height: usize,
    canvas: &Option<PreviewCanvas>,
) {
    let left = preview_panel_left();
    let top = preview_panel_top();
    let right = preview_panel_right(width);
    let bottom = preview_panel_bottom(height);
    let panel_width = right.saturating_sub(left);
    let panel_height = bottom.saturating_sub(top);

    fill_rect(buffer, width, left, top, panel_width, panel_height, COLOR_STAGE);
    draw_rect(buffer, width, left, top, panel_width, panel_height, COLOR_PANEL_EDGE);

    let Some(canvas) = canvas else {
        draw_text(buffer, width, left + 12, top + 12, "NO PREVIEW", COLOR_TEXT_DIM);
        return;
    };

    let draw_width = canvas.width.min(panel_width.saturating_sub(2));
    let draw_height = canvas.height.min(panel_height.saturating_sub(2));
    let start_x = left + 1 + (panel_width.saturating_sub(2 + draw_width)) / 2;
    let start_y = top + 1 + (panel_height.saturating_sub(2 + draw_height)) / 2;
    for y in 0..draw_height {
        for x in 0..draw_width {
            let color = canvas.pixels[y * canvas.width + x];
            set_pixel(buffer, width, start_x + x, start_y + y, color);
        }
    }
}

fn draw_control_panel(buffer: &mut [u32], width: usize, height: usize) {
    let left = control_panel_left(width);
    let top = WORKAREA_TOP;
    let right = width.saturating_sub(CANVAS_MARGIN);
    let bottom = height.saturating_sub(WORKAREA_BOTTOM_MARGIN);
    fill_rect(
        buffer,
        width,
        left,
        top,
        right.saturating_sub(left),
        bottom.saturating_sub(top),
        COLOR_PANEL,
    );
    draw_rect(
        buffer,
        width,
        left,
        top,
        right.saturating_sub(left),
        bottom.saturating_sub(top),
        COLOR_PANEL_EDGE,
    );
    draw_text(buffer, width, left + CONTROL_INSET, top + 18, "ADJUSTMENTS", COLOR_TEXT);
}

fn draw_sliders(
    buffer: &mut [u32],
    width: usize,
    sliders: &[SliderSpec],
    values: SliderValues,
    focused: Option<AdjustmentKind>,
) {
    for slider in sliders {
        let value = values.get(slider.kind);
        let left = slider_left(width);
        let right = slider_right(width);
        let span = right.saturating_sub(left);

        if focused == Some(slider.kind) {
            draw_rect(
                buffer,
                width,
                left.saturating_sub(4),
                slider.top.saturating_sub(4),
                span + 8,
                SLIDER_HEIGHT + 8,
                slider.color,
            );
        }

        let label = format!("{} {:+.0}", slider.kind.name().to_uppercase(), value);
        draw_text(buffer, width, left, slider.top, &label, COLOR_TEXT);

        let track_y = slider.top + 26;
        for y in track_y..track_y + 4 {
            for x in left..right {
                set_pixel(buffer, width, x, y, COLOR_TRACK);
            }
        }

        let knob_x = value_to_x(value, width);
        let center_x = value_to_x(0.0, width);
        let fill_start = center_x.min(knob_x);
        let fill_end = center_x.max(knob_x);
        for y in track_y..track_y + 4 {
            for x in fill_start..=fill_end.min(right.saturating_sub(1)) {
                set_pixel(buffer, width, x, y, slider.color);
            }
        }

        fill_rect(
            buffer,
            width,
            knob_x.saturating_sub(5),
            track_y.saturating_sub(6),
            10,
            16,
            slider.color,
        );
    }
}

fn draw_status(
    buffer: &mut [u32],
    width: usize,
    height: usize,
    service: &EditorService,
    latest_frame: Option<&PreviewFrame>,
    status: &str,
) -> Result<(), String> {
    let left = control_panel_left(width) + CONTROL_INSET;
    let bottom = height.saturating_sub(WORKAREA_BOTTOM_MARGIN);
    let history = service.history_state();
    let metrics = service
        .preview_metrics(PreviewMetricsQuery)
        .map_err(|error| format!("preview metrics failed: {error}"))?;

    let history_line = format!(
        "edits={} undo={} redo={}",
        history.edit_count, history.undo_depth, history.redo_depth
    );
    let render_line = match latest_frame {
        Some(frame) => format!(
            "frame #{} {}x{} {}ms",
            frame.sequence, frame.width, frame.height, frame.render_time_ms
        ),
        None => "frame pending".to_string(),
    };
    let metrics_line = format!(
        "jobs {}/{} canceled={} dropped={}",
        metrics.completed_jobs, metrics.submitted_jobs, metrics.canceled_jobs, metrics.dropped_frames
    );

    draw_text(buffer, width, left, bottom.saturating_sub(76), &history_line, COLOR_TEXT_DIM);
    draw_text(buffer, width, left, bottom.saturating_sub(60), &render_line, COLOR_TEXT_DIM);
    draw_text(buffer, width, left, bottom.saturating_sub(44), &metrics_line, COLOR_TEXT_DIM);
    draw_text(
        buffer,
        width,
        CANVAS_MARGIN,
        height.saturating_sub(18),
        status,
        COLOR_TEXT,
    );
    Ok(())
}

fn stage_size(width: usize, height: usize) -> (usize, usize) {
    let stage_width = preview_panel_right(width)
        .saturating_sub(preview_panel_left())
        .saturating_sub(2);
    let stage_height = preview_panel_bottom(height)
        .saturating_sub(preview_panel_top())
        .saturating_sub(2);
    (stage_width.max(1), stage_height.max(1))
}

fn preview_panel_left() -> usize {
    CANVAS_MARGIN
}

fn preview_panel_top() -> usize {
    WORKAREA_TOP
}

fn preview_panel_right(width: usize) -> usize {
    width.saturating_sub(CANVAS_MARGIN + CONTROL_PANEL_WIDTH + SPLIT_GUTTER)
}

fn preview_panel_bottom(height: usize) -> usize {
    height.saturating_sub(WORKAREA_BOTTOM_MARGIN)
}

fn control_panel_left(width: usize) -> usize {
    preview_panel_right(width).saturating_add(SPLIT_GUTTER)
}

fn slider_left(width: usize) -> usize {
    control_panel_left(width) + CONTROL_INSET
}

fn slider_right(width: usize) -> usize {
    width.saturating_sub(CANVAS_MARGIN + CONTROL_INSET)
}

fn slider_at_position(
    mouse_x: f32,
    mouse_y: f32,
    sliders: &[SliderSpec],
    width: usize,
) -> Option<AdjustmentKind> {
    let x = mouse_x.max(0.0) as usize;
    let y = mouse_y.max(0.0) as usize;
    if x < slider_left(width) || x > slider_right(width) {
        return None;
    }
    sliders
        .iter()
        .find(|spec| y >= spec.top && y <= spec.top + SLIDER_HEIGHT)
        .map(|spec| spec.kind)
}

fn value_to_x(value: f32, width: usize) -> usize {
    let left = slider_left(width) as f32;
    let right = slider_right(width) as f32;
    let clamped = value.clamp(SLIDER_MIN, SLIDER_MAX);
    let t = (clamped - SLIDER_MIN) / (SLIDER_MAX - SLIDER_MIN);
    (left + t * (right - left)).round() as usize
}

fn x_to_value(x: f32, width: usize) -> f32 {
    let left = slider_left(width) as f32;
    let right = slider_right(width) as f32;
    let clamped = x.clamp(left, right);
    let t = (clamped - left) / (right - left);
    SLIDER_MIN + t * (SLIDER_MAX - SLIDER_MIN)
}

fn set_pixel(buffer: &mut [u32], width: usize, x: usize, y: usize, color: u32) {
    let height = buffer.len() / width;
    if x < width && y < height {
        buffer[y * width + x] = color;
    }
}

fn fill_rect(
    buffer: &mut [u32],
    width: usize,
    left: usize,
    top: usize,
    w: usize,
    h: usize,
    color: u32,
) {
    for y in top..top.saturating_add(h) {
        for x in left..left.saturating_add(w) {
            set_pixel(buffer, width, x, y, color);
        }
    }
}

fn draw_rect(
    buffer: &mut [u32],
    width: usize,
    left: usize,
    top: usize,
    w: usize,
    h: usize,
    color: u32,
) {
    if w == 0 || h == 0 {
        return;
    }
    let right = left + w - 1;
    let bottom = top + h - 1;
    for x in left..=right {
        set_pixel(buffer, width, x, top, color);
        set_pixel(buffer, width, x, bottom, color);
    }
    for y in top..=bottom {
        set_pixel(buffer, width, left, y, color);
        set_pixel(buffer, width, right, y, color);
    }
}

fn draw_text(buffer: &mut [u32], width: usize, x: usize, y: usize, text: &str, color: u32) {
    let mut cursor_x = x;
    for ch in text.chars() {
        if ch == '\n' {
            continue;
        }
        draw_char(buffer, width, cursor_x, y, ch, color);
        cursor_x = cursor_x.saturating_add(8);
    }
}

fn draw_char(buffer: &mut [u32], width: usize, x: usize, y: usize, ch: char, color: u32) {
    let glyph = font8x8::BASIC_FONTS.get(ch).unwrap_or([0; 8]);
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8 {
            if (bits >> col) & 1 == 1 {
                set_pixel(buffer, width, x + col, y + row, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_and_value_mapping_roundtrip() {
        let width = 1080;
        let original = 42.0;
        let x = value_to_x(original, width) as f32;
        let back = x_to_value(x, width);
        assert!((original - back).abs() < 1.0);
    }

    #[test]
    fn value_mapping_clamps_to_slider_range() {
        let width = 1080;
        assert_eq!(value_to_x(500.0, width), slider_right(width));
        assert_eq!(value_to_x(-500.0, width), slider_left(width));
    }

    #[test]
    fn tiny_drags_do_not_commit() {
        assert_eq!(commit_value(10.0, 10.2), None);
        assert_eq!(commit_value(10.0, 24.6), Some(25.0));
        assert_eq!(commit_value(0.0, -37.4), Some(-37.0));
    }

    #[test]
    fn slider_hit_testing_respects_the_panel_bounds() {
        let width = 1080;
        let sliders = slider_specs();
        let inside_x = (slider_left(width) + 10) as f32;
        let first_y = (sliders[0].top + 4) as f32;

        assert_eq!(
            slider_at_position(inside_x, first_y, &sliders, width),
            Some(AdjustmentKind::Brightness)
        );
        assert_eq!(slider_at_position(5.0, first_y, &sliders, width), None);
        assert_eq!(slider_at_position(inside_x, 2.0, &sliders, width), None);
    }

    #[test]
    fn dragged_slider_shows_its_live_value() {
        let committed = SliderValues {
            brightness: 20.0,
            ..SliderValues::default()
        };
        let drag = Some(SliderDrag {
            kind: AdjustmentKind::Brightness,
            start_value: 20.0,
            live_value: 55.0,
        });

        let shown = displayed_values(committed, drag);
        assert_eq!(shown.brightness, 55.0);
        assert_eq!(displayed_values(committed, None).brightness, 20.0);
    }

    #[test]
    fn fit_within_never_upscales() {
        assert_eq!(fit_within(100, 50, 1000, 1000), (100, 50));
        let (w, h) = fit_within(2000, 1000, 500, 500);
        assert_eq!((w, h), (500, 250));
    }
}
