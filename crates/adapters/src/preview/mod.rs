//! Background preview rendering.
//!
//! One worker thread owns the renderer; submissions are latest-wins, so a
//! slider drag that outruns the GPU only ever renders the newest state.
//! The GPU path is a wgpu compute pass applying the collapsed 4x5 color
//! matrix; when no adapter is available a CPU renderer applies the same
//! matrix through `ColorMatrix::transform_rgba`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Instant;

use image::io::Reader as ImageReader;
use wgpu::util::DeviceExt;

use fotolab_application::{ApplicationError, PreviewPipeline};
use fotolab_domain::{ColorMatrix, PreviewFrame, PreviewMetrics, PreviewRequest};

const METRIC_WINDOW_SIZE: usize = 64;
const MAX_RENDER_PIXELS: usize = 2_000_000;
const WORKGROUP_SIZE: u32 = 64;
const GPU_PARAMS_BYTES: usize = 96;

const MATRIX_SHADER: &str = r#"
struct Params {
    pixel_count: u32,
    width: u32,
    _pad0: u32,
    _pad1: u32,
    row_r: vec4<f32>,
    row_g: vec4<f32>,
    row_b: vec4<f32>,
    row_a: vec4<f32>,
    offset: vec4<f32>,
}

@group(0) @binding(0)
var<storage, read> source_pixels: array<u32>;

@group(0) @binding(1)
var<storage, read_write> output_pixels: array<u32>;

@group(0) @binding(2)
var<uniform> params: Params;

fn to_u8(value: f32) -> u32 {
    return u32(clamp(value * 255.0, 0.0, 255.0));
}

@compute @workgroup_size(64)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.x;
    if (i >= params.pixel_count) {
        return;
    }

    let source = source_pixels[i];
    let rgba = vec4<f32>(
        f32((source >> 16u) & 255u) / 255.0,
        f32((source >> 8u) & 255u) / 255.0,
        f32(source & 255u) / 255.0,
        1.0,
    );

    let red = clamp(dot(params.row_r, rgba) + params.offset.x, 0.0, 1.0);
    let green = clamp(dot(params.row_g, rgba) + params.offset.y, 0.0, 1.0);
    let blue = clamp(dot(params.row_b, rgba) + params.offset.z, 0.0, 1.0);

    output_pixels[i] = (to_u8(red) << 16u) | (to_u8(green) << 8u) | to_u8(blue);
}
"#;

#[derive(Default)]
struct MetricsState {
    submitted_jobs: u64,
    completed_jobs: u64,
    canceled_jobs: u64,
    dropped_frames: u64,
    last_render_time_ms: Option<u64>,
    render_samples_ms: Vec<u64>,
}

impl MetricsState {
    fn snapshot(&self) -> PreviewMetrics {
        PreviewMetrics {
            submitted_jobs: self.submitted_jobs,
            completed_jobs: self.completed_jobs,
            canceled_jobs: self.canceled_jobs,
            dropped_frames: self.dropped_frames,
            last_render_time_ms: self.last_render_time_ms,
            p95_render_time_ms: percentile_95(&self.render_samples_ms),
        }
    }

    fn push_render_sample(&mut self, sample_ms: u64) {
        self.last_render_time_ms = Some(sample_ms);
        self.render_samples_ms.push(sample_ms);
        if self.render_samples_ms.len() > METRIC_WINDOW_SIZE {
            let drain_count = self.render_samples_ms.len() - METRIC_WINDOW_SIZE;
            self.render_samples_ms.drain(0..drain_count);
        }
    }
}

fn percentile_95(samples: &[u64]) -> Option<u64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let index = (((sorted.len() - 1) as f64) * 0.95).round() as usize;
    sorted.get(index).copied()
}

#[derive(Debug, Clone)]
struct ScheduledJob {
    sequence: u64,
    request: PreviewRequest,
}

trait FrameRenderer: Send + Sync {
    fn render(&self, request: &PreviewRequest) -> Result<RenderedFrame, ApplicationError>;
}

struct RenderedFrame {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

struct GpuMatrixRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
}

impl GpuMatrixRenderer {
    fn new() -> Result<Self, String> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| "no suitable wgpu adapter found".to_string())?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fotolab-preview-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))
        .map_err(|error| format!("failed to create wgpu device: {error}"))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fotolab-preview-shader"),
            source: wgpu::ShaderSource::Wgsl(MATRIX_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fotolab-preview-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fotolab-preview-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("fotolab-preview-compute-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
        });

        Ok(Self {
            device,
            queue,
            bind_group_layout,
            pipeline,
        })
    }
}

impl FrameRenderer for GpuMatrixRenderer {
    fn render(&self, request: &PreviewRequest) -> Result<RenderedFrame, ApplicationError> {
        let (render_width, render_height, pixel_count) =
            render_target(request.target_width as usize, request.target_height as usize)?;
        let pixel_bytes = (pixel_count as u64) * 4;

        let source_pixels =
            decode_source_pixels(&request.source_path, render_width, render_height)?;
        let source_bytes = pixels_as_le_bytes(&source_pixels);
        let source = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("fotolab-preview-source"),
                contents: &source_bytes,
                usage: wgpu::BufferUsages::STORAGE,
            });

        let output = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fotolab-preview-output"),
            size: pixel_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params = pack_gpu_params(&request.matrix, render_width as u32, pixel_count as u32);
        let params_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("fotolab-preview-params"),
                contents: &params,
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fotolab-preview-readback"),
            size: pixel_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fotolab-preview-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: source.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fotolab-preview-encoder"),
            });
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("fotolab-preview-pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);
            let workgroups = ((pixel_count as u32) + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
            compute_pass.dispatch_workgroups(workgroups, 1, 1);
        }
        encoder.copy_buffer_to_buffer(&output, 0, &readback, 0, pixel_bytes);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|error| ApplicationError::Io(format!("gpu map channel failed: {error}")))?
            .map_err(|error| ApplicationError::Io(format!("gpu readback map failed: {error}")))?;

        let data = slice.get_mapped_range();
        let pixels = data
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect::<Vec<_>>();
        drop(data);
        readback.unmap();

        Ok(RenderedFrame {
            width: render_width as u32,
            height: render_height as u32,
            pixels,
        })
    }
}

#[derive(Default)]
struct CpuMatrixRenderer;

impl FrameRenderer for CpuMatrixRenderer {
    fn render(&self, request: &PreviewRequest) -> Result<RenderedFrame, ApplicationError> {
        let (render_width, render_height, _) =
            render_target(request.target_width as usize, request.target_height as usize)?;
        let mut pixels = decode_source_pixels(&request.source_path, render_width, render_height)?;
        apply_matrix(&mut pixels, &request.matrix);
        Ok(RenderedFrame {
            width: render_width as u32,
            height: render_height as u32,
            pixels,
        })
    }
}

pub struct BackgroundPreviewPipeline {
    next_sequence: AtomicU64,
    latest_sequence: Arc<AtomicU64>,
    submit_tx: mpsc::Sender<ScheduledJob>,
    result_rx: Mutex<mpsc::Receiver<PreviewFrame>>,
    metrics: Arc<Mutex<MetricsState>>,
}

impl BackgroundPreviewPipeline {
    pub fn new() -> Self {
        let renderer: Arc<dyn FrameRenderer> = match GpuMatrixRenderer::new() {
            Ok(renderer) => Arc::new(renderer),
            Err(reason) => {
                log::warn!("gpu preview unavailable ({reason}), falling back to cpu renderer");
                Arc::new(CpuMatrixRenderer)
            }
        };
        Self::with_renderer(renderer)
    }

    fn with_renderer(renderer: Arc<dyn FrameRenderer>) -> Self {
        let (submit_tx, submit_rx) = mpsc::channel::<ScheduledJob>();
        let (result_tx, result_rx) = mpsc::channel::<PreviewFrame>();
        let latest_sequence = Arc::new(AtomicU64::new(0));
        let metrics = Arc::new(Mutex::new(MetricsState::default()));

        spawn_worker(
            submit_rx,
            result_tx,
            Arc::clone(&latest_sequence),
            Arc::clone(&metrics),
            renderer,
        );

        Self {
            next_sequence: AtomicU64::new(0),
            latest_sequence,
            submit_tx,
            result_rx: Mutex::new(result_rx),
            metrics,
        }
    }
}

impl Default for BackgroundPreviewPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewPipeline for BackgroundPreviewPipeline {
    fn submit_preview(&self, request: PreviewRequest) -> Result<(), ApplicationError> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.latest_sequence.store(sequence, Ordering::SeqCst);
        {
            let mut metrics = self
                .metrics
                .lock()
                .map_err(|_| ApplicationError::Io("preview metrics lock poisoned".to_string()))?;
            metrics.submitted_jobs += 1;
        }
        self.submit_tx
            .send(ScheduledJob { sequence, request })
            .map_err(|error| {
                ApplicationError::Io(format!("failed to enqueue preview job: {error}"))
            })
    }

    fn try_receive_preview(&self) -> Result<Option<PreviewFrame>, ApplicationError> {
        let receiver = self
            .result_rx
            .lock()
            .map_err(|_| ApplicationError::Io("preview result lock poisoned".to_string()))?;

        let first = match receiver.try_recv() {
            Ok(frame) => frame,
            Err(mpsc::TryRecvError::Empty) => return Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                return Err(ApplicationError::Io(
                    "preview result channel disconnected".to_string(),
                ))
            }
        };

        let mut newest = first;
        let mut dropped = 0_u64;
        while let Ok(next) = receiver.try_recv() {
            dropped += 1;
            newest = next;
        }

        if dropped > 0 {
            let mut metrics = self
                .metrics
                .lock()
                .map_err(|_| ApplicationError::Io("preview metrics lock poisoned".to_string()))?;
            metrics.dropped_frames += dropped;
        }

        Ok(Some(newest))
    }

    fn metrics(&self) -> Result<PreviewMetrics, ApplicationError> {
        let metrics = self
            .metrics
            .lock()
            .map_err(|_| ApplicationError::Io("preview metrics lock poisoned".to_string()))?;
        Ok(metrics.snapshot())
    }
}

fn spawn_worker(
    submit_rx: mpsc::Receiver<ScheduledJob>,
    result_tx: mpsc::Sender<PreviewFrame>,
    latest_sequence: Arc<AtomicU64>,
    metrics: Arc<Mutex<MetricsState>>,
    renderer: Arc<dyn FrameRenderer>,
) {
    thread::spawn(move || {
        while let Ok(mut job) = submit_rx.recv() {
            // Drain the queue so only the newest request renders.
            while let Ok(next) = submit_rx.try_recv() {
                mark_canceled(&metrics, 1);
                job = next;
            }

            if job.sequence < latest_sequence.load(Ordering::SeqCst) {
                mark_canceled(&metrics, 1);
                continue;
            }

            let started = Instant::now();
            let rendered = match renderer.render(&job.request) {
                Ok(rendered) => rendered,
                Err(error) => {
                    log::warn!("preview render failed: {error}");
                    mark_canceled(&metrics, 1);
                    continue;
                }
            };
            let elapsed = started.elapsed().as_millis() as u64;

            // A newer submission arrived while rendering: this frame is stale.
            if job.sequence < latest_sequence.load(Ordering::SeqCst) {
                mark_canceled(&metrics, 1);
                continue;
            }

            let frame = PreviewFrame {
                sequence: job.sequence,
                width: rendered.width,
                height: rendered.height,
                render_time_ms: elapsed,
                pixels: rendered.pixels,
            };
            if result_tx.send(frame).is_err() {
                return;
            }

            if let Ok(mut state) = metrics.lock() {
                state.completed_jobs += 1;
                state.push_render_sample(elapsed);
            }
        }
    });
}

fn mark_canceled(metrics: &Arc<Mutex<MetricsState>>, count: u64) {
    if let Ok(mut state) = metrics.lock() {
        state.canceled_jobs += count;
    }
}

fn decode_source_pixels(
    source_path: &str,
    target_width: usize,
    target_height: usize,
) -> Result<Vec<u32>, ApplicationError> {
    let image = ImageReader::open(source_path)
        .map_err(|error| ApplicationError::Decode(error.to_string()))?
        .with_guessed_format()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?
        .decode()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?;
    let source = image.to_rgb8();
    let src_width = source.width() as usize;
    let src_height = source.height() as usize;
    if src_width == 0 || src_height == 0 {
        return Err(ApplicationError::Decode(format!(
            "empty image dimensions for source path: {source_path}"
        )));
    }

    let mut pixels = vec![0_u32; target_width * target_height];
    for y in 0..target_height {
        let src_y = y * src_height / target_height;
        for x in 0..target_width {
            let src_x = x * src_width / target_width;
            let pixel = source.get_pixel(src_x as u32, src_y as u32);
            let [red, green, blue] = pixel.0;
            pixels[y * target_width + x] =
                ((red as u32) << 16) | ((green as u32) << 8) | (blue as u32);
        }
    }
    Ok(pixels)
}

fn apply_matrix(pixels: &mut [u32], matrix: &ColorMatrix) {
    if matrix.is_identity() {
        return;
    }
    for pixel in pixels.iter_mut() {
        let red = ((*pixel >> 16) & 0xFF) as f32 / 255.0;
        let green = ((*pixel >> 8) & 0xFF) as f32 / 255.0;
        let blue = (*pixel & 0xFF) as f32 / 255.0;
        let out = matrix.transform_rgba([red, green, blue, 1.0]);
        *pixel = (quantize(out[0]) << 16) | (quantize(out[1]) << 8) | quantize(out[2]);
    }
}

fn quantize(channel: f32) -> u32 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u32
}

fn pixels_as_le_bytes(pixels: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(pixels.len() * 4);
    for pixel in pixels {
        bytes.extend_from_slice(&pixel.to_le_bytes());
    }
    bytes
}

/// Uniform layout mirrors the WGSL `Params` struct: four u32 header words,
/// four row vectors, one offset vector.
fn pack_gpu_params(matrix: &ColorMatrix, render_width: u32, pixel_count: u32) -> [u8; GPU_PARAMS_BYTES] {
    let rows = matrix.rows();
    let mut out = [0_u8; GPU_PARAMS_BYTES];
    out[0..4].copy_from_slice(&pixel_count.to_le_bytes());
    out[4..8].copy_from_slice(&render_width.to_le_bytes());
    for (row_index, row) in rows.iter().enumerate() {
        let base = 16 + row_index * 16;
        for (col_index, coeff) in row[..4].iter().enumerate() {
            let at = base + col_index * 4;
            out[at..at + 4].copy_from_slice(&coeff.to_le_bytes());
        }
    }
    for (row_index, row) in rows.iter().enumerate() {
        let at = 80 + row_index * 4;
        out[at..at + 4].copy_from_slice(&row[4].to_le_bytes());
    }
    out
}

fn render_target(width: usize, height: usize) -> Result<(usize, usize, usize), ApplicationError> {
    if width == 0 || height == 0 {
        return Err(ApplicationError::InvalidInput(
            "preview target dimensions must be non-zero".to_string(),
        ));
    }

    let requested_pixels = width
        .checked_mul(height)
        .ok_or_else(|| ApplicationError::InvalidInput("preview dimensions overflow".to_string()))?;
    if requested_pixels <= MAX_RENDER_PIXELS {
        return Ok((width, height, requested_pixels));
    }

    let scale = (MAX_RENDER_PIXELS as f64 / requested_pixels as f64).sqrt();
    let render_width = ((width as f64 * scale).floor() as usize).max(1);
    let render_height = ((height as f64 * scale).floor() as usize).max(1);
    let pixel_count = render_width * render_height;
    Ok((render_width, render_height, pixel_count.min(MAX_RENDER_PIXELS)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use image::{ImageBuffer, Rgb};
    use tempfile::TempDir;

    use super::*;

    fn write_test_png(dir: &TempDir, color: [u8; 3]) -> String {
        let path = dir.path().join("preview.png");
        let pixels = ImageBuffer::from_pixel(8, 8, Rgb(color));
        pixels.save(&path).expect("save png");
        path.to_string_lossy().to_string()
    }

    struct SlowRenderer {
        delay: Duration,
    }

    impl FrameRenderer for SlowRenderer {
        fn render(&self, request: &PreviewRequest) -> Result<RenderedFrame, ApplicationError> {
            thread::sleep(self.delay);
            Ok(RenderedFrame {
                width: request.target_width,
                height: request.target_height,
                pixels: vec![0; (request.target_width * request.target_height) as usize],
            })
        }
    }

    #[test]
    fn latest_submission_wins_and_stale_jobs_cancel() {
        let pipeline = BackgroundPreviewPipeline::with_renderer(Arc::new(SlowRenderer {
            delay: Duration::from_millis(50),
        }));

        for step in 0..8 {
            pipeline
                .submit_preview(PreviewRequest {
                    source_path: "unused.png".to_string(),
                    matrix: ColorMatrix::brightness(step as f32 / 10.0),
                    target_width: 4,
                    target_height: 4,
                })
                .expect("submit preview");
        }

        let deadline = Instant::now() + Duration::from_secs(2);
        let frame = loop {
            if let Some(frame) = pipeline.try_receive_preview().expect("poll") {
                break frame;
            }
            assert!(
                Instant::now() < deadline,
                "timed out waiting for preview frame"
            );
            thread::sleep(Duration::from_millis(10));
        };
        assert_eq!(frame.sequence, 8);

        let metrics = pipeline.metrics().expect("metrics");
        assert_eq!(metrics.submitted_jobs, 8);
        assert!(metrics.completed_jobs >= 1);
        assert!(metrics.canceled_jobs >= 1);
    }

    #[test]
    fn cpu_renderer_applies_the_matrix() {
        let temp = TempDir::new().expect("tempdir");
        let source_path = write_test_png(&temp, [100, 100, 100]);

        let rendered = CpuMatrixRenderer
            .render(&PreviewRequest {
                source_path,
                matrix: ColorMatrix::brightness(0.5),
                target_width: 8,
                target_height: 8,
            })
            .expect("render should work");

        assert_eq!(rendered.width, 8);
        let pixel = rendered.pixels[0];
        assert_eq!((pixel >> 16) & 0xFF, 150);
        assert_eq!((pixel >> 8) & 0xFF, 150);
        assert_eq!(pixel & 0xFF, 150);
    }

    #[test]
    fn identity_matrix_passes_pixels_through() {
        let temp = TempDir::new().expect("tempdir");
        let source_path = write_test_png(&temp, [12, 34, 56]);

        let rendered = CpuMatrixRenderer
            .render(&PreviewRequest {
                source_path,
                matrix: ColorMatrix::identity(),
                target_width: 8,
                target_height: 8,
            })
            .expect("render should work");
        assert_eq!(rendered.pixels[0], (12 << 16) | (34 << 8) | 56);
    }

    #[test]
    fn zero_target_dimensions_are_rejected() {
        let result = CpuMatrixRenderer.render(&PreviewRequest {
            source_path: "ignored.png".to_string(),
            matrix: ColorMatrix::identity(),
            target_width: 0,
            target_height: 512,
        });
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }

    #[test]
    fn oversized_targets_downscale_preserving_aspect() {
        let (width, height, pixels) = render_target(4000, 2000).expect("target");
        assert!(pixels <= MAX_RENDER_PIXELS);
        let aspect = width as f64 / height as f64;
        assert!((aspect - 2.0).abs() < 0.01);
    }

    #[test]
    fn gpu_params_layout_matches_the_shader_struct() {
        let matrix = ColorMatrix::contrast(0.5);
        let packed = pack_gpu_params(&matrix, 64, 4096);

        assert_eq!(u32::from_le_bytes(packed[0..4].try_into().unwrap()), 4096);
        assert_eq!(u32::from_le_bytes(packed[4..8].try_into().unwrap()), 64);
        // row_r.x at byte 16
        let row_r_x = f32::from_le_bytes(packed[16..20].try_into().unwrap());
        assert!((row_r_x - 1.5).abs() < 1e-6);
        // offset.x at byte 80
        let offset_x = f32::from_le_bytes(packed[80..84].try_into().unwrap());
        assert!((offset_x - (-0.25)).abs() < 1e-6);
    }
}
