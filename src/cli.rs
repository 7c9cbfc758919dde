// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for photobooth operations
//!
//! This module provides command-line functionality for:
//! - Printing slot geometry
//! - Composing strips from existing images
//! - Running a scripted capture session end to end

use crate::StyleArgs;
use photobooth::backends::{
    HandLandmarkProvider, ScriptedLandmarkProvider, StillFrameSource, open_frame_source,
};
use photobooth::constants::MAX_PHOTOS;
use photobooth::pipelines::photo::{
    CompositionSpec, ExportedStrip, PhotoCapture, PhotoEncoder, StripCompositor, StripGeometry,
    StripPipeline,
};
use photobooth::session::runtime::no_provider;
use photobooth::session::{CaptureSession, CapturedPhoto, PhotoStore, SessionEvent};
use photobooth::{
    Config, LayoutConfig, Orientation, PhotoSelection, SessionRuntime, Surface,
    storage,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Options for `photobooth booth`
pub struct BoothOptions {
    pub frames: PathBuf,
    pub trace: Option<PathBuf>,
    pub count: Option<u8>,
    pub orientation: Option<Orientation>,
    pub manual: bool,
    pub shots: Option<usize>,
    pub select: Vec<usize>,
    pub keep_frames: bool,
    pub style: StyleArgs,
}

/// Print slot dimensions for every surface and the export canvas
pub fn print_layout(count: Option<u8>, orientation: Option<Orientation>) -> CliResult {
    let config = Config::load_or_default();
    let layout = config.resolve_layout(count, orientation)?;

    println!("{} x{}", layout.orientation().display_name(), layout.count());
    println!();
    for surface in Surface::ALL {
        let base = config.bases.base(surface);
        let dims = layout.slot_dims(base);
        println!(
            "  {:<18} base {:>4}  slot {}x{}  gap {}",
            surface.display_name(),
            base,
            dims.width,
            dims.height,
            dims.gap
        );
    }

    let geometry = StripGeometry::new(&layout, config.bases.export);
    let (width, height) = geometry.canvas_size();
    println!();
    println!("  Export canvas: {}x{} (stamp {}px)", width, height, geometry.stamp_size);
    Ok(())
}

/// Print the effective configuration as JSON
pub fn print_config() -> CliResult {
    let config = Config::load_or_default();
    if let Some(path) = Config::config_file_path() {
        println!("# {}", path.display());
    }
    println!("{}", config.to_json()?);
    Ok(())
}

/// Run each image through the capture pipeline, then compose a strip
pub fn compose_images(
    images: Vec<PathBuf>,
    count: Option<u8>,
    orientation: Option<Orientation>,
    select: Vec<usize>,
    style: StyleArgs,
) -> CliResult {
    let config = Config::load_or_default();
    let layout = config.resolve_layout(count, orientation)?;
    let spec = build_spec(&layout, &style)?;
    if images.len() > MAX_PHOTOS {
        return Err(format!("At most {} images can be composed", MAX_PHOTOS).into());
    }

    let capture = capture_pipeline(&config, &layout);
    let rt = tokio::runtime::Runtime::new()?;
    let exported = rt.block_on(async {
        let mut store = PhotoStore::new(images.len());
        for path in &images {
            let mut source = StillFrameSource::from_path(path)?;
            let frame = PhotoCapture::grab(&mut source)?;
            let encoded = capture.process(frame).await?;
            store.push(encoded)?;
        }
        println!("Captured {} photos", store.len());
        let exported = export_strip(&config, &spec, store.photos(), &select, &style).await?;
        Ok::<_, Box<dyn std::error::Error>>(exported)
    })?;

    report_export(&exported);
    Ok(())
}

/// Run a full session: capture, select, compose
pub fn run_booth(options: BoothOptions) -> CliResult {
    let config = Config::load_or_default();
    let layout = config.resolve_layout(options.count, options.orientation)?;
    let spec = build_spec(&layout, &options.style)?;
    let capacity = config.session_capacity(&layout);
    let shots = options
        .shots
        .unwrap_or(layout.count() as usize)
        .clamp(layout.count() as usize, capacity);

    let scripted = match (&options.trace, options.manual) {
        (Some(trace), false) => Some(Arc::new(ScriptedLandmarkProvider::from_path(trace)?)),
        _ => None,
    };
    let provider = match &scripted {
        Some(provider) => Ok(Arc::clone(provider) as Arc<dyn HandLandmarkProvider>),
        None => no_provider("no landmark trace given"),
    };
    let manual = scripted.is_none();

    let session = CaptureSession::with_capacity(layout, config.gesture, config.timing, capacity);
    let capture = capture_pipeline(&config, &layout);
    let idle_poll = (config.timing.inference_interval * 5).max(Duration::from_millis(50));

    let rt = tokio::runtime::Runtime::new()?;
    let (photo_count, exported) = rt.block_on(async {
        let source = open_frame_source(&options.frames);
        let (runtime, mut events) = SessionRuntime::new(session, capture, provider);
        let (handle, task) = runtime.spawn(source);

        let ctrlc_handle = handle.clone();
        ctrlc::set_handler(move || {
            ctrlc_handle.leave();
        })?;

        let mut camera_failure = None;
        let mut idle_check = tokio::time::interval(idle_poll);
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    print_event(&event);
                    match event {
                        SessionEvent::Ready if manual => {
                            handle.trigger();
                        }
                        SessionEvent::CameraUnavailable(message) => {
                            camera_failure = Some(message);
                        }
                        SessionEvent::PhotoCaptured { total, .. } => {
                            if total >= shots {
                                handle.leave();
                            } else if manual {
                                handle.trigger();
                            }
                        }
                        SessionEvent::CapReached(_) => {
                            handle.leave();
                        }
                        SessionEvent::Stopped => break,
                        _ => {}
                    }
                }
                _ = idle_check.tick(), if scripted.is_some() => {
                    // Trace exhausted and nothing pending: nothing more will happen
                    let exhausted = scripted.as_ref().is_some_and(|p| p.remaining() == 0);
                    if exhausted && !handle.status().is_busy() {
                        handle.leave();
                    }
                }
            }
        }

        let session = task.await?;
        let photos = finished_photos(&session, camera_failure)?;

        if options.keep_frames {
            let dir = output_directory(&config, &options.style);
            for path in storage::save_captured_photos(photos, &dir).await? {
                println!("Photo saved: {}", path.display());
            }
        }

        let exported =
            export_strip(&config, &spec, photos, &options.select, &options.style).await?;
        Ok::<_, Box<dyn std::error::Error>>((session.photos().len(), exported))
    })?;

    println!("Session finished with {} photos", photo_count);
    report_export(&exported);
    Ok(())
}

/// Photos of a finished session; a camera failure is reported instead of the shortfall
fn finished_photos(
    session: &CaptureSession,
    camera_failure: Option<String>,
) -> CliResult<&[CapturedPhoto]> {
    if let Some(message) = camera_failure {
        return Err(message.into());
    }
    Ok(session.finish()?)
}

fn capture_pipeline(config: &Config, layout: &LayoutConfig) -> PhotoCapture {
    let mut encoder = PhotoEncoder::new();
    encoder.set_quality(config.capture_quality);
    PhotoCapture::new(layout.slot_dims(config.bases.base(Surface::Capture)), encoder)
}

fn output_directory(config: &Config, style: &StyleArgs) -> PathBuf {
    style
        .output
        .clone()
        .unwrap_or_else(|| config.photo_directory())
}

/// Build the selection from 1-based photo numbers, or the first `count`
fn build_selection(
    layout: &LayoutConfig,
    available: usize,
    select: &[usize],
) -> CliResult<PhotoSelection> {
    let mut selection = PhotoSelection::new(layout.count() as usize, available);
    if select.is_empty() {
        for index in 0..selection.required().min(available) {
            selection.toggle(index)?;
        }
    } else {
        for &number in select {
            let index = number
                .checked_sub(1)
                .ok_or("Photo numbers start at 1")?;
            selection.toggle(index)?;
        }
    }
    Ok(selection)
}

fn build_spec(layout: &LayoutConfig, style: &StyleArgs) -> CliResult<CompositionSpec> {
    Ok(CompositionSpec::new(*layout)
        .with_hex_colors(&style.frame_color, &style.tint)?
        .with_tint_opacity(style.tint_opacity)
        .with_greyscale(style.greyscale))
}

async fn export_strip(
    config: &Config,
    spec: &CompositionSpec,
    photos: &[CapturedPhoto],
    select: &[usize],
    style: &StyleArgs,
) -> CliResult<ExportedStrip> {
    let layout = &spec.layout;
    let selection = build_selection(layout, photos.len(), select)?;
    let selected = selection.confirm()?;

    let stamp = storage::load_stamp(config.stamp_path.clone()).await;
    let compositor = StripCompositor::new(config.bases.export).with_stamp(stamp);
    let pipeline = StripPipeline::new(compositor);

    let dir = output_directory(config, style);
    storage::ensure_directory(&dir)?;
    Ok(pipeline.export(spec, photos, selected, &dir).await?)
}

fn report_export(exported: &ExportedStrip) {
    let (width, height) = exported.strip.geometry.canvas_size();
    if !exported.strip.skipped_slots.is_empty() {
        println!(
            "Warning: slots {:?} could not be drawn",
            exported.strip.skipped_slots
        );
    }
    if !exported.strip.stamped {
        println!("Warning: strip saved without stamp");
    }
    println!("Strip saved: {} ({}x{})", exported.path.display(), width, height);
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Ready => println!("Camera ready"),
        SessionEvent::ManualModeEnabled(message) => println!("{}", message),
        SessionEvent::WaveDetected(wave) => {
            println!("Wave detected ({} reversals)", wave.reversals)
        }
        SessionEvent::Countdown(0) => {}
        SessionEvent::Countdown(n) => println!("  {}...", n),
        SessionEvent::PhotoCaptured { index, total } => {
            println!("Photo {} captured ({} taken)", index + 1, total)
        }
        SessionEvent::CaptureRetry(reason) => println!("Capture failed, retrying: {}", reason),
        SessionEvent::CapReached(message) => println!("{}", message),
        // Camera failures end the command with an error
        SessionEvent::CameraUnavailable(_)
        | SessionEvent::CountdownStarted(_)
        | SessionEvent::Flash(_)
        | SessionEvent::Stopped => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photobooth::constants::messages;
    use photobooth::gesture::GestureConfig;
    use photobooth::session::SessionTiming;

    fn idle_session() -> CaptureSession {
        CaptureSession::new(
            LayoutConfig::default(),
            GestureConfig::default(),
            SessionTiming::default(),
        )
    }

    #[test]
    fn test_camera_failure_replaces_shortfall() {
        let session = idle_session();
        let err = finished_photos(&session, Some(messages::CAMERA_DENIED.to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), messages::CAMERA_DENIED);
    }

    #[test]
    fn test_shortfall_without_camera_failure() {
        let session = idle_session();
        let err = finished_photos(&session, None).unwrap_err();
        assert!(err.to_string().contains("3"), "{}", err);
    }

    #[test]
    fn test_invalid_colors_rejected() {
        let layout = LayoutConfig::default();
        let style = |frame: &str, tint: &str| StyleArgs {
            frame_color: frame.to_string(),
            tint: tint.to_string(),
            tint_opacity: 0.0,
            greyscale: false,
            output: None,
        };
        assert!(build_spec(&layout, &style("#FFFFFF", "#FFFFFF")).is_ok());
        assert!(build_spec(&layout, &style("red", "#FFFFFF")).is_err());
        assert!(build_spec(&layout, &style("#FFFFFF", "#FFF")).is_err());
    }
}
