// SPDX-License-Identifier: GPL-3.0-only

//! Frame sources
//!
//! The capture session only needs "the latest frame, if any". Live camera
//! backends are provided by the host; this module ships file-backed sources
//! that stand in for a camera: a single still image, or a directory of images
//! played back in name order, one per read.

use super::types::{BackendResult, Frame};
use crate::constants::file_formats;
use crate::errors::BackendError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Anything that exposes a continuously updated frame
pub trait FrameSource: Send {
    /// Latest frame, or `None` while the stream is not ready (or stopped)
    fn current_frame(&mut self) -> Option<Arc<Frame>>;

    /// Release the underlying stream; later reads return `None`
    fn stop(&mut self);

    fn is_stopped(&self) -> bool;

    /// Native size of the stream once known
    fn dimensions(&self) -> Option<(u32, u32)>;
}

/// Load an image file as an RGBA frame
pub fn load_image_as_frame(path: &Path) -> BackendResult<Frame> {
    let image = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            BackendError::PermissionDenied
        }
        other => BackendError::FrameLoad {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    })?;
    let frame = Frame::from_image(image.to_rgba8());
    debug!(
        path = %path.display(),
        width = frame.width,
        height = frame.height,
        "Loaded image frame"
    );
    Ok(frame)
}

/// Open a file or directory as a frame source
///
/// A directory becomes an [`ImageSequenceSource`], a file a [`StillFrameSource`].
pub fn open_frame_source(path: &Path) -> BackendResult<Box<dyn FrameSource>> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Box::new(ImageSequenceSource::from_dir(path)?)),
        Ok(_) => Ok(Box::new(StillFrameSource::from_path(path)?)),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(BackendError::PermissionDenied)
        }
        Err(_) => Err(BackendError::NoFrames(path.to_path_buf())),
    }
}

/// Serves the same frame on every read
pub struct StillFrameSource {
    frame: Arc<Frame>,
    stopped: bool,
}

impl StillFrameSource {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame: Arc::new(frame),
            stopped: false,
        }
    }

    pub fn from_path(path: &Path) -> BackendResult<Self> {
        Ok(Self::new(load_image_as_frame(path)?))
    }
}

impl FrameSource for StillFrameSource {
    fn current_frame(&mut self) -> Option<Arc<Frame>> {
        if self.stopped || !self.frame.is_ready() {
            return None;
        }
        Some(Arc::clone(&self.frame))
    }

    fn stop(&mut self) {
        if !self.stopped {
            info!("Stopping still frame source");
            self.stopped = true;
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.frame
            .is_ready()
            .then_some((self.frame.width, self.frame.height))
    }
}

/// Plays back a list of frames, advancing one frame per read and looping
pub struct ImageSequenceSource {
    frames: Vec<Arc<Frame>>,
    next: usize,
    stopped: bool,
}

impl ImageSequenceSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into_iter().map(Arc::new).collect(),
            next: 0,
            stopped: false,
        }
    }

    /// Load every supported image in `dir`, sorted by file name.
    ///
    /// Unreadable files are skipped with a warning; an empty result is an error.
    pub fn from_dir(dir: &Path) -> BackendResult<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => BackendError::PermissionDenied,
            _ => BackendError::NoFrames(dir.to_path_buf()),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(file_formats::is_image_extension)
            })
            .collect();
        paths.sort();

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            match load_image_as_frame(path) {
                Ok(frame) => frames.push(frame),
                Err(BackendError::PermissionDenied) => return Err(BackendError::PermissionDenied),
                Err(e) => warn!(error = %e, "Skipping unreadable frame"),
            }
        }

        if frames.is_empty() {
            return Err(BackendError::NoFrames(dir.to_path_buf()));
        }

        info!(dir = %dir.display(), frames = frames.len(), "Loaded image sequence");
        Ok(Self::new(frames))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ImageSequenceSource {
    fn current_frame(&mut self) -> Option<Arc<Frame>> {
        if self.stopped || self.frames.is_empty() {
            return None;
        }
        let frame = Arc::clone(&self.frames[self.next]);
        self.next = (self.next + 1) % self.frames.len();
        frame.is_ready().then_some(frame)
    }

    fn stop(&mut self) {
        if !self.stopped {
            info!("Stopping image sequence source");
            self.stopped = true;
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames
            .get(self.next)
            .filter(|f| f.is_ready())
            .map(|f| (f.width, f.height))
    }
}
