//! Scripted sources and backends that record every call made on them

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use image::DynamicImage;

use super::synthetic::{synthetic_frame, SyntheticLayout};
use crate::errors::RecordError;
use crate::recording::{
    ContainerFormat, ContainerStats, EncodedPacket, MediaBackend, OutputContainer, Picture,
    StreamParams, VideoEncoder,
};
use crate::source::{FrameSource, Resolution};
use crate::timing::Pacer;

/// Frame source producing synthetic frames, with optional scripted failures
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    resolution: Resolution,
    frame_size: Resolution,
    layout: SyntheticLayout,
    fail_open: bool,
    fail_close: bool,
    fail_capture_at: Option<u64>,
    is_open: bool,
    captures: u64,
    opens: u64,
    closes: u64,
}

impl ScriptedSource {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            frame_size: resolution,
            layout: SyntheticLayout::Rgb8,
            fail_open: false,
            fail_close: false,
            fail_capture_at: None,
            is_open: false,
            captures: 0,
            opens: 0,
            closes: 0,
        }
    }

    /// Deliver frames in `layout` instead of RGB8
    pub fn with_layout(mut self, layout: SyntheticLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Deliver frames of a different size than the reported resolution
    pub fn delivering(mut self, frame_size: Resolution) -> Self {
        self.frame_size = frame_size;
        self
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Fail the `n`th capture call (1-based), as if the device was unplugged
    pub fn fail_on_capture(mut self, n: u64) -> Self {
        self.fail_capture_at = Some(n);
        self
    }

    /// Number of capture calls, failed ones included
    pub fn captures(&self) -> u64 {
        self.captures
    }

    pub fn opens(&self) -> u64 {
        self.opens
    }

    pub fn closes(&self) -> u64 {
        self.closes
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }
}

impl FrameSource for ScriptedSource {
    fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn open(&mut self) -> Result<(), RecordError> {
        self.opens += 1;
        if self.fail_open {
            return Err(RecordError::SourceUnavailable("device busy".to_string()));
        }
        self.is_open = true;
        Ok(())
    }

    fn capture(&mut self) -> Result<DynamicImage, RecordError> {
        self.captures += 1;
        if !self.is_open {
            return Err(RecordError::SourceUnavailable("stream not open".to_string()));
        }
        if self.fail_capture_at == Some(self.captures) {
            return Err(RecordError::SourceUnavailable(format!(
                "device disconnected at capture {}",
                self.captures
            )));
        }
        let frame = synthetic_frame(
            self.captures - 1,
            self.frame_size.width,
            self.frame_size.height,
        );
        Ok(self.layout.apply(frame))
    }

    fn close(&mut self) -> Result<(), RecordError> {
        self.closes += 1;
        self.is_open = false;
        if self.fail_close {
            return Err(RecordError::SourceUnavailable("device vanished".to_string()));
        }
        Ok(())
    }
}

/// Everything a [`FakeBackend`] saw
#[derive(Debug, Clone, Default)]
pub struct PipelineLog {
    pub encoder_params: Option<StreamParams>,
    pub container_params: Option<StreamParams>,
    pub container_path: Option<PathBuf>,
    pub container_format: Option<ContainerFormat>,
    /// pts of every picture submitted, in order
    pub submitted_pts: Vec<i64>,
    /// `encode(None)` calls
    pub flush_calls: u64,
    pub containers_opened: u64,
    pub containers_closed: u64,
    /// pts of every packet the container accepted, in order
    pub written_pts: Vec<i64>,
}

/// Shared view of a [`PipelineLog`] that outlives the backend
#[derive(Debug, Clone, Default)]
pub struct PipelineLogHandle(Arc<Mutex<PipelineLog>>);

impl PipelineLogHandle {
    fn lock(&self) -> MutexGuard<'_, PipelineLog> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of the log as it is now
    pub fn snapshot(&self) -> PipelineLog {
        self.lock().clone()
    }
}

/// Backend handing out in-memory encoders and containers
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    log: PipelineLogHandle,
    encoder_delay: usize,
    fail_encoder_init: bool,
    fail_container_init: bool,
    fail_encode_at: Option<u64>,
    fail_write_at: Option<u64>,
    fail_finish: bool,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> PipelineLogHandle {
        self.log.clone()
    }

    /// Hold back `frames` pictures before emitting, like a codec with
    /// lookahead; they come out one per flush call
    pub fn with_encoder_delay(mut self, frames: usize) -> Self {
        self.encoder_delay = frames;
        self
    }

    pub fn fail_encoder_init(mut self) -> Self {
        self.fail_encoder_init = true;
        self
    }

    /// Refuse to create the output file, as for an unwritable path
    pub fn fail_container_init(mut self) -> Self {
        self.fail_container_init = true;
        self
    }

    /// Reject the `n`th submitted picture (1-based)
    pub fn fail_encode_at(mut self, n: u64) -> Self {
        self.fail_encode_at = Some(n);
        self
    }

    /// Fail the `n`th packet write (1-based), as for a full disk
    pub fn fail_write_at(mut self, n: u64) -> Self {
        self.fail_write_at = Some(n);
        self
    }

    pub fn fail_finish(mut self) -> Self {
        self.fail_finish = true;
        self
    }
}

impl MediaBackend for FakeBackend {
    type Encoder = FakeEncoder;
    type Container = FakeContainer;

    fn create_encoder(&mut self, params: &StreamParams) -> Result<FakeEncoder, RecordError> {
        self.log.lock().encoder_params = Some(*params);
        if self.fail_encoder_init {
            return Err(RecordError::PipelineInitFailed(format!(
                "no encoder for {}",
                params.codec.name()
            )));
        }
        Ok(FakeEncoder {
            log: self.log.clone(),
            delay: self.encoder_delay,
            pending: VecDeque::new(),
            fail_at: self.fail_encode_at,
            submitted: 0,
        })
    }

    fn create_container(
        &mut self,
        path: &Path,
        format: ContainerFormat,
        params: &StreamParams,
    ) -> Result<FakeContainer, RecordError> {
        if self.fail_container_init {
            return Err(RecordError::PipelineInitFailed(format!(
                "cannot create {}",
                path.display()
            )));
        }
        let mut log = self.log.lock();
        log.containers_opened += 1;
        log.container_params = Some(*params);
        log.container_path = Some(path.to_path_buf());
        log.container_format = Some(format);

        Ok(FakeContainer {
            log: self.log.clone(),
            tick_secs: params.time_base.as_f64(),
            fail_write_at: self.fail_write_at,
            fail_finish: self.fail_finish,
            writes: 0,
            bytes: 0,
        })
    }
}

/// Encoder that turns each picture into a tiny packet tagged with its pts
#[derive(Debug)]
pub struct FakeEncoder {
    log: PipelineLogHandle,
    delay: usize,
    pending: VecDeque<i64>,
    fail_at: Option<u64>,
    submitted: u64,
}

impl FakeEncoder {
    fn packet(pts: i64) -> EncodedPacket {
        EncodedPacket {
            data: vec![0, 0, 0, 1, (pts % 256) as u8],
            pts,
            is_keyframe: pts == 0,
        }
    }
}

impl VideoEncoder for FakeEncoder {
    fn encode(&mut self, picture: Option<&Picture>) -> Result<Vec<EncodedPacket>, RecordError> {
        let Some(picture) = picture else {
            self.log.lock().flush_calls += 1;
            return Ok(self.pending.pop_front().map(Self::packet).into_iter().collect());
        };

        self.submitted += 1;
        if self.fail_at == Some(self.submitted) {
            return Err(RecordError::EncodeFailed(format!(
                "rejected picture {}",
                picture.pts()
            )));
        }
        self.log.lock().submitted_pts.push(picture.pts());

        self.pending.push_back(picture.pts());
        let mut out = Vec::new();
        while self.pending.len() > self.delay {
            if let Some(pts) = self.pending.pop_front() {
                out.push(Self::packet(pts));
            }
        }
        Ok(out)
    }
}

/// Container that keeps packets in the shared log instead of a file
#[derive(Debug)]
pub struct FakeContainer {
    log: PipelineLogHandle,
    tick_secs: f64,
    fail_write_at: Option<u64>,
    fail_finish: bool,
    writes: u64,
    bytes: u64,
}

impl OutputContainer for FakeContainer {
    fn write(&mut self, packet: &EncodedPacket) -> Result<(), RecordError> {
        self.writes += 1;
        if self.fail_write_at == Some(self.writes) {
            return Err(RecordError::WriteFailed("no space left on device".to_string()));
        }
        self.bytes += packet.data.len() as u64;
        self.log.lock().written_pts.push(packet.pts);
        Ok(())
    }

    fn finish(self) -> Result<ContainerStats, RecordError> {
        let mut log = self.log.lock();
        log.containers_closed += 1;
        if self.fail_finish {
            return Err(RecordError::WriteFailed("failed to finalize".to_string()));
        }
        let packets = log.written_pts.len() as u64;
        Ok(ContainerStats {
            packets_written: packets,
            bytes_written: self.bytes,
            duration_secs: packets as f64 * self.tick_secs,
        })
    }
}

/// Pacer that remembers requested pauses instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct PacingLog {
    pub pauses: Vec<Duration>,
}

impl Pacer for PacingLog {
    fn pause(&mut self, interval: Duration) {
        self.pauses.push(interval);
    }
}
