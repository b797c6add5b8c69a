//! Raw-sample acquisition
//!
//! The upstream device writes one JSON object per line:
//!
//! ```text
//! {"RA": -0.12, "LA": 0.03, "LL": 0.41}
//! ```
//!
//! Lines are timestamped on receipt. Blank lines and lines that do not
//! decode are skipped with a warning; only a failed read ends the source.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use openecg_errors::AcquisitionError;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::sample::RawSample;

/// A blocking producer of raw samples.
pub trait SampleSource: Send {
    /// Next sample, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Transient errors (see [`AcquisitionError::is_transient`]) may be
    /// followed by further samples; any other error ends the source.
    fn next_sample(&mut self) -> Result<Option<RawSample>, AcquisitionError>;
}

#[derive(Deserialize)]
struct ElectrodeLine {
    #[serde(rename = "RA")]
    ra: f32,
    #[serde(rename = "LA")]
    la: f32,
    #[serde(rename = "LL")]
    ll: f32,
}

/// Current wall-clock time in seconds, truncated to whole microseconds.
#[allow(clippy::cast_precision_loss)]
pub fn wall_clock_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1e6
}

/// Decode one feed line.
///
/// Returns `Ok(None)` for a blank line.
///
/// # Errors
///
/// Returns [`AcquisitionError::MalformedLine`] if the bytes are not UTF-8,
/// not JSON, or lack one of the `RA`, `LA`, `LL` keys.
pub fn parse_line(line: &[u8], timestamp: f64) -> Result<Option<RawSample>, AcquisitionError> {
    let text = std::str::from_utf8(line)
        .map_err(|e| AcquisitionError::malformed(e.to_string()))?
        .trim();
    if text.is_empty() {
        return Ok(None);
    }
    let ElectrodeLine { ra, la, ll } =
        serde_json::from_str(text).map_err(|e| AcquisitionError::malformed(e.to_string()))?;
    Ok(Some(RawSample::new([ra, la, ll], timestamp)))
}

/// Samples decoded from a line-oriented reader.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
    label: String,
    buf: Vec<u8>,
    discard_first: bool,
    skipped: u64,
}

impl<R: BufRead + Send> LineSource<R> {
    /// Read every line of `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            label: "<reader>".to_string(),
            buf: Vec::with_capacity(128),
            discard_first: false,
            skipped: 0,
        }
    }

    /// Read a live device. The first line is dropped since the device was
    /// most likely opened mid-line.
    pub fn from_device(reader: R, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            discard_first: true,
            ..Self::new(reader)
        }
    }

    /// Lines skipped as undecodable so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Read one raw line into `buf`; `Ok(false)` at end of stream.
    fn read_raw_line(&mut self) -> Result<bool, AcquisitionError> {
        self.buf.clear();
        loop {
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return Ok(!self.buf.is_empty()),
                Ok(_) => return Ok(true),
                // Device read timeout or signal. Bytes read so far stay in
                // `buf` and the line is completed by the next read.
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    continue;
                }
                Err(e) => {
                    return Err(AcquisitionError::Read {
                        path: self.label.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

impl<R: BufRead + Send> SampleSource for LineSource<R> {
    fn next_sample(&mut self) -> Result<Option<RawSample>, AcquisitionError> {
        if self.discard_first {
            self.discard_first = false;
            if !self.read_raw_line()? {
                return Ok(None);
            }
            debug!(source = %self.label, "Discarded first line");
        }

        loop {
            if !self.read_raw_line()? {
                return Ok(None);
            }
            match parse_line(&self.buf, wall_clock_seconds()) {
                Ok(Some(sample)) => return Ok(Some(sample)),
                Ok(None) => continue,
                Err(e) => {
                    self.skipped += 1;
                    warn!(source = %self.label, error = %e, "Skipping undecodable line");
                }
            }
        }
    }
}

/// Open a serial device, retrying and falling back to the resolved symlink
/// target when the configured path fails.
///
/// # Errors
///
/// Returns [`AcquisitionError::DeviceOpen`] once all `retries` attempts
/// have failed.
pub fn open_serial_device(
    path: &Path,
    retries: u32,
    delay: Duration,
) -> Result<File, AcquisitionError> {
    let attempts = retries.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        info!(attempt, path = %path.display(), "Opening serial device");
        match File::open(path) {
            Ok(file) => return Ok(file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to open serial device");
                last_error = e.to_string();
            }
        }

        if let Ok(resolved) = std::fs::canonicalize(path)
            && resolved != path
        {
            info!(resolved = %resolved.display(), "Retrying with resolved path");
            match File::open(&resolved) {
                Ok(file) => return Ok(file),
                Err(e) => {
                    error!(path = %resolved.display(), error = %e, "Failed to open resolved path");
                    last_error = e.to_string();
                }
            }
        }

        if attempt < attempts {
            info!(delay = ?delay, "Retrying serial device open");
            thread::sleep(delay);
        }
    }

    error!(attempts, path = %path.display(), "All attempts to open serial device failed");
    Err(AcquisitionError::DeviceOpen {
        path: path.display().to_string(),
        attempts,
        reason: last_error,
    })
}

/// Open `path` and wrap it as a [`LineSource`] that drops the first line.
///
/// # Errors
///
/// See [`open_serial_device`].
pub fn open_device_source(
    path: &Path,
    retries: u32,
    delay: Duration,
) -> Result<LineSource<BufReader<File>>, AcquisitionError> {
    let file = open_serial_device(path, retries, delay)?;
    Ok(LineSource::from_device(
        BufReader::new(file),
        path.display().to_string(),
    ))
}
