use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, trace};
use ndarray::Array2;
use rayon::prelude::*;

use crate::decode::decode_epochs;
use crate::error::{Result, XdfError};
use crate::layout::FrameLayout;
use crate::montage;
use crate::types::{ChannelInfo, MontageChannel, Recording, RecordingLayout};
use crate::utils::{snap_down, snap_up};
use crate::DEFAULT_FILTER_ORDER;

/// Reads one physical channel's raw byte segments from an interleaved
/// signal file, one segment per frame.
///
/// The file is a flat sequence of fixed-width frames with no header or
/// footer; each frame holds one `channel_width`-byte segment per physical
/// channel at a fixed `start_offset`. The total frame count is
/// `file_size / frame_width` (whole frames only). For each frame the file
/// is seeked to `frame_index * frame_width + start_offset` and exactly
/// `channel_width` bytes are read, so a single-channel extraction never
/// loads the whole file. The handle is opened here and closed on every
/// exit path, including errors.
///
/// `window` is an optional `[start_second, end_second)` range; the end is
/// clamped to the recording duration, then the start is snapped down and
/// the end snapped up to the nearest multiple of `frame_length` so that no
/// partial frame is ever read.
///
/// # Errors
///
/// * [`XdfError::FileNotFound`] - the file cannot be opened.
/// * [`XdfError::InvalidRange`] - the window is empty after snapping (this
///   includes a file too short to hold a single whole frame).
/// * [`XdfError::ShortRead`] - a read returned fewer bytes than requested;
///   truncation is reported, never zero-padded.
pub fn read_channel_segments(
    path: &Path,
    channel: &str,
    start_offset: usize,
    channel_width: usize,
    frame_width: usize,
    frame_length: u32,
    window: Option<(u64, u64)>,
) -> Result<Vec<Vec<u8>>> {
    if frame_width == 0 || frame_length == 0 {
        return Err(XdfError::MalformedSource {
            name: channel.to_string(),
            detail: "frame width or frame length has 0 value".to_string(),
        });
    }

    let mut file = File::open(path)
        .map_err(|e| XdfError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    let file_size = file.metadata()?.len();
    let frame_count = file_size / frame_width as u64;
    let duration = frame_count * frame_length as u64;

    let (start, end) = window.unwrap_or((0, duration));
    let step = frame_length as u64;
    let start = snap_down(start, step);
    let end = snap_up(end.min(duration), step).min(duration);
    if start >= end {
        return Err(XdfError::InvalidRange { start, end });
    }

    let first_frame = start / step;
    let last_frame = end / step;
    trace!(
        "channel '{channel}': frames {first_frame}..{last_frame} of {frame_count}, \
         {channel_width} bytes per frame at offset {start_offset}"
    );

    let mut segments = Vec::with_capacity((last_frame - first_frame) as usize);
    let mut buf = vec![0u8; channel_width];
    for frame in first_frame..last_frame {
        let offset = frame * frame_width as u64 + start_offset as u64;
        file.seek(SeekFrom::Start(offset))?;
        read_fully(&mut file, &mut buf, channel, offset)?;
        segments.push(buf.clone());
    }
    Ok(segments)
}

/// Reads exactly `buf.len()` bytes or reports how far the file got.
fn read_fully(file: &mut File, buf: &mut [u8], channel: &str, offset: u64) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(XdfError::ShortRead {
                channel: channel.to_string(),
                offset,
                wanted: buf.len(),
                got: filled,
            });
        }
        filled += n;
    }
    Ok(())
}

/// Signal file reader for OpenXDF recordings.
///
/// A `SignalReader` pairs one raw interleaved signal file with the typed
/// header information of its [`Recording`] and reconstructs per-channel
/// epoch matrices from it: physical leads as raw integer samples, montage
/// channels crossed and band-pass filtered.
///
/// The frame layout is computed up front in [`SignalReader::new`], so a
/// malformed header fails before any file I/O is attempted. Nothing is
/// cached across reads: every call re-reads the file bytes it needs.
///
/// # Examples
///
/// ```rust
/// use openxdf::SignalReader;
///
/// # openxdf::doctest_utils::write_demo_signal("signals_demo.nkamp")?;
/// let recording = openxdf::doctest_utils::demo_recording();
/// let reader = SignalReader::new(&recording, "signals_demo.nkamp")?;
///
/// for label in reader.list_channels() {
///     println!("display channel: {label}");
/// }
///
/// let matrices = reader.read(&["C3-A2"])?;
/// // One row per epoch, sample_frequency * epoch_length columns.
/// assert_eq!(matrices["C3-A2"].dim(), (3, 4));
/// # std::fs::remove_file("signals_demo.nkamp").ok();
/// # Ok::<(), openxdf::XdfError>(())
/// ```
#[derive(Debug)]
pub struct SignalReader {
    path: PathBuf,
    layout: RecordingLayout,
    frame: FrameLayout,
    montages: Vec<MontageChannel>,
    filter_order: usize,
}

impl SignalReader {
    /// Creates a reader for `recording`'s signal file at `path`.
    ///
    /// Validates the header-declared sources and computes the frame layout;
    /// no file I/O happens here.
    ///
    /// # Errors
    ///
    /// * [`XdfError::MalformedSource`] - a source declares a zero sample
    ///   frequency or width, or the layout constants are unusable.
    pub fn new<P: AsRef<Path>>(recording: &Recording, path: P) -> Result<Self> {
        let frame = FrameLayout::from_recording(&recording.layout, &recording.sources)?;
        Ok(SignalReader {
            path: path.as_ref().to_path_buf(),
            layout: recording.layout,
            frame,
            montages: recording.montages.clone(),
            filter_order: DEFAULT_FILTER_ORDER,
        })
    }

    /// Overrides the Butterworth order used when filtering montage
    /// channels (default [`DEFAULT_FILTER_ORDER`]).
    pub fn with_filter_order(mut self, order: usize) -> Self {
        self.filter_order = order;
        self
    }

    /// All display channel labels defined by the recording's montages,
    /// unique, in document order.
    pub fn list_channels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for montage in &self.montages {
            if !labels.contains(&montage.label.as_str()) {
                labels.push(&montage.label);
            }
        }
        labels
    }

    /// Byte layout of one interleaved frame, as computed from the header.
    pub fn frame_layout(&self) -> &FrameLayout {
        &self.frame
    }

    /// Reads, crosses and filters the given display channels over the
    /// whole recording.
    ///
    /// Each channel is resolved through its first montage definition; each
    /// distinct physical lead is read and decoded once, in parallel across
    /// leads (the file is read-only and reads share no state, so execution
    /// order cannot affect per-channel sample order).
    ///
    /// There is no partial-success mode: the first failing channel aborts
    /// the whole call.
    ///
    /// # Errors
    ///
    /// * [`XdfError::UnknownChannel`] - a requested label has no montage
    ///   definition, or a montage references an undeclared lead (checked
    ///   before any file I/O).
    /// * [`XdfError::LeadFrequencyMismatch`] - a two-lead montage crosses
    ///   leads with different sample frequencies.
    /// * Any error of [`read_channel_segments`] or the numeric decoder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use openxdf::SignalReader;
    ///
    /// # openxdf::doctest_utils::write_demo_signal("signals_read.nkamp")?;
    /// let recording = openxdf::doctest_utils::demo_recording();
    /// let reader = SignalReader::new(&recording, "signals_read.nkamp")?;
    ///
    /// let matrices = reader.read(&["C3-A2"])?;
    /// let c3_a2 = &matrices["C3-A2"];
    /// println!("{} epochs of {} samples", c3_a2.nrows(), c3_a2.ncols());
    /// # std::fs::remove_file("signals_read.nkamp").ok();
    /// # Ok::<(), openxdf::XdfError>(())
    /// ```
    pub fn read(&self, channels: &[&str]) -> Result<BTreeMap<String, Array2<f64>>> {
        self.read_impl(channels, None)
    }

    /// Same as [`SignalReader::read`] over a `[start_second, end_second)`
    /// window, snapped outward to frame boundaries.
    pub fn read_window(
        &self,
        channels: &[&str],
        start_second: u64,
        end_second: u64,
    ) -> Result<BTreeMap<String, Array2<f64>>> {
        self.read_impl(channels, Some((start_second, end_second)))
    }

    /// Reads one physical lead's raw integer epoch matrix, without
    /// crossing or filtering.
    ///
    /// Most callers want [`SignalReader::read`]; this is the escape hatch
    /// for downstream calibration or custom referencing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use openxdf::SignalReader;
    ///
    /// # openxdf::doctest_utils::write_demo_signal("signals_raw.nkamp")?;
    /// let recording = openxdf::doctest_utils::demo_recording();
    /// let reader = SignalReader::new(&recording, "signals_raw.nkamp")?;
    ///
    /// let c3 = reader.read_source("C3")?;
    /// assert_eq!(c3[[0, 0]], -10);
    /// # std::fs::remove_file("signals_raw.nkamp").ok();
    /// # Ok::<(), openxdf::XdfError>(())
    /// ```
    pub fn read_source(&self, name: &str) -> Result<Array2<i64>> {
        self.read_source_impl(name, None)
    }

    /// Same as [`SignalReader::read_source`] over a
    /// `[start_second, end_second)` window.
    pub fn read_source_window(
        &self,
        name: &str,
        start_second: u64,
        end_second: u64,
    ) -> Result<Array2<i64>> {
        self.read_source_impl(name, Some((start_second, end_second)))
    }

    /// Calibration summary for each requested display channel, resolved
    /// from the lead that governs it (lead 1 when both are present). An
    /// empty `channels` slice returns every display channel.
    pub fn channel_info(&self, channels: &[&str]) -> Result<BTreeMap<String, ChannelInfo>> {
        let labels: Vec<&str> = if channels.is_empty() {
            self.list_channels()
        } else {
            channels.to_vec()
        };

        let mut info = BTreeMap::new();
        for label in labels {
            let montage = self
                .montage(label)
                .ok_or_else(|| XdfError::UnknownChannel(label.to_string()))?;
            let governing = governing_lead(montage)?;
            let slot = self
                .frame
                .slot(governing)
                .ok_or_else(|| XdfError::UnknownChannel(governing.to_string()))?;
            info.insert(
                label.to_string(),
                ChannelInfo {
                    sample_frequency: slot.channel.sample_frequency,
                    unit: slot.channel.unit.clone(),
                    physical_min: slot.channel.physical_min,
                    physical_max: slot.channel.physical_max,
                },
            );
        }
        Ok(info)
    }

    fn montage(&self, label: &str) -> Option<&MontageChannel> {
        self.montages.iter().find(|m| m.label == label)
    }

    fn read_impl(
        &self,
        channels: &[&str],
        window: Option<(u64, u64)>,
    ) -> Result<BTreeMap<String, Array2<f64>>> {
        // Resolve every requested label and validate every referenced lead
        // before touching the file.
        let mut wanted = Vec::with_capacity(channels.len());
        for &label in channels {
            let montage = self
                .montage(label)
                .ok_or_else(|| XdfError::UnknownChannel(label.to_string()))?;
            wanted.push(montage);
        }

        let mut leads: Vec<&str> = Vec::new();
        for montage in &wanted {
            for lead in [montage.lead_1.as_deref(), montage.lead_2.as_deref()]
                .into_iter()
                .flatten()
            {
                if !leads.contains(&lead) {
                    leads.push(lead);
                }
            }
        }
        for lead in &leads {
            if self.frame.slot(lead).is_none() {
                return Err(XdfError::UnknownChannel((*lead).to_string()));
            }
        }

        debug!(
            "reading {} montage channel(s) over {} physical lead(s)",
            wanted.len(),
            leads.len()
        );

        // Each lead extraction opens its own handle and owns its buffers,
        // so the fan-out is free of shared mutable state.
        let decoded = leads
            .par_iter()
            .map(|&lead| {
                self.read_source_impl(lead, window)
                    .map(|matrix| (lead.to_string(), matrix))
            })
            .collect::<Result<BTreeMap<String, Array2<i64>>>>()?;

        let mut out = BTreeMap::new();
        for montage in wanted {
            let matrix = self.resolve_montage(montage, &decoded)?;
            out.insert(montage.label.clone(), matrix);
        }
        Ok(out)
    }

    fn read_source_impl(&self, name: &str, window: Option<(u64, u64)>) -> Result<Array2<i64>> {
        let slot = self
            .frame
            .slot(name)
            .ok_or_else(|| XdfError::UnknownChannel(name.to_string()))?;
        let segments = read_channel_segments(
            &self.path,
            name,
            slot.start_offset,
            slot.channel.channel_width(self.layout.frame_length),
            self.frame.frame_width(),
            self.layout.frame_length,
            window,
        )?;
        decode_epochs(&segments, &slot.channel, &self.layout)
    }

    fn resolve_montage(
        &self,
        montage: &MontageChannel,
        decoded: &BTreeMap<String, Array2<i64>>,
    ) -> Result<Array2<f64>> {
        let governing = governing_lead(montage)?;
        let slot = self
            .frame
            .slot(governing)
            .ok_or_else(|| XdfError::UnknownChannel(governing.to_string()))?;

        if let (Some(_), Some(second)) = (&montage.lead_1, &montage.lead_2) {
            let second_slot = self
                .frame
                .slot(second)
                .ok_or_else(|| XdfError::UnknownChannel(second.clone()))?;
            if slot.channel.sample_frequency != second_slot.channel.sample_frequency {
                return Err(XdfError::LeadFrequencyMismatch {
                    montage: montage.label.clone(),
                    lhs: slot.channel.sample_frequency,
                    rhs: second_slot.channel.sample_frequency,
                });
            }
        }

        let lead_1 = montage.lead_1.as_deref().and_then(|n| decoded.get(n));
        let lead_2 = montage.lead_2.as_deref().and_then(|n| decoded.get(n));
        montage::resolve(
            montage,
            lead_1,
            lead_2,
            slot.channel.sample_frequency,
            self.filter_order,
        )
    }
}

/// The lead whose sample frequency governs a montage channel.
fn governing_lead(montage: &MontageChannel) -> Result<&str> {
    montage
        .lead_1
        .as_deref()
        .or(montage.lead_2.as_deref())
        .ok_or_else(|| XdfError::MalformedSource {
            name: montage.label.clone(),
            detail: "montage defines no leads".to_string(),
        })
}
