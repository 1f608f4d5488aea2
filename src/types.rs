use chrono::NaiveDateTime;

/// Byte order of multi-byte samples in the raw signal file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Per-recording layout constants taken from the XDF header document.
///
/// Immutable once read from the header. Epoch boundaries are assumed to
/// align with frame boundaries.
#[derive(Debug, Clone, Copy)]
pub struct RecordingLayout {
    /// Length of one interleaved frame, in seconds.
    pub frame_length: u32,
    /// Length of one scoring epoch, in seconds (conventionally 30).
    pub epoch_length: u32,
    pub endian: Endian,
}

/// One raw recorded lead as declared in the header, in document order.
///
/// The calibration fields (`unit`, `physical_*`, `digital_*`) are passed
/// through untouched for a downstream calibration step; the decoder never
/// scales samples.
#[derive(Debug, Clone)]
pub struct PhysicalChannel {
    pub name: String,
    /// Sample size in bytes: 1, 2, 4 or 8.
    pub sample_width: usize,
    /// Sampling rate in Hz.
    pub sample_frequency: u32,
    /// True when samples are two's-complement signed.
    pub signed: bool,
    pub unit: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i64,
    pub digital_max: i64,
}

impl PhysicalChannel {
    /// Number of bytes this channel contributes to one frame.
    pub fn channel_width(&self, frame_length: u32) -> usize {
        self.sample_width * self.sample_frequency as usize * frame_length as usize
    }

    /// Number of samples this channel contributes to one epoch.
    pub fn samples_per_epoch(&self, epoch_length: u32) -> usize {
        self.sample_frequency as usize * epoch_length as usize
    }
}

/// A display channel derived from one or two physical leads plus a
/// band-pass filter, used for clinical review.
///
/// At least one lead must be present. When both are present the montage
/// signal is `lead_1 - lead_2`, sampled at `lead_1`'s frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct MontageChannel {
    pub label: String,
    pub lead_1: Option<String>,
    pub lead_2: Option<String>,
    /// Low band-pass cutoff in Hz.
    pub low_cut: f64,
    /// High band-pass cutoff in Hz.
    pub high_cut: f64,
}

/// One scored epoch from the recording's scoring metadata.
#[derive(Debug, Clone)]
pub struct EpochRecord {
    pub epoch_number: usize,
    /// Sleep stage assigned by the scorer, carried as opaque data.
    pub stage: Option<String>,
}

/// Calibration summary for one display channel, resolved from the lead
/// that governs it.
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub sample_frequency: u32,
    pub unit: String,
    pub physical_min: f64,
    pub physical_max: f64,
}

/// The normalized output of the XML header collaborator for one recording.
///
/// Everything a [`crate::SignalReader`](crate::SignalReader) needs to decode
/// the paired raw signal file: layout constants, physical channel
/// descriptors in header-declared order, montage definitions in document
/// order, and epoch scoring metadata. All fields are immutable once
/// constructed; the decoder never mutates them.
#[derive(Debug, Clone)]
pub struct Recording {
    pub id: String,
    /// Name of the paired raw signal file, as recorded in the header.
    pub data_file: String,
    pub start_time: Option<NaiveDateTime>,
    pub layout: RecordingLayout,
    pub sources: Vec<PhysicalChannel>,
    /// A label may appear more than once; the first definition wins.
    pub montages: Vec<MontageChannel>,
    pub epochs: Vec<EpochRecord>,
}

impl Recording {
    pub fn header(&self) -> &RecordingLayout {
        &self.layout
    }

    pub fn sources(&self) -> &[PhysicalChannel] {
        &self.sources
    }

    /// All montage definitions in document order, including duplicate
    /// labels.
    pub fn montages(&self) -> &[MontageChannel] {
        &self.montages
    }

    pub fn epochs(&self) -> &[EpochRecord] {
        &self.epochs
    }

    /// Looks up a physical channel descriptor by name.
    pub fn source(&self, name: &str) -> Option<&PhysicalChannel> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Returns the first montage definition for `label`, if any.
    pub fn montage(&self, label: &str) -> Option<&MontageChannel> {
        self.montages.iter().find(|m| m.label == label)
    }

    /// All display channel labels, unique, in document order.
    pub fn list_channels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for montage in &self.montages {
            if !labels.contains(&montage.label.as_str()) {
                labels.push(&montage.label);
            }
        }
        labels
    }

    /// Number of scored epochs, derived as the highest epoch number in the
    /// scoring metadata. This is informational only: decoded matrix shapes
    /// are always governed by the signal file itself.
    pub fn num_scored_epochs(&self) -> usize {
        self.epochs.iter().map(|e| e.epoch_number).max().unwrap_or(0)
    }
}
