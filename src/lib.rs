//! # OpenXDF signal decoding for Rust
//!
//! A pure Rust library for reading the raw signal data paired with OpenXDF
//! polysomnography (PSG) recordings. An OpenXDF study is an XML header
//! document describing the recording session plus a flat binary file of
//! byte-interleaved frames; this crate takes the already-parsed, typed
//! header information (a [`Recording`]) and reconstructs per-channel
//! sample streams from the binary file: physical leads as raw integer
//! epoch matrices, montage channels crossed (`lead_1 - lead_2`) and
//! Butterworth band-pass filtered.
//!
//! XML parsing, de-identification and export formatting are deliberately
//! not part of this crate; any XML layer that can produce a [`Recording`]
//! works. Physical-unit calibration is likewise left downstream: decoded
//! samples are the file's integers, with the calibration fields passed
//! through on [`PhysicalChannel`].
//!
//! ## Quick start
//!
//! ```rust
//! use openxdf::SignalReader;
//!
//! # openxdf::doctest_utils::write_demo_signal("demo_recording.nkamp")?;
//! // A `Recording` normally comes from your XML layer.
//! let recording = openxdf::doctest_utils::demo_recording();
//!
//! let reader = SignalReader::new(&recording, "demo_recording.nkamp")?;
//! assert_eq!(reader.list_channels(), vec!["C3-A2"]);
//!
//! // Crossed and band-pass filtered display channels.
//! let matrices = reader.read(&["C3-A2"])?;
//! assert_eq!(matrices["C3-A2"].dim(), (3, 4));
//!
//! // Raw integer samples of a single physical lead.
//! let c3 = reader.read_source("C3")?;
//! assert_eq!(c3.nrows(), 3);
//! # std::fs::remove_file("demo_recording.nkamp").ok();
//! # Ok::<(), openxdf::XdfError>(())
//! ```
//!
//! ## Error handling
//!
//! Corruption is surfaced, never masked: a header that cannot describe a
//! decodable file fails before any file I/O, and a truncated signal file
//! fails with the channel name and offset instead of returning padded
//! data.
//!
//! ```rust
//! use openxdf::{SignalReader, XdfError};
//!
//! let mut recording = openxdf::doctest_utils::demo_recording();
//! recording.sources[0].sample_frequency = 0;
//!
//! // Fails during layout computation; the path is never opened.
//! match SignalReader::new(&recording, "does_not_exist.nkamp") {
//!     Err(XdfError::MalformedSource { name, .. }) => assert_eq!(name, "C3"),
//!     Err(other) => panic!("unexpected error: {other}"),
//!     Ok(_) => panic!("malformed header was accepted"),
//! }
//! ```

pub mod decode;
pub mod error;
pub mod filter;
pub mod layout;
pub mod montage;
pub mod reader;
pub mod types;
pub mod utils;

#[doc(hidden)]
pub mod doctest_utils; // For internal doctest support

// Re-export main types for convenience
pub use error::{Result, XdfError};
pub use filter::BandPass;
pub use layout::{ChannelSlot, FrameLayout};
pub use reader::{read_channel_segments, SignalReader};
pub use types::{
    ChannelInfo, Endian, EpochRecord, MontageChannel, PhysicalChannel, Recording,
    RecordingLayout,
};

/// Butterworth order used for montage band-pass filters unless configured
/// otherwise via [`SignalReader::with_filter_order`].
pub const DEFAULT_FILTER_ORDER: usize = 5;

/// Library version
///
/// Returns the current version of the openxdf library.
///
/// # Examples
///
/// ```rust
/// let version = openxdf::version();
/// assert!(!version.is_empty());
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
