use std::collections::HashSet;

use log::debug;

use crate::error::{Result, XdfError};
use crate::types::{PhysicalChannel, RecordingLayout};

/// One physical channel's position within an interleaved frame.
#[derive(Debug, Clone)]
pub struct ChannelSlot {
    pub channel: PhysicalChannel,
    /// Byte offset of this channel's segment from the start of a frame.
    pub start_offset: usize,
}

/// Byte layout of one interleaved frame.
///
/// Offsets are assigned by cumulative sum over the channels in
/// header-declared order, so the slots cover the frame with no gaps or
/// overlaps and `frame_width` equals the sum of all channel widths.
/// Built once per recording and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FrameLayout {
    slots: Vec<ChannelSlot>,
    frame_width: usize,
}

impl FrameLayout {
    /// Derives the frame layout from the header's layout constants and the
    /// physical channels in header-declared order.
    ///
    /// Pure function of header data; no file I/O happens here or is
    /// attempted afterwards if this fails.
    ///
    /// # Errors
    ///
    /// * [`XdfError::MalformedSource`] - a channel declares a zero sample
    ///   frequency or width (the file cannot be decoded), a width outside
    ///   1/2/4/8, a duplicate name, or the header itself carries a zero
    ///   frame or epoch length.
    pub fn from_recording(
        layout: &RecordingLayout,
        sources: &[PhysicalChannel],
    ) -> Result<Self> {
        if layout.frame_length == 0 {
            return Err(XdfError::MalformedSource {
                name: "header".to_string(),
                detail: "frame length has 0 value".to_string(),
            });
        }
        if layout.epoch_length == 0 {
            return Err(XdfError::MalformedSource {
                name: "header".to_string(),
                detail: "epoch length has 0 value".to_string(),
            });
        }

        let mut slots = Vec::with_capacity(sources.len());
        let mut seen: HashSet<&str> = HashSet::with_capacity(sources.len());
        let mut total_width = 0usize;

        for source in sources {
            if source.sample_frequency == 0 {
                return Err(XdfError::MalformedSource {
                    name: source.name.clone(),
                    detail: "sample frequency has 0 value".to_string(),
                });
            }
            if source.sample_width == 0 {
                return Err(XdfError::MalformedSource {
                    name: source.name.clone(),
                    detail: "sample width has 0 value".to_string(),
                });
            }
            if !matches!(source.sample_width, 1 | 2 | 4 | 8) {
                return Err(XdfError::MalformedSource {
                    name: source.name.clone(),
                    detail: format!("unsupported sample width {}", source.sample_width),
                });
            }
            if !seen.insert(&source.name) {
                return Err(XdfError::MalformedSource {
                    name: source.name.clone(),
                    detail: "duplicate source name".to_string(),
                });
            }

            slots.push(ChannelSlot {
                channel: source.clone(),
                start_offset: total_width,
            });
            total_width += source.channel_width(layout.frame_length);
        }

        debug!(
            "frame layout: {} channels, {} bytes per frame",
            slots.len(),
            total_width
        );

        Ok(FrameLayout {
            slots,
            frame_width: total_width,
        })
    }

    /// Looks up a channel's slot by name.
    pub fn slot(&self, name: &str) -> Option<&ChannelSlot> {
        self.slots.iter().find(|s| s.channel.name == name)
    }

    pub fn slots(&self) -> &[ChannelSlot] {
        &self.slots
    }

    /// Total width of one interleaved frame in bytes.
    pub fn frame_width(&self) -> usize {
        self.frame_width
    }
}
