use ndarray::{aview1, Array2};

use crate::error::{Result, XdfError};
use crate::types::{Endian, PhysicalChannel, RecordingLayout};

/// Converts a fixed-width byte segment into integer samples.
///
/// Each `sample_width`-byte chunk is interpreted as a two's-complement
/// (when `signed`) or unsigned integer in the declared byte order. No
/// physical-unit scaling is performed; calibration is a downstream step.
///
/// # Errors
///
/// * [`XdfError::InvalidSampleWidth`] - segment length is not an exact
///   multiple of `sample_width` (a layout/offset bug or a corrupt file).
/// * [`XdfError::UnsupportedSampleWidth`] - width is not 1, 2, 4 or 8.
pub fn decode_segment(
    segment: &[u8],
    sample_width: usize,
    endian: Endian,
    signed: bool,
) -> Result<Vec<i64>> {
    if sample_width == 0 || segment.len() % sample_width != 0 {
        return Err(XdfError::InvalidSampleWidth {
            len: segment.len(),
            width: sample_width,
        });
    }

    let mut samples = Vec::with_capacity(segment.len() / sample_width);
    for chunk in segment.chunks_exact(sample_width) {
        samples.push(decode_sample(chunk, endian, signed)?);
    }
    Ok(samples)
}

fn decode_sample(chunk: &[u8], endian: Endian, signed: bool) -> Result<i64> {
    let value = match (chunk.len(), signed, endian) {
        (1, true, _) => chunk[0] as i8 as i64,
        (1, false, _) => chunk[0] as i64,
        (2, true, Endian::Little) => i16::from_le_bytes(fixed(chunk)) as i64,
        (2, true, Endian::Big) => i16::from_be_bytes(fixed(chunk)) as i64,
        (2, false, Endian::Little) => u16::from_le_bytes(fixed(chunk)) as i64,
        (2, false, Endian::Big) => u16::from_be_bytes(fixed(chunk)) as i64,
        (4, true, Endian::Little) => i32::from_le_bytes(fixed(chunk)) as i64,
        (4, true, Endian::Big) => i32::from_be_bytes(fixed(chunk)) as i64,
        (4, false, Endian::Little) => u32::from_le_bytes(fixed(chunk)) as i64,
        (4, false, Endian::Big) => u32::from_be_bytes(fixed(chunk)) as i64,
        (8, true, Endian::Little) => i64::from_le_bytes(fixed(chunk)),
        (8, true, Endian::Big) => i64::from_be_bytes(fixed(chunk)),
        (8, false, Endian::Little) => u64::from_le_bytes(fixed(chunk)) as i64,
        (8, false, Endian::Big) => u64::from_be_bytes(fixed(chunk)) as i64,
        (width, _, _) => return Err(XdfError::UnsupportedSampleWidth(width)),
    };
    Ok(value)
}

fn fixed<const N: usize>(chunk: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(chunk);
    buf
}

/// Decodes one channel's frame segments and reshapes them into one row per
/// epoch.
///
/// Segments are decoded in order and concatenated, then split into rows of
/// `sample_frequency * epoch_length` samples. Trailing samples that do not
/// fill a complete epoch are dropped. When the epoch length equals the
/// frame length this yields exactly one row per frame.
pub fn decode_epochs(
    segments: &[Vec<u8>],
    channel: &PhysicalChannel,
    layout: &RecordingLayout,
) -> Result<Array2<i64>> {
    let samples_per_epoch = channel.samples_per_epoch(layout.epoch_length);
    if samples_per_epoch == 0 {
        return Err(XdfError::MalformedSource {
            name: channel.name.clone(),
            detail: "sample frequency has 0 value".to_string(),
        });
    }

    let total_bytes: usize = segments.iter().map(|s| s.len()).sum();
    let mut samples = Vec::with_capacity(total_bytes / channel.sample_width.max(1));
    for segment in segments {
        samples.extend(decode_segment(
            segment,
            channel.sample_width,
            layout.endian,
            channel.signed,
        )?);
    }

    let num_epochs = samples.len() / samples_per_epoch;
    let mut matrix = Array2::<i64>::zeros((num_epochs, samples_per_epoch));
    for (row, chunk) in samples.chunks_exact(samples_per_epoch).enumerate() {
        matrix.row_mut(row).assign(&aview1(chunk));
    }
    Ok(matrix)
}
