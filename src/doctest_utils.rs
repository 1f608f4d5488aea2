// Internal utilities for documentation tests
// This file contains helper functions to generate recordings and signal
// files for doctests

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::types::{
    Endian, EpochRecord, MontageChannel, PhysicalChannel, Recording, RecordingLayout,
};

fn demo_source(name: &str) -> PhysicalChannel {
    PhysicalChannel {
        name: name.to_string(),
        sample_width: 2,
        sample_frequency: 4,
        signed: true,
        unit: "uV".to_string(),
        physical_min: -3200.0,
        physical_max: 3200.0,
        digital_min: -32768,
        digital_max: 32767,
    }
}

/// A two-lead recording matching the signal file written by
/// [`write_demo_signal`]: sources `C3` and `A2` (2 bytes, 4 Hz, signed,
/// little-endian) and one bipolar montage channel `C3-A2`.
pub fn demo_recording() -> Recording {
    Recording {
        id: "DOC001".to_string(),
        data_file: "demo.nkamp".to_string(),
        start_time: None,
        layout: RecordingLayout {
            frame_length: 1,
            epoch_length: 1,
            endian: Endian::Little,
        },
        sources: vec![demo_source("C3"), demo_source("A2")],
        montages: vec![MontageChannel {
            label: "C3-A2".to_string(),
            lead_1: Some("C3".to_string()),
            lead_2: Some("A2".to_string()),
            low_cut: 0.3,
            high_cut: 1.9,
        }],
        epochs: vec![
            EpochRecord { epoch_number: 1, stage: Some("W".to_string()) },
            EpochRecord { epoch_number: 2, stage: Some("W".to_string()) },
            EpochRecord { epoch_number: 3, stage: Some("N1".to_string()) },
        ],
    }
}

/// Writes three frames of interleaved little-endian data for
/// [`demo_recording`]: `C3` sample `k` is `5k - 10`, `A2` sample `k` is
/// `k`, for `k` in `0..12`.
pub fn write_demo_signal<P: AsRef<Path>>(path: P) -> Result<()> {
    let mut file = File::create(path)?;
    for frame in 0..3i16 {
        let mut bytes = Vec::with_capacity(16);
        for i in 0..4i16 {
            let k = frame * 4 + i;
            bytes.extend_from_slice(&(5 * k - 10).to_le_bytes());
        }
        for i in 0..4i16 {
            let k = frame * 4 + i;
            bytes.extend_from_slice(&k.to_le_bytes());
        }
        file.write_all(&bytes)?;
    }
    Ok(())
}
