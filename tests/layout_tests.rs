use openxdf::{
    decode, Endian, FrameLayout, PhysicalChannel, Recording, RecordingLayout, SignalReader,
    XdfError,
};

fn source(name: &str, width: usize, freq: u32) -> PhysicalChannel {
    PhysicalChannel {
        name: name.to_string(),
        sample_width: width,
        sample_frequency: freq,
        signed: true,
        unit: "uV".to_string(),
        physical_min: -3200.0,
        physical_max: 3200.0,
        digital_min: -32768,
        digital_max: 32767,
    }
}

fn layout() -> RecordingLayout {
    RecordingLayout {
        frame_length: 1,
        epoch_length: 30,
        endian: Endian::Little,
    }
}

#[test]
fn test_frame_width_is_sum_of_channel_widths() {
    let sources = vec![
        source("EOG-L", 2, 200),
        source("SpO2", 1, 10),
        source("Pulse", 4, 50),
        source("Marker", 8, 1),
    ];
    let frame = FrameLayout::from_recording(&layout(), &sources).unwrap();

    let expected: usize = sources
        .iter()
        .map(|s| s.channel_width(1))
        .sum();
    assert_eq!(frame.frame_width(), expected);
    assert_eq!(frame.frame_width(), 400 + 10 + 200 + 8);
}

#[test]
fn test_offsets_are_gapless_and_in_declared_order() {
    let sources = vec![source("A", 2, 4), source("B", 1, 2), source("C", 4, 8)];
    let frame = FrameLayout::from_recording(&layout(), &sources).unwrap();

    let mut expected_offset = 0;
    for (slot, declared) in frame.slots().iter().zip(&sources) {
        assert_eq!(slot.channel.name, declared.name);
        assert_eq!(slot.start_offset, expected_offset);
        expected_offset += declared.channel_width(1);
    }
    assert_eq!(frame.frame_width(), expected_offset);
}

#[test]
fn test_zero_sample_frequency_fails_before_any_io() {
    let recording = Recording {
        id: "T004".to_string(),
        data_file: "t004.nkamp".to_string(),
        start_time: None,
        layout: layout(),
        sources: vec![source("A", 2, 4), source("Broken", 2, 0)],
        montages: Vec::new(),
        epochs: Vec::new(),
    };

    // The path does not exist; layout validation must fail first.
    let err = SignalReader::new(&recording, "/nonexistent/t004.nkamp").unwrap_err();
    match err {
        XdfError::MalformedSource { name, detail } => {
            assert_eq!(name, "Broken");
            assert!(detail.contains("sample frequency"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_zero_sample_width_is_rejected() {
    let err = FrameLayout::from_recording(&layout(), &[source("A", 0, 4)]).unwrap_err();
    assert!(matches!(err, XdfError::MalformedSource { name, .. } if name == "A"));
}

#[test]
fn test_odd_sample_width_is_rejected() {
    let err = FrameLayout::from_recording(&layout(), &[source("A", 3, 4)]).unwrap_err();
    assert!(matches!(err, XdfError::MalformedSource { .. }));
}

#[test]
fn test_duplicate_source_name_is_rejected() {
    let err =
        FrameLayout::from_recording(&layout(), &[source("A", 2, 4), source("A", 2, 4)])
            .unwrap_err();
    assert!(matches!(err, XdfError::MalformedSource { detail, .. } if detail.contains("duplicate")));
}

#[test]
fn test_decode_round_trip_per_width() {
    // k samples encoded at width w decode back to the same k integers.
    let values: [i64; 4] = [-2, -1, 0, 127];

    let mut bytes = Vec::new();
    for v in values {
        bytes.push(v as i8 as u8);
    }
    assert_eq!(
        decode::decode_segment(&bytes, 1, Endian::Little, true).unwrap(),
        values
    );

    let mut bytes = Vec::new();
    for v in values {
        bytes.extend_from_slice(&(v as i16).to_le_bytes());
    }
    assert_eq!(
        decode::decode_segment(&bytes, 2, Endian::Little, true).unwrap(),
        values
    );

    let mut bytes = Vec::new();
    for v in values {
        bytes.extend_from_slice(&(v as i32).to_be_bytes());
    }
    assert_eq!(
        decode::decode_segment(&bytes, 4, Endian::Big, true).unwrap(),
        values
    );

    let mut bytes = Vec::new();
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    assert_eq!(
        decode::decode_segment(&bytes, 8, Endian::Little, true).unwrap(),
        values
    );

    // Unsigned decoding does not sign-extend.
    let unsigned = decode::decode_segment(&[0xFF, 0xFE], 1, Endian::Little, false).unwrap();
    assert_eq!(unsigned, vec![255, 254]);
}
