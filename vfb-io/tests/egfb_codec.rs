use vfb_io::egfb::{self, EgfbError, FrameReader, MAX_FRAME_LEN};
use vfb_io::{IoError, read_egfb, write_egfb};

const TWO_LINES: &str = "M(400,300,#fff)\nH#01 = R(50,50,100,75) S(#000,#ff0000)";

#[test]
fn encodes_reference_program_byte_for_byte() {
    let bytes = egfb::encode(TWO_LINES).unwrap();
    let first = b"M(400,300,#fff)";
    let second = b"H#01 = R(50,50,100,75) S(#000,#ff0000)";

    let mut expected = b"EGFB".to_vec();
    expected.push(0x01);
    expected.extend_from_slice(&(first.len() as u16).to_le_bytes());
    expected.extend_from_slice(first);
    expected.push(0x10);
    expected.extend_from_slice(&(second.len() as u16).to_le_bytes());
    expected.extend_from_slice(second);
    expected.push(0xFF);

    assert_eq!(bytes, expected);
}

#[test]
fn every_opcode_is_tagged_from_its_prefix() {
    let text = "M(1,1)\nR(0,0,1,1)\nC(0,0,1)\nL(0,0,1,1)\nP[M 0 0]\nE(0,0,1,1)\n\
                PG[0,0 1,1]\nPL[0,0 1,1]\nH#01 = C(0,0,1)\nCALL#01 T(0,0,1,0)\nG[<g/>]\nwhat";
    let bytes = egfb::encode(text).unwrap();
    let opcodes: Vec<u8> = FrameReader::new(&bytes)
        .unwrap()
        .map(|frame| frame.opcode)
        .collect();
    assert_eq!(
        opcodes,
        vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x10, 0x11, 0x00, 0x00]
    );
}

#[test]
fn decode_normalizes_whitespace_and_blank_lines() {
    let text = "  M(10,10,#fff)  \n\n\t\nCALL#01 T(0,0,1,0)\r\n";
    let decoded = egfb::decode(&egfb::encode(text).unwrap()).unwrap();
    assert_eq!(decoded, "M(10,10,#fff)\nCALL#01 T(0,0,1,0)\n");
}

#[test]
fn oversized_line_is_rejected_not_truncated() {
    let text = format!("M(1,1)\n{}", "x".repeat(MAX_FRAME_LEN + 1));
    assert_eq!(
        egfb::encode(&text),
        Err(EgfbError::LineTooLong {
            line: 2,
            len: MAX_FRAME_LEN + 1,
            max: MAX_FRAME_LEN,
        })
    );
}

#[test]
fn truncated_stream_returns_complete_frames_only() {
    let bytes = egfb::encode(TWO_LINES).unwrap();

    // 截在第二帧载荷中间
    let cut = &bytes[..bytes.len() - 10];
    assert_eq!(egfb::decode(cut).unwrap(), "M(400,300,#fff)\n");

    // 截在长度字段中间
    let cut = &bytes[..4 + 1 + 2 + 15 + 2];
    assert_eq!(egfb::decode(cut).unwrap(), "M(400,300,#fff)\n");

    // 缺少结束标记
    let cut = &bytes[..bytes.len() - 1];
    let mut reader = FrameReader::new(cut).unwrap();
    assert_eq!(reader.by_ref().count(), 2);
    assert!(!reader.is_terminated());
    assert!(!reader.is_truncated());
}

#[test]
fn frame_length_counts_utf8_bytes_not_characters() {
    let line = "G[<text>héllo</text>]";
    assert_eq!(line.chars().count(), 21);
    assert_eq!(line.len(), 22);

    let bytes = egfb::encode(line).unwrap();
    assert_eq!(bytes[4], 0x00);
    assert_eq!(&bytes[5..7], &22u16.to_le_bytes());
    assert_eq!(&bytes[7..29], line.as_bytes());
    assert_eq!(bytes[29], 0xFF);
    assert_eq!(bytes.len(), 30);

    assert_eq!(egfb::decode(&bytes).unwrap(), format!("{line}\n"));
}

#[test]
fn invalid_utf8_payload_is_decoded_lossily() {
    let bytes = [b'E', b'G', b'F', b'B', 0x00, 0x02, 0x00, 0xC3, 0x28, 0xFF];
    assert_eq!(egfb::decode(&bytes).unwrap(), "\u{FFFD}(\n");
}

#[test]
fn file_helpers_write_nothing_on_encode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.egfb");

    let err = write_egfb(&path, &"y".repeat(MAX_FRAME_LEN + 1)).unwrap_err();
    assert!(matches!(err, IoError::Egfb(EgfbError::LineTooLong { .. })));
    assert!(!path.exists());

    write_egfb(&path, TWO_LINES).unwrap();
    assert_eq!(read_egfb(&path).unwrap(), format!("{TWO_LINES}\n"));

    std::fs::write(&path, b"NOPE").unwrap();
    assert!(matches!(
        read_egfb(&path),
        Err(IoError::Egfb(EgfbError::InvalidMagic))
    ));
}
