//! Integration tests for the container parsers
//!
//! These tests build synthetic DDS and PVR files byte by byte and cover:
//! - Full mip chain extraction and level sizes
//! - PVR v2 / v3 header corrections
//! - Cubemap face ordering
//! - Truncated payloads
//! - File parsing (plain read and memory mapped)

use std::io::Write;

use bytes::Bytes;
use proptest::prelude::*;
use smartex_core::{CubeFace, PixelFormat};
use smartex_parsers::dds::{caps2, flags, fourcc, pf_flags, DDS_MAGIC};
use smartex_parsers::pvr::{PVR_V2_MAGIC, PVR_V3_MAGIC};
use smartex_parsers::{detect_container, ContainerParser, DdsParser, ParseError, ParseOptions, PvrParser};

fn put(data: &mut [u8], word: usize, value: u32) {
    data[word * 4..word * 4 + 4].copy_from_slice(&value.to_le_bytes());
}

/// Build a DDS header with a FourCC pixel format
fn dds_header(code: &[u8; 4], width: u32, height: u32, mips: u32, cube_caps: u32) -> Vec<u8> {
    let mut data = vec![0u8; 128];
    put(&mut data, 0, DDS_MAGIC);
    put(&mut data, 1, 124);
    put(&mut data, 2, flags::CAPS | flags::HEIGHT | flags::WIDTH | flags::PIXEL_FORMAT | flags::MIPMAP_COUNT);
    put(&mut data, 3, height);
    put(&mut data, 4, width);
    put(&mut data, 7, mips);
    put(&mut data, 19, 32);
    put(&mut data, 20, pf_flags::FOURCC);
    put(&mut data, 21, fourcc(code));
    put(&mut data, 28, cube_caps);
    data
}

/// Bytes of a 4x4-block mip chain
fn block_chain_len(width: u32, height: u32, mips: u32, block_bytes: usize) -> usize {
    (0..mips)
        .map(|level| {
            let w = (width >> level).max(1) as usize;
            let h = (height >> level).max(1) as usize;
            (w / 4).max(1) * (h / 4).max(1) * block_bytes
        })
        .sum()
}

/// Payload where every byte is its index modulo 251
fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn dds_file(code: &[u8; 4], block_bytes: usize, width: u32, height: u32, mips: u32) -> Bytes {
    let mut data = dds_header(code, width, height, mips, 0);
    data.extend(payload(block_chain_len(width, height, mips, block_bytes)));
    Bytes::from(data)
}

#[test]
fn test_dxt1_512_full_chain() {
    let texture = DdsParser.parse(dds_file(b"DXT1", 8, 512, 512, 10)).unwrap();

    assert_eq!(texture.format, PixelFormat::RgbS3tcDxt1);
    assert!(!texture.is_cubemap);
    assert_eq!(texture.mip_count(), 10);
    assert_eq!(texture.mipmaps()[0].len(), 131_072);

    for (level, mip) in texture.mipmaps().iter().enumerate() {
        assert_eq!(mip.width, (512u32 >> level).max(1));
        assert_eq!(mip.height, (512u32 >> level).max(1));
    }

    // Last levels are clamped to a single block
    assert_eq!(texture.mipmaps()[9].width, 1);
    assert_eq!(texture.mipmaps()[9].len(), 8);
}

#[test]
fn test_levels_follow_each_other() {
    let raw = dds_file(b"DXT5", 16, 16, 16, 3);
    let texture = DdsParser.parse(raw.clone()).unwrap();

    let levels = texture.mipmaps();
    assert_eq!(levels[0].data, raw.slice(128..128 + 256));
    assert_eq!(levels[1].data, raw.slice(384..384 + 64));
    assert_eq!(levels[2].data, raw.slice(448..448 + 16));
}

#[test]
fn test_atc_and_etc_in_dds() {
    let atc = DdsParser.parse(dds_file(b"ATCA", 16, 8, 8, 1)).unwrap();
    assert_eq!(atc.format, PixelFormat::RgbaAtcExplicitAlpha);
    assert_eq!(atc.mipmaps()[0].len(), 64);

    let etc = DdsParser.parse(dds_file(b"ETC1", 8, 8, 8, 1)).unwrap();
    assert_eq!(etc.format, PixelFormat::RgbEtc1);
    assert_eq!(etc.mipmaps()[0].len(), 32);
}

#[test]
fn test_load_mipmaps_disabled() {
    let options = ParseOptions {
        load_mipmaps: false,
        ..ParseOptions::default()
    };
    let texture = DdsParser
        .parse_with_options(dds_file(b"DXT1", 8, 64, 64, 7), &options)
        .unwrap();

    assert_eq!(texture.mip_count(), 1);
    assert_eq!(texture.mipmaps()[0].len(), 16 * 16 * 8);
}

#[test]
fn test_uncompressed_bgra() {
    let mut data = dds_header(b"\0\0\0\0", 2, 1, 1, 0);
    put(&mut data, 20, pf_flags::RGB | pf_flags::ALPHAPIXELS);
    put(&mut data, 22, 32);
    put(&mut data, 23, 0x00FF_0000);
    put(&mut data, 24, 0x0000_FF00);
    put(&mut data, 25, 0x0000_00FF);
    put(&mut data, 26, 0xFF00_0000);
    data.extend([1, 2, 3, 4, 5, 6, 7, 8]);

    let texture = DdsParser.parse(Bytes::from(data)).unwrap();
    assert_eq!(texture.format, PixelFormat::Rgba8);
    assert_eq!(texture.mipmaps()[0].data.as_ref(), &[3, 2, 1, 4, 7, 6, 5, 8]);
}

#[test]
fn test_dds_cubemap_faces_in_order() {
    let mut data = dds_header(b"DXT1", 4, 4, 2, caps2::CUBEMAP | caps2::CUBEMAP_ALL_FACES);
    for face in 0..6u8 {
        // 4x4 and 2x2 levels, one block each
        data.extend([face; 16]);
    }

    let texture = DdsParser.parse(Bytes::from(data)).unwrap();
    assert!(texture.is_cubemap);
    assert_eq!(texture.faces.len(), 6);

    for face in CubeFace::ALL {
        let levels = &texture.face(face).unwrap().mipmaps;
        assert_eq!(levels.len(), 2);
        assert!(levels[1].data.iter().all(|&b| b == face.index() as u8));
    }
}

#[test]
fn test_dds_incomplete_cubemap() {
    let caps = caps2::CUBEMAP | (caps2::CUBEMAP_ALL_FACES & !caps2::CUBEMAP_NEGATIVEZ);
    let mut data = dds_header(b"DXT1", 4, 4, 1, caps);
    data.extend([0u8; 48]);

    let err = DdsParser.parse(Bytes::from(data)).unwrap_err();
    assert!(matches!(err, ParseError::IncompleteCubemap { .. }));
    assert!(err.is_parse_error());
}

#[test]
fn test_dds_truncated_payload() {
    let full = dds_file(b"DXT1", 8, 64, 64, 4);
    let short = full.slice(..full.len() - 1);

    let err = DdsParser.parse(short).unwrap_err();
    assert!(matches!(err, ParseError::TruncatedData { requested: 8, .. }));
}

#[test]
fn test_dds_unknown_fourcc() {
    let mut data = dds_header(b"DX10", 4, 4, 1, 0);
    data.extend([0u8; 16]);

    let err = DdsParser.parse(Bytes::from(data)).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported FourCC code 'DX10'");
}

fn pvr_v3_file(pixel_format: u32, size: u32, mips: u32, metadata: u32, payload_len: usize) -> Bytes {
    let mut data = vec![0u8; 52];
    put(&mut data, 0, PVR_V3_MAGIC);
    put(&mut data, 2, pixel_format);
    put(&mut data, 6, size);
    put(&mut data, 7, size);
    put(&mut data, 10, 1);
    put(&mut data, 11, mips);
    put(&mut data, 12, metadata);
    data.extend(vec![0xEEu8; metadata as usize]);
    data.extend(payload(payload_len));
    Bytes::from(data)
}

#[test]
fn test_pvr_v3_skips_metadata() {
    // 32x32 4bpp: 8*8 blocks of 8 bytes, 16x16: 4*4*8, 8x8: 2*2*8
    let raw = pvr_v3_file(3, 32, 3, 15, 512 + 128 + 32);
    let texture = PvrParser.parse(raw).unwrap();

    assert_eq!(texture.format, PixelFormat::RgbaPvrtc4bpp);
    assert_eq!(texture.mip_count(), 3);
    assert_eq!(texture.mipmaps()[0].len(), 512);
    assert_eq!(texture.mipmaps()[0].data[0], 0);
    assert_eq!(texture.mipmaps()[2].len(), 32);
}

#[test]
fn test_pvr_2bpp_minimum_blocks() {
    // 8x8 2bpp: max(1,2)*max(2,2) blocks of 8 bytes at every level
    let raw = pvr_v3_file(0, 8, 4, 0, 4 * 32);
    let texture = PvrParser.parse(raw).unwrap();

    assert_eq!(texture.format, PixelFormat::RgbPvrtc2bpp);
    assert!(texture.mipmaps().iter().all(|m| m.len() == 32));
}

#[test]
fn test_pvr_v2_mip_correction() {
    let mut data = vec![0u8; 52];
    put(&mut data, 0, 52);
    put(&mut data, 1, 16);
    put(&mut data, 2, 16);
    put(&mut data, 3, 2);
    put(&mut data, 4, 0x8000 | 0x100 | 24);
    put(&mut data, 10, 0);
    put(&mut data, 11, PVR_V2_MAGIC);
    // 16x16: 4*4*8, 8x8: 2*2*8, 4x4: 2*2*8
    data.extend(payload(128 + 32 + 32));

    let texture = PvrParser.parse(Bytes::from(data)).unwrap();
    assert_eq!(texture.format, PixelFormat::RgbPvrtc4bpp);
    assert_eq!(texture.mip_count(), 3);
    assert_eq!(texture.mipmaps()[2].width, 4);
}

#[test]
fn test_pvr_truncated() {
    let raw = pvr_v3_file(2, 32, 1, 0, 100);
    assert!(matches!(PvrParser.parse(raw), Err(ParseError::TruncatedData { .. })));
}

#[test]
fn test_pvr_unknown_version() {
    let err = PvrParser.parse(Bytes::from(vec![0u8; 64])).unwrap_err();
    assert!(matches!(err, ParseError::UnknownContainerVersion { .. }));
}

#[test]
fn test_parse_file_plain_and_mapped() {
    let raw = dds_file(b"DXT1", 8, 64, 64, 3);
    let mut file = tempfile::Builder::new().suffix(".dds").tempfile().unwrap();
    file.write_all(&raw).unwrap();

    let plain = DdsParser.parse_file(file.path()).unwrap();
    let mapped = DdsParser
        .parse_file_with_options(
            file.path(),
            &ParseOptions {
                memory_mapping_threshold: 0,
                ..ParseOptions::default()
            },
        )
        .unwrap();

    assert_eq!(plain, mapped);
    assert_eq!(plain.mip_count(), 3);
}

#[test]
fn test_detect_container_on_real_layouts() {
    let dds = dds_file(b"DXT1", 8, 4, 4, 1);
    let pvr = pvr_v3_file(0, 8, 1, 0, 32);

    assert_eq!(detect_container(&dds).unwrap().name(), "DDS Texture Parser");
    assert_eq!(detect_container(&pvr).unwrap().name(), "PVR Texture Parser");
}

proptest! {
    #[test]
    fn prop_mip_chain_dimensions_and_sizes(
        width_log in 0u32..11,
        height_log in 0u32..11,
        mips in 1u32..12,
    ) {
        let (width, height) = (1u32 << width_log, 1u32 << height_log);
        let texture = DdsParser.parse(dds_file(b"DXT5", 16, width, height, mips)).unwrap();

        prop_assert_eq!(texture.mip_count(), mips as usize);
        for (level, mip) in texture.mipmaps().iter().enumerate() {
            let w = (width >> level).max(1);
            let h = (height >> level).max(1);
            prop_assert_eq!((mip.width, mip.height), (w, h));
            prop_assert_eq!(mip.len(), ((w / 4).max(1) * (h / 4).max(1) * 16) as usize);
        }
    }

    #[test]
    fn prop_truncation_never_panics(cut in 0usize..(128 + 256 + 64 + 16)) {
        let raw = dds_file(b"DXT5", 16, 16, 16, 3);
        let result = DdsParser.parse(raw.slice(..cut));
        prop_assert!(result.is_err());
    }
}
