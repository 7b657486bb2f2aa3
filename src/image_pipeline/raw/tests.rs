use crate::image_pipeline::common::{Image, PipelineError};
use crate::image_pipeline::raw::*;

fn pack_raw10(rows: &[[u16; 4]], stride: usize) -> Vec<u8> {
    let mut data = vec![0u8; stride * rows.len()];
    for (r, samples) in rows.iter().enumerate() {
        let row = &mut data[r * stride..];
        for (p, &s) in samples.iter().enumerate() {
            row[p] = (s >> 2) as u8;
            row[4] |= ((s & 0x03) as u8) << (2 * p);
        }
    }
    data
}

fn flat_planes(value: u16, width: usize, height: usize) -> [Image<u16>; 4] {
    std::array::from_fn(|_| Image::filled(width, height, 1, value))
}

#[test]
fn test_arrangement_codes() {
    assert_eq!(SensorArrangement::try_from(0).unwrap(), SensorArrangement::Rggb);
    assert_eq!(SensorArrangement::try_from(3).unwrap(), SensorArrangement::Bggr);
    assert!(matches!(
        SensorArrangement::try_from(7),
        Err(PipelineError::InvalidSensorArrangement(7))
    ));
}

#[test]
fn test_canonical_order_finds_each_colour() {
    // colour at each quad position, in plane order
    let layouts = [
        (SensorArrangement::Rggb, [0, 1, 1, 2]),
        (SensorArrangement::Grbg, [1, 0, 2, 1]),
        (SensorArrangement::Gbrg, [1, 2, 0, 1]),
        (SensorArrangement::Bggr, [2, 1, 1, 0]),
    ];
    for (arrangement, colors) in layouts {
        let order = arrangement.canonical_order();
        assert_eq!(colors[order[0]], 0, "{arrangement:?} red");
        assert_eq!(colors[order[1]], 1, "{arrangement:?} green 1");
        assert_eq!(colors[order[2]], 1, "{arrangement:?} green 2");
        assert_eq!(colors[order[3]], 2, "{arrangement:?} blue");
        assert_eq!(SensorArrangement::from_cfa_colors(colors), Some(arrangement));
    }
    assert_eq!(SensorArrangement::from_cfa_colors([0, 0, 1, 2]), None);
}

#[test]
fn test_shading_map_upsample_is_centre_aligned() {
    let map = ShadingMap::new(2, 1, vec![1.0, 2.0]).unwrap();
    let gains = map.upsample(4, 2);

    let row: Vec<f32> = (0..4).map(|x| gains.get(x, 1, 0)).collect();
    assert_eq!(row, vec![1.0, 1.25, 1.75, 2.0]);
}

#[test]
fn test_unit_shading_map() {
    let gains = ShadingMap::unit().upsample(5, 3);
    assert!(gains.data().iter().all(|&g| g == 1.0));
    assert!(ShadingMap::new(0, 2, Vec::new()).is_err());
}

#[test]
fn test_deinterleave_raw16_with_padding() {
    let stride = 10;
    let mut data = vec![0u8; stride * 2];
    for y in 0..2 {
        for x in 0..4 {
            let v = (y * 4 + x) as u16 * 1000;
            data[y * stride + x * 2..y * stride + x * 2 + 2].copy_from_slice(&v.to_le_bytes());
        }
    }

    let planes = deinterleave(&data, 4, 2, stride, PackedFormat::Raw16).unwrap();

    assert_eq!(planes[0].data(), &[0, 2000]);
    assert_eq!(planes[1].data(), &[1000, 3000]);
    assert_eq!(planes[2].data(), &[4000, 6000]);
    assert_eq!(planes[3].data(), &[5000, 7000]);
}

#[test]
fn test_deinterleave_raw10() {
    let data = pack_raw10(&[[1023, 512, 3, 700], [100, 200, 300, 400]], 6);

    let planes = deinterleave(&data, 4, 2, 6, PackedFormat::Raw10).unwrap();

    assert_eq!(planes[0].data(), &[1023, 3]);
    assert_eq!(planes[1].data(), &[512, 700]);
    assert_eq!(planes[2].data(), &[100, 300]);
    assert_eq!(planes[3].data(), &[200, 400]);
}

#[test]
fn test_deinterleave_rejects_bad_geometry() {
    let data = vec![0u8; 64];
    assert!(matches!(
        deinterleave(&data, 3, 2, 8, PackedFormat::Raw16),
        Err(PipelineError::InvalidDimensions(3, 2))
    ));
    assert!(matches!(
        deinterleave(&data, 6, 2, 8, PackedFormat::Raw10),
        Err(PipelineError::InvalidDimensions(6, 2))
    ));
    assert!(matches!(
        deinterleave(&data, 8, 2, 8, PackedFormat::Raw16),
        Err(PipelineError::DecodeError(_))
    ));
    assert!(matches!(
        deinterleave(&data, 4, 8, 10, PackedFormat::Raw16),
        Err(PipelineError::DecodeError(_))
    ));
}

#[test]
fn test_levels_normalize_into_range() {
    let levels = SensorLevels::uniform(64.0, 1023.0);
    let planes: [Image<u16>; 4] = std::array::from_fn(|_| {
        Image::from_vec(4, 1, 1, vec![0, 64, 1023, 4000]).unwrap()
    });

    let normalized = levels.normalize(planes, 16384.0).unwrap();

    assert_eq!(normalized[2].data(), &[0, 0, 16384, 16384]);

    let inverted = SensorLevels::uniform(100.0, 50.0);
    assert!(inverted.normalize(flat_planes(0, 1, 1), 16384.0).is_err());
}

#[test]
fn test_raw_frame_validation() {
    let frame = RawFrame::new(flat_planes(100, 4, 3), SensorArrangement::Grbg).unwrap();
    assert_eq!(frame.plane_dimensions(), (4, 3));
    assert_eq!(frame.output_dimensions(), (8, 6));
    assert_eq!(frame.range, DEFAULT_WORKING_RANGE);

    let mut planes = flat_planes(0, 4, 3);
    planes[3] = Image::new(4, 2, 1);
    assert!(matches!(
        RawFrame::new(planes, SensorArrangement::Rggb),
        Err(PipelineError::DimensionMismatch { .. })
    ));

    assert!(matches!(
        RawFrame::new(flat_planes(0, 0, 0), SensorArrangement::Rggb),
        Err(PipelineError::InvalidDimensions(0, 0))
    ));

    let too_wide = RawFrame::new(flat_planes(0, 2, 2), SensorArrangement::Rggb)
        .unwrap()
        .with_range(65535.0);
    assert!(matches!(too_wide.validate(), Err(PipelineError::InvalidParameter(_))));
}

#[test]
fn test_packed_reader_builds_frame() {
    let metadata = FrameMetadata {
        arrangement: SensorArrangement::Bggr,
        levels: SensorLevels::uniform(0.0, 1023.0),
        ..FrameMetadata::default()
    };
    let data = pack_raw10(&[[1023, 0, 1023, 0], [0, 1023, 0, 1023]], 5);
    let reader = PackedRawReader::new(4, 2, 5, PackedFormat::Raw10, metadata).with_range(1000.0);

    let frame = reader.read_frame(&data).unwrap();

    assert_eq!(frame.arrangement, SensorArrangement::Bggr);
    assert_eq!(frame.range, 1000.0);
    assert_eq!(frame.planes[0].data(), &[1000, 1000]);
    assert_eq!(frame.planes[1].data(), &[0, 0]);
    assert_eq!(frame.planes[3].data(), &[1000, 1000]);
}

#[test]
fn test_rawloader_reader_rejects_garbage() {
    let reader = RawLoaderReader::new();
    assert!(matches!(
        reader.read_frame(b"definitely not a raw file"),
        Err(PipelineError::DecodeError(_))
    ));
}

#[test]
fn test_split_mosaic_integer_and_float_samples() {
    use super::rawloader_reader::split_mosaic;

    // 4x2 mosaic: R G R G / G B G B
    let integer: Vec<u16> = vec![10, 20, 11, 21, 30, 40, 31, 41];
    let planes = split_mosaic(&integer, 4, 2, |v| v).unwrap();
    assert_eq!(planes[0].data(), &[10, 11]);
    assert_eq!(planes[1].data(), &[20, 21]);
    assert_eq!(planes[2].data(), &[30, 31]);
    assert_eq!(planes[3].data(), &[40, 41]);
    // samples are borrowed, not consumed
    assert_eq!(integer.len(), 8);

    let float: Vec<f32> = vec![0.0, 1.0, 0.5, 0.25];
    let planes = split_mosaic(&float, 2, 2, |v| (v * u16::MAX as f32) as u16).unwrap();
    assert_eq!(planes[0].data(), &[0]);
    assert_eq!(planes[1].data(), &[65535]);
    assert_eq!(planes[2].data(), &[32767]);
    assert_eq!(planes[3].data(), &[16383]);
}

#[test]
fn test_split_mosaic_rejects_short_buffers() {
    use super::rawloader_reader::split_mosaic;

    let samples = vec![0u16; 7];
    assert!(matches!(
        split_mosaic(&samples, 4, 2, |v| v),
        Err(PipelineError::InvalidDimensions(4, 2))
    ));
    assert!(matches!(
        split_mosaic(&samples, 1, 2, |v| v),
        Err(PipelineError::InvalidDimensions(1, 2))
    ));
}
