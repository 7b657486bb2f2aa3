use std::io::Cursor;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};

use super::*;
use crate::image_pipeline::common::Image;
use crate::image_pipeline::conversions::QuantizedImage;

fn gradient8() -> Image<u8> {
    Image::from_fn(6, 4, 3, |x, y, c| (x * 40 + y * 10 + c) as u8)
}

fn decode(bytes: Vec<u8>) -> (u32, u32, ColorType, DecodingResult) {
    let mut decoder = Decoder::new(Cursor::new(bytes)).unwrap();
    let (width, height) = decoder.dimensions().unwrap();
    let colortype = decoder.colortype().unwrap();
    let data = decoder.read_image().unwrap();
    (width, height, colortype, data)
}

#[test]
fn test_config_builder() {
    let config = OutputConfig::builder()
        .compression(TiffCompression::DeflateBest)
        .predictor(true)
        .validate_dimensions(false)
        .max_dimension(Some(8000))
        .build();

    assert_eq!(config.compression, TiffCompression::DeflateBest);
    assert!(config.predictor);
    assert!(!config.validate_dimensions);
    assert_eq!(config.max_dimension, Some(8000));

    let default = OutputConfig::builder().build();
    assert_eq!(default, OutputConfig::default());
}

#[test]
fn test_write_rgb8() {
    let image = gradient8();
    let mut output = Vec::new();

    StandardTiffWriter
        .write_tiff(&QuantizedImage::Eight(image.clone()), &mut output, &OutputConfig::default())
        .unwrap();

    let (width, height, colortype, data) = decode(output);
    assert_eq!((width, height), (6, 4));
    assert_eq!(colortype, ColorType::RGB(8));
    match data {
        DecodingResult::U8(values) => assert_eq!(values, image.to_interleaved()),
        _ => panic!("expected 8-bit samples"),
    }
}

#[test]
fn test_write_rgb16_compressed() {
    let image = Image::from_fn(5, 3, 3, |x, y, c| (x * 10000 + y * 300 + c * 7) as u16);

    for compression in [
        TiffCompression::Lzw,
        TiffCompression::DeflateFast,
        TiffCompression::DeflateBalanced,
    ] {
        let config = OutputConfig::builder().compression(compression).predictor(true).build();
        let mut output = Vec::new();
        StandardTiffWriter
            .write_tiff(&QuantizedImage::Sixteen(image.clone()), &mut output, &config)
            .unwrap();

        let (width, height, colortype, data) = decode(output);
        assert_eq!((width, height), (5, 3));
        assert_eq!(colortype, ColorType::RGB(16));
        match data {
            DecodingResult::U16(values) => {
                assert_eq!(values, image.to_interleaved(), "{compression:?}")
            }
            _ => panic!("expected 16-bit samples"),
        }
    }
}

#[test]
fn test_write_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.tiff");
    let mut file = std::fs::File::create(&path).unwrap();

    StandardTiffWriter
        .write_tiff(&QuantizedImage::Eight(gradient8()), &mut file, &OutputConfig::default())
        .unwrap();
    drop(file);

    let (width, height, _, _) = decode(std::fs::read(&path).unwrap());
    assert_eq!((width, height), (6, 4));
}
