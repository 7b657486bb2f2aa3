use anyhow::{Context, bail};
use rawpipe_rs::image_pipeline::{
    OutputConfig, PipelineParameters, RawToTiffPipeline, TiffCompression,
};
use rawpipe_rs::logger;

use tracing::info;

fn main() -> anyhow::Result<()> {
    logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (input, output, params_path) = match args.as_slice() {
        [input, output] => (input, output, None),
        [input, output, params] => (input, output, Some(params)),
        _ => bail!("usage: rawpipe <input.raw> <output.tiff> [parameters.json]"),
    };

    let params = match params_path {
        Some(path) => PipelineParameters::from_json_file(path)
            .with_context(|| format!("loading parameters from {path}"))?,
        None => PipelineParameters::default(),
    };

    let config = OutputConfig::builder()
        .compression(TiffCompression::DeflateBalanced)
        .predictor(true)
        .build();
    let pipeline =
        RawToTiffPipeline::new(params, config).context("invalid development parameters")?;

    info!("RAW development pipeline initialized");
    info!("Compression: {:?}", pipeline.config().compression);
    info!("Output depth: {:?}", pipeline.develop_pipeline().parameters().output_depth);

    let timings = pipeline
        .convert_file(input, output)
        .with_context(|| format!("developing {input}"))?;
    timings.log_summary();

    info!("Wrote {}", output);
    Ok(())
}
