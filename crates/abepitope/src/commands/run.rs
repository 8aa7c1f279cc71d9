use abepitope::{Pipeline, PipelineConfig};
use abepitope_core::StructureData;
use abepitope_models::EvalAbAgs;
use std::path::PathBuf;

pub fn execute(structure: PathBuf, config: &PipelineConfig) -> anyhow::Result<()> {
    // resolve everything that can be wrong with the arguments before touching the disk
    let device = config.device()?;
    let source = config.model_source()?;
    let encoder = StructureData::with_options(config.encoding_options()?);
    let pipeline = Pipeline::new(config.work_dirs()?);

    let output = pipeline.run(&structure, &encoder, |data| {
        EvalAbAgs::new(data, device, &source)
    })?;

    println!("Results written to: {}", output.outdir.display());
    Ok(())
}
