use abepitope::{Pipeline, PipelineConfig};
use abepitope_core::StructureData;
use std::path::PathBuf;

pub fn execute(structure: PathBuf, config: &PipelineConfig) -> anyhow::Result<()> {
    let encoder = StructureData::with_options(config.encoding_options()?);
    let pipeline = Pipeline::new(config.work_dirs()?);
    let data = pipeline.encode(&structure, &encoder)?;
    println!(
        "Encoded {} structure(s) into: {}",
        data.len(),
        data.dir().display()
    );
    Ok(())
}
