use abepitope::PipelineConfig;
use abepitope_core::EncodedSet;
use abepitope_models::EvalAbAgs;

pub fn execute(config: &PipelineConfig) -> anyhow::Result<()> {
    let device = config.device()?;
    let source = config.model_source()?;
    let dirs = config.work_dirs()?;

    let data = EncodedSet::load(&dirs.encodings)?;
    let evaluator = EvalAbAgs::new(data, device, &source)?;
    evaluator.predict(&dirs.output)?;

    println!("Results written to: {}", dirs.output.display());
    Ok(())
}
