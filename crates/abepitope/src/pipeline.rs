//! Encode -> predict, one stage after the other.
use abepitope_core::{EncodedSet, Encoder, EpitopeError, WorkDirs};
use abepitope_models::{Prediction, Predictor};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct PipelineOutput {
    pub outdir: PathBuf,
    pub predictions: Vec<Prediction>,
}

pub struct Pipeline {
    dirs: WorkDirs,
}

impl Pipeline {
    pub fn new(dirs: WorkDirs) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &WorkDirs {
        &self.dirs
    }

    /// Create the working directories and encode `structure` into `encodings/`.
    pub fn encode<E: Encoder>(&self, structure: &Path, encoder: &E) -> Result<EncodedSet> {
        self.dirs.ensure()?;
        let set = encoder
            .encode(structure, &self.dirs.encodings, &self.dirs.temporary)
            .with_context(|| format!("encoding {}", structure.display()))?;
        if set.is_empty() {
            return Err(EpitopeError::MissingEncodings(self.dirs.encodings.clone()).into());
        }
        Ok(set)
    }

    /// Encode, then build the predictor from the encoded set and write predictions to `output/`.
    pub fn run<E, P, F>(&self, structure: &Path, encoder: &E, build_predictor: F) -> Result<PipelineOutput>
    where
        E: Encoder,
        P: Predictor,
        F: FnOnce(EncodedSet) -> Result<P>,
    {
        let data = self.encode(structure, encoder)?;
        let predictor = build_predictor(data)?;
        let predictions = predictor.predict(&self.dirs.output)?;
        Ok(PipelineOutput {
            outdir: self.dirs.output.clone(),
            predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abepitope_core::StructureData;
    use abepitope_test_data::TestFile;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Log(RefCell<Vec<String>>);

    impl Log {
        fn push(&self, event: &str) {
            self.0.borrow_mut().push(event.to_string());
        }
        fn events(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    struct RecordingEncoder<'a> {
        log: &'a Log,
        inner: StructureData,
    }

    impl Encoder for RecordingEncoder<'_> {
        fn encode(
            &self,
            input: &Path,
            encdir: &Path,
            tmpdir: &Path,
        ) -> abepitope_core::error::Result<EncodedSet> {
            self.log.push("encode");
            self.inner.encode(input, encdir, tmpdir)
        }
    }

    struct RecordingPredictor<'a> {
        log: &'a Log,
        data: EncodedSet,
    }

    impl Predictor for RecordingPredictor<'_> {
        fn predict(&self, outdir: &Path) -> Result<Vec<Prediction>> {
            self.log.push("predict");
            std::fs::write(outdir.join("output.csv"), "file_name\n")?;
            Ok(self
                .data
                .records()
                .iter()
                .map(|record| Prediction {
                    name: record.name.clone(),
                    abepiscore: 0.5,
                    abepitarget: 0.5,
                    epitope_residues: record.epitope_count(),
                    antigen_chains: Vec::new(),
                    residue_scores: Vec::new(),
                })
                .collect())
        }
    }

    fn run_once(base: &Path, structure: &Path, log: &Log) -> Result<PipelineOutput> {
        let pipeline = Pipeline::new(WorkDirs::under(base));
        let encoder = RecordingEncoder {
            log,
            inner: StructureData::new(),
        };
        let encdir = pipeline.dirs().encodings.clone();
        pipeline.run(structure, &encoder, |data| {
            // encodings are on disk before the predictor exists
            assert!(std::fs::read_dir(&encdir)?.count() > 0);
            log.push("build");
            Ok(RecordingPredictor { log, data })
        })
    }

    #[test]
    fn test_stage_order() {
        let base = tempfile::tempdir().unwrap();
        let structure = TestFile::abag_complex().write_to(base.path()).unwrap();
        let log = Log::default();
        let output = run_once(base.path(), &structure, &log).unwrap();

        assert_eq!(log.events(), ["encode", "build", "predict"]);
        assert_eq!(output.outdir, base.path().join("output"));
        assert_eq!(output.predictions.len(), 1);
        for dir in ["encodings", "temporary", "output"] {
            assert!(base.path().join(dir).is_dir());
        }
        assert!(output.outdir.join("output.csv").exists());
    }

    #[test]
    fn test_run_twice() {
        let base = tempfile::tempdir().unwrap();
        let structure = TestFile::abag_complex().write_to(base.path()).unwrap();
        let log = Log::default();
        run_once(base.path(), &structure, &log).unwrap();
        run_once(base.path(), &structure, &log).unwrap();
        assert_eq!(log.events().len(), 6);
    }

    #[test]
    fn test_missing_structure_stops_before_prediction() {
        let base = tempfile::tempdir().unwrap();
        let log = Log::default();
        let err = run_once(base.path(), &base.path().join("missing.pdb"), &log).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EpitopeError>(),
            Some(EpitopeError::MissingStructure(_))
        ));
        assert_eq!(log.events(), ["encode"]);
        assert_eq!(
            std::fs::read_dir(base.path().join("output")).unwrap().count(),
            0
        );
    }
}
