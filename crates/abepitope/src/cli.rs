use super::commands;
use abepitope::PipelineConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use validator::Validate;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode structures and predict epitopes in one go
    Run {
        /// Structure file (.pdb/.cif) or a directory of them
        #[arg(short, long)]
        structure: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        encoding: EncodingArgs,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Encode structures into the `encodings/` directory
    Encode {
        #[arg(short, long)]
        structure: PathBuf,
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        encoding: EncodingArgs,
    },
    /// Predict from existing encodings
    Predict {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON config file, flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base directory for encodings/, temporary/ and output/ [default: current directory]
    #[arg(short, long)]
    workdir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct EncodingArgs {
    /// Distance (Å) between heavy atoms for residues to count as interface
    #[arg(long)]
    interface_cutoff: Option<f32>,
    /// Heavy chain id. Without explicit chains: heavy, light, then antigen chains in file order
    #[arg(long)]
    heavy: Option<String>,
    #[arg(long)]
    light: Option<String>,
    /// Antigen chain ids, comma separated
    #[arg(long, value_delimiter = ',')]
    antigen: Vec<String>,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// auto, cpu, cuda[:n] or metal[:n]
    #[arg(long)]
    device: Option<String>,
    /// Model file (.safetensors or .onnx)
    #[arg(long, conflicts_with = "hub_repo")]
    weights: Option<PathBuf>,
    /// HuggingFace hub repository holding the model
    #[arg(long)]
    hub_repo: Option<String>,
    #[arg(long)]
    hub_revision: Option<String>,
    #[arg(long)]
    hub_file: Option<String>,
}

impl CommonArgs {
    fn load(self) -> anyhow::Result<PipelineConfig> {
        let mut config = match self.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        if self.workdir.is_some() {
            config.workdir = self.workdir;
        }
        Ok(config)
    }
}

impl EncodingArgs {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(cutoff) = self.interface_cutoff {
            config.interface_cutoff = cutoff;
        }
        if self.heavy.is_some() {
            config.heavy = self.heavy;
        }
        if self.light.is_some() {
            config.light = self.light;
        }
        if !self.antigen.is_empty() {
            config.antigen = self.antigen;
        }
    }
}

impl ModelArgs {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(device) = self.device {
            config.device = device;
        }
        // a model given on the command line replaces the one from the config file
        if self.weights.is_some() {
            config.weights = self.weights;
            config.hub_repo = None;
        }
        if self.hub_repo.is_some() {
            config.hub_repo = self.hub_repo;
            config.weights = None;
        }
        if self.hub_revision.is_some() {
            config.hub_revision = self.hub_revision;
        }
        if self.hub_file.is_some() {
            config.hub_file = self.hub_file;
        }
    }
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Run {
                structure,
                common,
                encoding,
                model,
            } => {
                let mut config = common.load()?;
                encoding.apply(&mut config);
                model.apply(&mut config);
                config.validate()?;
                commands::run::execute(structure, &config)
            }
            Commands::Encode {
                structure,
                common,
                encoding,
            } => {
                let mut config = common.load()?;
                encoding.apply(&mut config);
                config.validate()?;
                commands::encode::execute(structure, &config)
            }
            Commands::Predict { common, model } => {
                let mut config = common.load()?;
                model.apply(&mut config);
                config.validate()?;
                commands::predict::execute(&config)
            }
        }
    }
}
