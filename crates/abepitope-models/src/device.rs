//! Compute device selection.
use anyhow::{anyhow, Result};
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::Device;
use std::fmt;
use std::str::FromStr;

/// Where model computation runs.
///
/// Parsed from `auto`, `cpu`, `cuda`, `cuda:<n>`, `metal` or `metal:<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceSelector {
    /// CUDA when compiled in, then Metal, else CPU.
    #[default]
    Auto,
    Cpu,
    Cuda(usize),
    Metal(usize),
}

impl DeviceSelector {
    pub fn resolve(&self) -> Result<Device> {
        match self {
            DeviceSelector::Cpu => Ok(Device::Cpu),
            DeviceSelector::Cuda(ordinal) => Device::new_cuda(*ordinal)
                .map_err(|e| anyhow!("CUDA device {} is not available: {}", ordinal, e)),
            DeviceSelector::Metal(ordinal) => Device::new_metal(*ordinal)
                .map_err(|e| anyhow!("Metal device {} is not available: {}", ordinal, e)),
            DeviceSelector::Auto => {
                if cuda_is_available() {
                    Ok(Device::new_cuda(0)?)
                } else if metal_is_available() {
                    Ok(Device::new_metal(0)?)
                } else {
                    log::info!("Running on CPU, build with `--features cuda` or `--features metal` to use a GPU");
                    Ok(Device::Cpu)
                }
            }
        }
    }

    /// Whether the ONNX session should register the CUDA execution provider.
    pub fn wants_cuda(&self) -> bool {
        matches!(self, DeviceSelector::Cuda(_) | DeviceSelector::Auto)
    }
}

impl FromStr for DeviceSelector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let (kind, ordinal) = match s.split_once(':') {
            Some((kind, ordinal)) => {
                let ordinal = ordinal
                    .parse::<usize>()
                    .map_err(|_| anyhow!("invalid device ordinal in {:?}", s))?;
                (kind.to_string(), Some(ordinal))
            }
            None => (s.clone(), None),
        };
        match (kind.as_str(), ordinal) {
            ("auto", None) => Ok(DeviceSelector::Auto),
            ("cpu", None) => Ok(DeviceSelector::Cpu),
            ("cuda", ordinal) | ("gpu", ordinal) => Ok(DeviceSelector::Cuda(ordinal.unwrap_or(0))),
            ("metal", ordinal) => Ok(DeviceSelector::Metal(ordinal.unwrap_or(0))),
            _ => Err(anyhow!(
                "unknown device {:?}, expected auto, cpu, cuda[:n] or metal[:n]",
                s
            )),
        }
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSelector::Auto => write!(f, "auto"),
            DeviceSelector::Cpu => write!(f, "cpu"),
            DeviceSelector::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
            DeviceSelector::Metal(ordinal) => write!(f, "metal:{}", ordinal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("auto".parse::<DeviceSelector>().unwrap(), DeviceSelector::Auto);
        assert_eq!("CPU".parse::<DeviceSelector>().unwrap(), DeviceSelector::Cpu);
        assert_eq!("cuda".parse::<DeviceSelector>().unwrap(), DeviceSelector::Cuda(0));
        assert_eq!("cuda:1".parse::<DeviceSelector>().unwrap(), DeviceSelector::Cuda(1));
        assert_eq!("metal".parse::<DeviceSelector>().unwrap(), DeviceSelector::Metal(0));
        assert!("tpu".parse::<DeviceSelector>().is_err());
        assert!("cuda:x".parse::<DeviceSelector>().is_err());
        assert!("cpu:1".parse::<DeviceSelector>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for device in [
            DeviceSelector::Auto,
            DeviceSelector::Cpu,
            DeviceSelector::Cuda(2),
            DeviceSelector::Metal(0),
        ] {
            assert_eq!(device.to_string().parse::<DeviceSelector>().unwrap(), device);
        }
    }

    #[test]
    fn test_cpu_resolves() {
        assert!(DeviceSelector::Cpu.resolve().unwrap().is_cpu());
    }
}
