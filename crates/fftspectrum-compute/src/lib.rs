//! # FFTSpectrum Compute
//!
//! Forward-transform backend abstraction for the FFTSpectrum renderer. This
//! crate provides a [`SpectrumBackend`](backend::SpectrumBackend) trait that
//! isolates the rendering code from the DFT library and its plan caching.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Status |
//! |---------|-------------|--------|
//! | CPU (rustfft + Rayon) | `cpu` (default) | Implemented |

use std::sync::Arc;

pub mod backend;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use backend::{BackendType, ComputeError, DeviceInfo, SpectrumBackend};

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;

/// Select a backend by name: `"auto"` or `"cpu"`.
pub fn create_backend(name: &str) -> Result<Arc<dyn SpectrumBackend>, ComputeError> {
    match name.to_ascii_lowercase().as_str() {
        #[cfg(feature = "cpu")]
        "auto" | "cpu" => Ok(Arc::new(CpuBackend::new())),
        other => Err(ComputeError::Unavailable(format!(
            "unknown or disabled backend '{}'",
            other
        ))),
    }
}

#[cfg(all(test, feature = "cpu"))]
mod tests {
    use super::*;

    #[test]
    fn test_create_backend_by_name() {
        let backend = create_backend("Auto").unwrap();
        assert_eq!(backend.device_info().backend_type, BackendType::Cpu);
        assert!(create_backend("cpu").is_ok());
        assert!(matches!(
            create_backend("cuda"),
            Err(ComputeError::Unavailable(_))
        ));
    }
}
