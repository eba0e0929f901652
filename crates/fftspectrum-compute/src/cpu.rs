//! CPU transform backend using `rustfft` plans and Rayon for parallelism.
//!
//! The 2D transform is computed as column FFTs followed by row FFTs. Columns
//! are made contiguous by transposing into the output buffer, transformed as
//! rows and transposed back into the input buffer. The row pass then runs out
//! of place, leaving the spectrum in the output buffer.
//!
//! Plans are reference counted per geometry: every `prepare` takes a
//! reference and every `release` gives one back. No planner outlives the
//! plan it built, so releasing the last reference frees the plan.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use num_complex::Complex32;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use crate::backend::{check_buffers, BackendType, ComputeError, DeviceInfo, SpectrumBackend};

/// Row and column plans for one frame geometry.
struct Plan2d {
    rows: Arc<dyn Fft<f32>>,
    cols: Arc<dyn Fft<f32>>,
}

/// A cached plan and the number of `prepare` calls not yet released.
struct CachedPlan {
    plan: Arc<Plan2d>,
    users: usize,
}

type PlanCache = HashMap<(usize, usize), CachedPlan>;

/// CPU backend that parallelises row and column passes via Rayon.
pub struct CpuBackend {
    num_threads: usize,
    cache: Mutex<PlanCache>,
}

impl CpuBackend {
    /// Create a new CPU backend using all available threads.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn lock_cache(&self) -> Result<MutexGuard<'_, PlanCache>, ComputeError> {
        self.cache
            .lock()
            .map_err(|_| ComputeError::DeviceError("plan cache lock poisoned".into()))
    }

    /// Fetch the cached plan for a geometry, building it on first use.
    ///
    /// `users` is added to the geometry's reference count.
    fn plan(
        &self,
        width: usize,
        height: usize,
        users: usize,
    ) -> Result<Arc<Plan2d>, ComputeError> {
        if width == 0 || height == 0 {
            return Err(ComputeError::InvalidDimensions { width, height });
        }
        let mut cache = self.lock_cache()?;
        let entry = cache.entry((width, height)).or_insert_with(|| {
            let mut planner = FftPlanner::new();
            debug!("planned {}x{} forward transform", width, height);
            CachedPlan {
                plan: Arc::new(Plan2d {
                    rows: planner.plan_fft_forward(width),
                    cols: planner.plan_fft_forward(height),
                }),
                users: 0,
            }
        });
        entry.users += users;
        Ok(Arc::clone(&entry.plan))
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Transform every contiguous `len`-element line of `data` in place.
fn fft_lines(fft: &Arc<dyn Fft<f32>>, data: &mut [Complex32], len: usize) {
    let scratch_len = fft.get_inplace_scratch_len();
    data.par_chunks_mut(len).for_each_init(
        || vec![Complex32::new(0.0, 0.0); scratch_len],
        |scratch, line| fft.process_with_scratch(line, scratch),
    );
}

/// Transform each `len`-element line of `src` into the matching line of `dst`.
///
/// `src` is used as working memory and left unspecified.
fn fft_lines_into(
    fft: &Arc<dyn Fft<f32>>,
    src: &mut [Complex32],
    dst: &mut [Complex32],
    len: usize,
) {
    let scratch_len = fft.get_outofplace_scratch_len();
    src.par_chunks_mut(len)
        .zip(dst.par_chunks_mut(len))
        .for_each_init(
            || vec![Complex32::new(0.0, 0.0); scratch_len],
            |scratch, (line_in, line_out)| {
                fft.process_outofplace_with_scratch(line_in, line_out, scratch)
            },
        );
}

/// Write the transpose of the `rows` x `cols` matrix `src` into `dst`.
fn transpose(src: &[Complex32], dst: &mut [Complex32], rows: usize, cols: usize) {
    dst.par_chunks_mut(rows).enumerate().for_each(|(c, line)| {
        for (r, value) in line.iter_mut().enumerate() {
            *value = src[r * cols + c];
        }
    });
}

impl SpectrumBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads),
            backend_type: BackendType::Cpu,
            compute_units: Some(self.num_threads),
        }
    }

    fn prepare(&self, width: usize, height: usize) -> Result<(), ComputeError> {
        self.plan(width, height, 1).map(|_| ())
    }

    fn forward_2d(
        &self,
        input: &mut [Complex32],
        output: &mut [Complex32],
        width: usize,
        height: usize,
    ) -> Result<(), ComputeError> {
        check_buffers(input, output, width, height)?;
        let plan = self.plan(width, height, 0)?;

        transpose(input, output, height, width);
        fft_lines(&plan.cols, output, height);
        transpose(output, input, width, height);
        fft_lines_into(&plan.rows, input, output, width);
        Ok(())
    }

    fn release(&self, width: usize, height: usize) {
        let Ok(mut cache) = self.lock_cache() else {
            return;
        };
        let Some(entry) = cache.get_mut(&(width, height)) else {
            return;
        };
        entry.users = entry.users.saturating_sub(1);
        if entry.users == 0 {
            cache.remove(&(width, height));
            debug!("released {}x{} forward transform", width, height);
        }
    }

    fn cached_plans(&self) -> usize {
        self.lock_cache().map(|cache| cache.len()).unwrap_or(0)
    }
}
