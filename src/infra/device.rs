// ============================================================
// Layer 6 — Compute Capability Probe
// ============================================================
// Answers "how many compute devices does this run actually get?"
// as a typed value instead of a printed side note.
//
// The WGPU backend drives a single default queue, so data-parallel
// execution across several devices is only possible when the
// backend exposes them. When it doesn't, the trainer degrades to
// one device — observably, via warn_if_degraded(), never silently.
//
// ensure_batch_fits() is the pre-flight side of the OutOfResource
// taxonomy: an oversized batch footprint is rejected up front with
// the documented remediation in the message, rather than letting
// the backend abort mid-epoch with an opaque allocation failure.

use crate::domain::errors::PipelineError;

/// Upper bound on batch_size * max_seq_len accepted for one step.
/// Conservative for commodity GPUs driving this model size.
pub const MAX_BATCH_ELEMENTS: usize = 1 << 21;

/// Devices exposed by the WGPU backend: one default queue
const AVAILABLE_DEVICES: usize = 1;

/// Typed result of the capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeCapability {
    /// Devices the operator asked for
    pub requested: usize,

    /// Devices the backend can actually drive
    pub available: usize,
}

impl ComputeCapability {
    /// True when the run gets fewer devices than requested
    pub fn is_degraded(&self) -> bool {
        self.available < self.requested
    }

    /// Devices the run will actually use
    pub fn effective(&self) -> usize {
        self.requested.min(self.available)
    }

    /// Degradation must be observable — a requested-but-unavailable
    /// device count is a performance surprise the operator should see.
    pub fn warn_if_degraded(&self) {
        if self.is_degraded() {
            tracing::warn!(
                "Requested {} compute devices but only {} available — \
                 running single-device (data-parallel execution disabled)",
                self.requested,
                self.available,
            );
        }
    }
}

/// Query the backend for the devices this run can use.
pub fn probe(requested: usize) -> ComputeCapability {
    ComputeCapability {
        requested: requested.max(1),
        available: AVAILABLE_DEVICES,
    }
}

/// Reject a batch footprint that cannot fit the device budget.
/// This is a fatal condition: the pipeline never auto-retries with
/// smaller batches — shrinking --train-batch-size or --max-seq-len
/// is the operator's call.
pub fn ensure_batch_fits(batch_size: usize, max_seq_len: usize) -> Result<(), PipelineError> {
    let footprint = batch_size.saturating_mul(max_seq_len);
    if footprint > MAX_BATCH_ELEMENTS {
        return Err(PipelineError::OutOfResource {
            batch_size,
            max_seq_len,
            budget: MAX_BATCH_ELEMENTS,
        });
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_device_request_is_not_degraded() {
        let cap = probe(1);
        assert!(!cap.is_degraded());
        assert_eq!(cap.effective(), 1);
    }

    #[test]
    fn test_multi_device_request_degrades_observably() {
        let cap = probe(4);
        assert!(cap.is_degraded());
        assert_eq!(cap.effective(), 1);
    }

    #[test]
    fn test_zero_request_is_clamped_to_one() {
        let cap = probe(0);
        assert_eq!(cap.requested, 1);
        assert!(!cap.is_degraded());
    }

    #[test]
    fn test_reasonable_batch_fits() {
        assert!(ensure_batch_fits(32, 128).is_ok());
    }

    #[test]
    fn test_oversized_batch_is_out_of_resource() {
        let err = ensure_batch_fits(usize::MAX / 2, 512).unwrap_err();
        assert!(matches!(err, PipelineError::OutOfResource { .. }));
    }
}
