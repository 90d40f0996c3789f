//! Kernel sampler
//!
//! Reduces a full kernel trace to a handful of launches worth profiling in
//! depth. The trace span is cut into `sample_count` equal slices and the
//! midpoint of each slice becomes a target time. A single walk over the
//! launches then picks, for each target in turn, the first launch ending
//! strictly after it.
//!
//! Nsight Compute can only address a launch as "the Nth launch of kernel X",
//! so every selection carries the per-name occurrence index of the launch
//! rather than its time or its position in the trace.

use crate::error::SampleError;
use helicorder_shared::types::events::{KernelInterval, KernelSelection, Timestamp};
use helicorder_shared::utils::time::nanos_to_secs;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Sampler configuration
#[derive(Debug, Clone, Copy)]
pub struct KernelSampler {
    sample_count: usize,
    allow_overlap: bool,
}

impl KernelSampler {
    /// Create a sampler producing up to `sample_count` selections
    pub fn new(sample_count: usize) -> Self {
        Self {
            sample_count,
            allow_overlap: false,
        }
    }

    /// Accept traces where launches overlap (kernels on concurrent streams).
    ///
    /// The span then ends at the latest end time instead of the last launch's.
    pub fn allow_overlap(mut self, allow: bool) -> Self {
        self.allow_overlap = allow;
        self
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Select one launch per target time.
    ///
    /// `kernels` must be sorted by start time. Fewer than `sample_count`
    /// selections are returned when the trace runs out before every target has
    /// been passed; see [`SamplePlan::unfilled`].
    pub fn sample(&self, kernels: &[KernelInterval]) -> Result<SamplePlan, SampleError> {
        if self.sample_count == 0 {
            return Err(SampleError::ZeroSamples);
        }

        let (span_start, span_end) = self.check_trace(kernels)?;
        let targets = sample_targets(span_start, span_end, self.sample_count);

        // Every name gets a counter before the walk starts.
        let mut occurrences: HashMap<&str, u64> =
            kernels.iter().map(|k| (k.name.as_str(), 0)).collect();

        let mut selections = Vec::with_capacity(self.sample_count);
        for kernel in kernels {
            let Some(&target) = targets.get(selections.len()) else {
                break;
            };

            let seen = occurrences.entry(kernel.name.as_str()).or_insert(0);
            if kernel.end as f64 > target {
                debug!(
                    "Target {} at {:.0} ns -> {}#{}",
                    selections.len(),
                    target,
                    kernel.name,
                    seen
                );
                selections.push(KernelSelection::new(kernel.name.as_str(), *seen));
            }
            *seen += 1;
        }

        let plan = SamplePlan {
            span_start_ns: span_start,
            span_end_ns: span_end,
            targets_s: targets.into_iter().map(nanos_to_secs).collect(),
            selections,
        };

        if plan.unfilled() > 0 {
            warn!(
                "Trace ended before {} of {} sample points were reached; \
                 only {} kernels will be profiled",
                plan.unfilled(),
                plan.requested(),
                plan.selections.len()
            );
        }

        Ok(plan)
    }

    /// Validate ordering and return the trace span
    fn check_trace(&self, kernels: &[KernelInterval]) -> Result<(Timestamp, Timestamp), SampleError> {
        if kernels.len() < 2 {
            return Err(SampleError::TooFewLaunches {
                found: kernels.len(),
            });
        }

        let mut span_end = 0;
        let mut overlapping = 0usize;
        for (index, kernel) in kernels.iter().enumerate() {
            if kernel.end < kernel.start {
                return Err(SampleError::InvertedInterval {
                    index,
                    name: kernel.name.clone(),
                });
            }

            if index > 0 {
                let prev = &kernels[index - 1];
                if kernel.start < prev.start {
                    return Err(SampleError::Unsorted { index });
                }
                if kernel.start < span_end {
                    if !self.allow_overlap {
                        return Err(SampleError::Overlap {
                            index,
                            name: kernel.name.clone(),
                        });
                    }
                    overlapping += 1;
                }
            }

            span_end = span_end.max(kernel.end);
        }

        let span_start = kernels[0].start;
        if span_end == span_start {
            return Err(SampleError::EmptySpan { at: span_start });
        }

        if overlapping > 0 {
            warn!(
                "{} kernel launches overlap an earlier launch; selections may not cover their sample points",
                overlapping
            );
        }

        Ok((span_start, span_end))
    }
}

/// Midpoints of `count` equal slices of `[span_start, span_end]`, in nanoseconds
pub fn sample_targets(span_start: Timestamp, span_end: Timestamp, count: usize) -> Vec<f64> {
    let start = span_start as f64;
    let span = span_end.saturating_sub(span_start) as f64;
    (0..count)
        .map(|i| start + (i as f64 + 0.5) * span / count as f64)
        .collect()
}

/// Result of sampling a trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplePlan {
    /// Start of the first launch
    pub span_start_ns: Timestamp,

    /// Latest launch end
    pub span_end_ns: Timestamp,

    /// Every requested sample time, in seconds
    pub targets_s: Vec<f64>,

    /// Selected launches, one per target from the first on
    pub selections: Vec<KernelSelection>,
}

impl SamplePlan {
    /// Number of sample points asked for
    pub fn requested(&self) -> usize {
        self.targets_s.len()
    }

    /// Number of trailing sample points left without a selection
    pub fn unfilled(&self) -> usize {
        self.targets_s.len().saturating_sub(self.selections.len())
    }

    /// Sample times paired with their selections.
    ///
    /// Unfilled trailing targets are not yielded.
    pub fn points(&self) -> impl Iterator<Item = (f64, &KernelSelection)> + '_ {
        self.targets_s.iter().copied().zip(self.selections.iter())
    }

    /// Trace span in seconds
    pub fn span_s(&self) -> f64 {
        nanos_to_secs(self.span_end_ns.saturating_sub(self.span_start_ns) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(launches: &[(u64, u64, &str)]) -> Vec<KernelInterval> {
        launches.iter()
            .map(|&(start, end, name)| KernelInterval::new(start, end, name))
            .collect()
    }

    fn selected(plan: &SamplePlan) -> Vec<(&str, u64)> {
        plan.selections
            .iter()
            .map(|s| (s.name.as_str(), s.occurrence))
            .collect()
    }

    #[test]
    fn test_end_equal_to_target_does_not_select() {
        let kernels = trace(&[(0, 10, "A"), (10, 20, "B"), (20, 30, "A"), (30, 40, "B")]);
        let plan = KernelSampler::new(2).sample(&kernels).unwrap();

        // Targets land at 10 ns and 30 ns, exactly on the ends of both "A" launches.
        assert_eq!(sample_targets(0, 40, 2), vec![10.0, 30.0]);
        assert_eq!(selected(&plan), vec![("B", 0), ("B", 1)]);
        assert_eq!(plan.targets_s, vec![1e-8, 3e-8]);
        assert_eq!(plan.unfilled(), 0);
    }

    #[test]
    fn test_end_past_target_selects() {
        let kernels = trace(&[(0, 11, "A"), (11, 20, "B"), (20, 31, "A"), (31, 40, "B")]);
        let plan = KernelSampler::new(2).sample(&kernels).unwrap();

        assert_eq!(selected(&plan), vec![("A", 0), ("A", 1)]);
    }

    #[test]
    fn test_occurrence_counts_every_launch_of_a_name() {
        let kernels = trace(&[(0, 10, "A"), (10, 20, "A"), (20, 30, "B"), (30, 40, "A")]);
        let plan = KernelSampler::new(4).sample(&kernels).unwrap();

        assert_eq!(
            selected(&plan),
            vec![("A", 0), ("A", 1), ("B", 0), ("A", 2)]
        );
    }

    #[test]
    fn test_stops_after_last_selection() {
        let kernels: Vec<_> = (0..10)
            .map(|i| KernelInterval::new(i * 10, i * 10 + 10, "k"))
            .collect();
        let plan = KernelSampler::new(1).sample(&kernels).unwrap();

        // Single target at 50 ns; the launch ending at 50 does not pass it.
        assert_eq!(selected(&plan), vec![("k", 5)]);
    }

    #[test]
    fn test_long_kernel_leaves_trailing_points_unfilled() {
        let kernels = trace(&[(0, 100, "A"), (100, 101, "B")]);
        let plan = KernelSampler::new(4).sample(&kernels).unwrap();

        assert_eq!(selected(&plan), vec![("A", 0), ("B", 0)]);
        assert_eq!(plan.requested(), 4);
        assert_eq!(plan.unfilled(), 2);

        let points: Vec<_> = plan.points().collect();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].0, plan.targets_s[0]);
        assert_eq!(points[1].0, plan.targets_s[1]);
    }

    #[test]
    fn test_rejects_zero_length_span() {
        let kernels = trace(&[(5, 5, "A"), (5, 5, "B")]);
        assert_eq!(
            KernelSampler::new(3).sample(&kernels),
            Err(SampleError::EmptySpan { at: 5 })
        );
    }

    #[test]
    fn test_zero_length_launches_in_a_real_span_are_accepted() {
        let kernels = trace(&[(5, 5, "A"), (5, 9, "B")]);
        let plan = KernelSampler::new(1).sample(&kernels).unwrap();
        assert_eq!(selected(&plan), vec![("B", 0)]);
    }

    #[test]
    fn test_rejects_zero_samples() {
        let kernels = trace(&[(0, 10, "A"), (10, 20, "B")]);
        assert_eq!(
            KernelSampler::new(0).sample(&kernels),
            Err(SampleError::ZeroSamples)
        );
    }

    #[test]
    fn test_rejects_degenerate_traces() {
        assert_eq!(
            KernelSampler::new(3).sample(&[]),
            Err(SampleError::TooFewLaunches { found: 0 })
        );
        assert_eq!(
            KernelSampler::new(3).sample(&trace(&[(0, 10, "A")])),
            Err(SampleError::TooFewLaunches { found: 1 })
        );
    }

    #[test]
    fn test_rejects_unsorted_trace() {
        let kernels = trace(&[(0, 10, "A"), (30, 40, "B"), (20, 25, "C")]);
        assert_eq!(
            KernelSampler::new(2).sample(&kernels),
            Err(SampleError::Unsorted { index: 2 })
        );
    }

    #[test]
    fn test_rejects_inverted_interval() {
        let kernels = trace(&[(0, 10, "A"), (20, 15, "B")]);
        assert_eq!(
            KernelSampler::new(2).sample(&kernels),
            Err(SampleError::InvertedInterval {
                index: 1,
                name: "B".to_string()
            })
        );
    }

    #[test]
    fn test_overlap_rejected_unless_allowed() {
        let kernels = trace(&[(0, 100, "A"), (10, 20, "B"), (30, 40, "C")]);

        assert_eq!(
            KernelSampler::new(2).sample(&kernels),
            Err(SampleError::Overlap {
                index: 1,
                name: "B".to_string()
            })
        );

        let plan = KernelSampler::new(2)
            .allow_overlap(true)
            .sample(&kernels)
            .unwrap();
        assert_eq!(plan.span_start_ns, 0);
        assert_eq!(plan.span_end_ns, 100);
        // Targets at 25 ns and 75 ns: "A" passes the first, "C" ends too early for the second.
        assert_eq!(selected(&plan), vec![("A", 0)]);
        assert_eq!(plan.unfilled(), 1);
    }

    #[test]
    fn test_back_to_back_launches_do_not_overlap() {
        let kernels = trace(&[(0, 10, "A"), (10, 10, "B"), (10, 20, "A")]);
        assert!(KernelSampler::new(2).sample(&kernels).is_ok());
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let kernels = trace(&[(0, 7, "A"), (9, 20, "B"), (21, 22, "A"), (25, 60, "C")]);
        let sampler = KernelSampler::new(3);
        assert_eq!(sampler.sample(&kernels), sampler.sample(&kernels));
    }

    #[test]
    fn test_targets_are_slice_midpoints() {
        let targets = sample_targets(1_000, 2_000, 4);
        assert_eq!(targets, vec![1_125.0, 1_375.0, 1_625.0, 1_875.0]);
    }
}
