//! Property-based tests for the kernel sampler.
//!
//! Key invariants over sorted, non-overlapping traces:
//! - Every selection addresses a real launch that ends after its target
//! - Occurrences of the same kernel name strictly increase
//! - Targets are evenly spaced slice midpoints, in seconds
//! - Sampling is idempotent
//! - No selection names a kernel absent from the trace

use helicorder_gpu::sampler::sample_targets;
use helicorder_gpu::KernelSampler;
use helicorder_shared::types::events::KernelInterval;
use helicorder_shared::utils::time::nanos_to_secs;
use proptest::prelude::*;
use std::collections::HashMap;

const NAMES: [&str; 5] = ["gemm", "softmax", "layernorm", "gelu", "all_reduce"];

/// Sorted, non-overlapping launches with random gaps, durations and names
fn trace() -> impl Strategy<Value = Vec<KernelInterval>> {
    (
        0u64..1_000_000,
        prop::collection::vec((0u64..5_000, 1u64..50_000, 0..NAMES.len()), 2..300),
    )
        .prop_map(|(origin, launches)| {
            let mut t = origin;
            launches
                .into_iter()
                .map(|(gap, duration, name)| {
                    let start = t + gap;
                    t = start + duration;
                    KernelInterval::new(start, t, NAMES[name])
                })
                .collect()
        })
}

fn launches_by_name(kernels: &[KernelInterval]) -> HashMap<&str, Vec<&KernelInterval>> {
    let mut by_name: HashMap<&str, Vec<&KernelInterval>> = HashMap::new();
    for k in kernels {
        by_name.entry(k.name.as_str()).or_default().push(k);
    }
    by_name
}

proptest! {
    /// Each selection is the Nth launch of a traced kernel and ends past its target.
    #[test]
    fn selections_address_real_launches_past_their_target(
        kernels in trace(),
        sample_count in 1usize..400
    ) {
        let plan = KernelSampler::new(sample_count).sample(&kernels).unwrap();
        prop_assert!(plan.selections.len() <= sample_count);
        prop_assert_eq!(plan.requested(), sample_count);

        let by_name = launches_by_name(&kernels);
        let targets = sample_targets(plan.span_start_ns, plan.span_end_ns, sample_count);
        for (i, selection) in plan.selections.iter().enumerate() {
            let launches = by_name.get(selection.name.as_str());
            prop_assert!(launches.is_some());
            let launch = launches.and_then(|l| l.get(selection.occurrence as usize));
            prop_assert!(launch.is_some(), "{} out of range", selection);
            prop_assert!(launch.map_or(false, |l| l.end as f64 > targets[i]));
        }
    }

    /// Later selections of the same kernel always skip further.
    #[test]
    fn occurrences_strictly_increase_per_name(
        kernels in trace(),
        sample_count in 1usize..100
    ) {
        let plan = KernelSampler::new(sample_count).sample(&kernels).unwrap();

        let mut last: HashMap<&str, u64> = HashMap::new();
        for selection in &plan.selections {
            if let Some(&prev) = last.get(selection.name.as_str()) {
                prop_assert!(selection.occurrence > prev);
            }
            last.insert(selection.name.as_str(), selection.occurrence);
        }
    }

    /// Targets sit at the middle of equal slices of the span.
    #[test]
    fn targets_are_evenly_spaced_midpoints(
        kernels in trace(),
        sample_count in 1usize..64
    ) {
        let plan = KernelSampler::new(sample_count).sample(&kernels).unwrap();

        let start = plan.span_start_ns as f64;
        let span = (plan.span_end_ns - plan.span_start_ns) as f64;
        for (i, &t) in plan.targets_s.iter().enumerate() {
            let expected = nanos_to_secs(start + (i as f64 + 0.5) * span / sample_count as f64);
            prop_assert_eq!(t, expected);
        }

        let step = nanos_to_secs(span / sample_count as f64);
        for pair in plan.targets_s.windows(2) {
            prop_assert!(pair[1] > pair[0]);
            prop_assert!((pair[1] - pair[0] - step).abs() < 1e-12);
        }
    }

    /// The same trace and count always give the same plan.
    #[test]
    fn sampling_is_idempotent(kernels in trace(), sample_count in 1usize..100) {
        let sampler = KernelSampler::new(sample_count);
        prop_assert_eq!(sampler.sample(&kernels), sampler.sample(&kernels));
    }

    /// Only names present in the trace are ever selected.
    #[test]
    fn never_selects_unknown_names(kernels in trace(), sample_count in 1usize..100) {
        let plan = KernelSampler::new(sample_count).sample(&kernels).unwrap();
        for selection in &plan.selections {
            prop_assert!(kernels.iter().any(|k| k.name == selection.name));
        }
    }
}

#[test]
fn test_back_to_back_trace_fills_every_point() {
    let kernels: Vec<KernelInterval> = (0..100u64)
        .map(|i| KernelInterval::new(i * 1_000, (i + 1) * 1_000, NAMES[(i % 3) as usize]))
        .collect();
    for sample_count in [1, 3, 10, 50, 100] {
        let plan = KernelSampler::new(sample_count).sample(&kernels).unwrap();
        assert_eq!(plan.selections.len(), sample_count);
        assert_eq!(plan.unfilled(), 0);
        assert_eq!(plan.points().count(), sample_count);
    }
}
