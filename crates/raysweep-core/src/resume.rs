//! Decides whether a configuration already has a recorded run.

use crate::runlog::{RunLog, RunRecord};
use crate::space::Configuration;

/// True when `record` is a run of `config`: scalar fields match exactly and
/// the recorded executor is one of the variant's identities.
pub fn record_matches(config: &Configuration, record: &RunRecord) -> bool {
    record.filename == config.scene
        && record.width == config.size.width
        && record.height == config.size.height
        && record.samples == config.samples
        && record.bounces == config.bounces
        && config.variant.accepts(&record.implementation)
}

/// True when at least one record in `history` is a run of `config`.
pub fn already_run(config: &Configuration, history: &RunLog) -> bool {
    history
        .records()
        .iter()
        .any(|record| record_matches(config, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runlog::tests::record;
    use crate::space::WindowSize;
    use crate::variant::Variant;

    fn config(variant: Variant) -> Configuration {
        Configuration {
            scene: "a.json".to_string(),
            size: WindowSize::new(800, 600),
            samples: 2,
            bounces: 4,
            variant,
        }
    }

    #[test]
    fn test_empty_history_never_matches() {
        for variant in Variant::ALL {
            assert!(!already_run(&config(variant), &RunLog::default()));
        }
    }

    #[test]
    fn test_recorded_configuration_is_skipped() {
        let history = RunLog::new(vec![record("SequentialRayTracer", "a.json", 100.0)]);
        assert!(already_run(&config(Variant::Sequential), &history));

        let mut more_bounces = config(Variant::Sequential);
        more_bounces.bounces = 6;
        assert!(!already_run(&more_bounces, &history));
    }

    #[test]
    fn test_any_backend_of_the_variant_counts() {
        let metal = RunLog::new(vec![record("MetalRayTracer", "a.json", 10.0)]);
        let cuda = RunLog::new(vec![record("CudaRayTracer", "a.json", 10.0)]);
        assert!(already_run(&config(Variant::Shader), &metal));
        assert!(already_run(&config(Variant::Shader), &cuda));
        assert!(!already_run(&config(Variant::Sequential), &metal));
        assert!(!already_run(&config(Variant::MultiThreaded), &cuda));
    }

    #[test]
    fn test_single_field_difference_does_not_match() {
        let base = record("OpenMPRayTracer", "a.json", 50.0);
        let cfg = config(Variant::MultiThreaded);
        assert!(record_matches(&cfg, &base));

        let variations: Vec<Box<dyn Fn(&mut RunRecord)>> = vec![
            Box::new(|r: &mut RunRecord| r.filename = "b.json".to_string()),
            Box::new(|r: &mut RunRecord| r.width = 1280),
            Box::new(|r: &mut RunRecord| r.height = 720),
            Box::new(|r: &mut RunRecord| r.samples = 1),
            Box::new(|r: &mut RunRecord| r.bounces = 6),
            Box::new(|r: &mut RunRecord| r.implementation = "SequentialRayTracer".to_string()),
        ];
        for vary in variations {
            let mut r = base.clone();
            vary(&mut r);
            assert!(!record_matches(&cfg, &r), "unexpected match for {r:?}");
        }
    }

    #[test]
    fn test_scene_compared_verbatim() {
        let history = RunLog::new(vec![record("SequentialRayTracer", "scene/a.json", 10.0)]);
        assert!(!already_run(&config(Variant::Sequential), &history));
    }

    #[test]
    fn test_unknown_identity_never_satisfies_a_variant() {
        let history = RunLog::new(vec![record("VulkanRayTracer", "a.json", 10.0)]);
        for variant in Variant::ALL {
            assert!(!already_run(&config(variant), &history));
        }
    }

    #[test]
    fn test_match_among_many_records() {
        let mut other = record("SequentialRayTracer", "a.json", 10.0);
        other.samples = 8;
        let history = RunLog::new(vec![
            other,
            record("MetalRayTracer", "b.json", 10.0),
            record("SequentialRayTracer", "a.json", 10.0),
        ]);
        assert!(already_run(&config(Variant::Sequential), &history));
    }
}
