//! Property tests for metrics, normalization, generation and training.

use ndarray::Array1;
use proptest::prelude::*;
use traffic_gbdt::dataset::ClassProfile;
use traffic_gbdt::metrics_eval::auc;
use traffic_gbdt::*;

mod common;
use common::*;

fn scored_labels() -> impl Strategy<Value = (Vec<f64>, Vec<bool>)> {
    (1usize..60).prop_flat_map(|n| {
        (
            prop::collection::vec(0.0f64..=1.0, n),
            prop::collection::vec(any::<bool>(), n),
        )
    })
}

proptest! {
    #[test]
    fn prop_metrics_are_bounded((probabilities, labels) in scored_labels()) {
        let probabilities = Array1::from(probabilities);
        let metrics = Evaluator::new()
            .evaluate_probabilities(&probabilities.view(), &labels)
            .unwrap();
        assert_metrics_bounded(&metrics);
        prop_assert_eq!(metrics.num_samples(), labels.len());
    }

    #[test]
    fn prop_auc_flips_with_labels((scores, labels) in scored_labels()) {
        let positives = labels.iter().filter(|&&l| l).count();
        prop_assume!(positives > 0 && positives < labels.len());

        let scores = Array1::from(scores);
        let flipped: Vec<bool> = labels.iter().map(|l| !l).collect();
        let sum = auc(&scores.view(), &labels) + auc(&scores.view(), &flipped);
        prop_assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prop_normalized_training_features_in_unit_interval(seed in any::<u64>(), count in 2usize..80) {
        let samples = generate(count, 0.3, Some(seed)).unwrap();
        let (_, matrix) = FeatureAssembler::new().fit_transform(&samples).unwrap();
        for &value in matrix.iter() {
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn prop_generator_is_deterministic_and_in_range(seed in any::<u64>(), p in 0.0f64..=1.0) {
        let first = generate(40, p, Some(seed)).unwrap();
        let second = generate(40, p, Some(seed)).unwrap();
        prop_assert_eq!(&first, &second);

        let normal = ClassProfile::normal();
        let anomaly = ClassProfile::anomaly();
        for sample in &first {
            let profile = if sample.is_anomaly() { &anomaly } else { &normal };
            prop_assert!(profile.packet_count.contains(sample.packet_count));
            prop_assert!(profile.avg_packet_size.contains(sample.avg_packet_size));
            prop_assert!(profile.total_data_sent.contains(sample.total_data_sent));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_training_loss_non_increasing(seed in any::<u64>(), learning_rate in 0.05f64..=1.0) {
        let samples = generate(60, 0.3, Some(seed)).unwrap();
        let config = Config {
            learning_rate,
            ..create_test_config(10)
        };
        let (_, history) = TrainingPipeline::fit_with_history(&samples, &config).unwrap();
        prop_assert!(history.is_non_increasing(1e-9));
    }
}
