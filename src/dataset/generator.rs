//! Synthetic labelled traffic generation.
//!
//! Each draw first picks the class with a Bernoulli(anomaly_probability)
//! trial and then draws every field independently and uniformly from the
//! class profile's half-open integer range. All randomness flows through an
//! explicitly passed generator, so a fixed seed reproduces the sequence.

use crate::config::Config;
use crate::core::error::{Result, TrafficGbdtError};
use crate::dataset::sample::TrafficSample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Half-open integer range `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRange {
    /// Inclusive lower bound
    pub low: u32,
    /// Exclusive upper bound
    pub high: u32,
}

impl FieldRange {
    /// Create a range `[low, high)`.
    pub const fn new(low: u32, high: u32) -> Self {
        FieldRange { low, high }
    }

    /// True when `value` lies in the range.
    pub fn contains(&self, value: u32) -> bool {
        value >= self.low && value < self.high
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.low..self.high)
    }
}

/// Class-conditional field ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProfile {
    /// Range of `packet_count`
    pub packet_count: FieldRange,
    /// Range of `avg_packet_size`
    pub avg_packet_size: FieldRange,
    /// Range of `packet_duration`
    pub packet_duration: FieldRange,
    /// Range of `interval_between_packets`
    pub interval_between_packets: FieldRange,
    /// Range of `packet_frequency`
    pub packet_frequency: FieldRange,
    /// Range of `total_data_sent`
    pub total_data_sent: FieldRange,
    /// Range of `source_destination_ratio` (drawn as an integer)
    pub source_destination_ratio: FieldRange,
}

impl ClassProfile {
    /// Ranges for regular traffic.
    pub fn normal() -> Self {
        ClassProfile {
            packet_count: FieldRange::new(80, 300),
            avg_packet_size: FieldRange::new(400, 800),
            packet_duration: FieldRange::new(50, 150),
            interval_between_packets: FieldRange::new(40, 80),
            packet_frequency: FieldRange::new(3, 6),
            total_data_sent: FieldRange::new(2000, 5000),
            source_destination_ratio: FieldRange::new(1, 2),
        }
    }

    /// Ranges for bursty, oversized, rapid traffic.
    pub fn anomaly() -> Self {
        ClassProfile {
            packet_count: FieldRange::new(500, 1000),
            avg_packet_size: FieldRange::new(1500, 3000),
            packet_duration: FieldRange::new(200, 400),
            interval_between_packets: FieldRange::new(10, 30),
            packet_frequency: FieldRange::new(7, 15),
            total_data_sent: FieldRange::new(7000, 14000),
            source_destination_ratio: FieldRange::new(2, 5),
        }
    }

    fn fields(&self) -> [(&'static str, FieldRange); 7] {
        [
            ("packet_count", self.packet_count),
            ("avg_packet_size", self.avg_packet_size),
            ("packet_duration", self.packet_duration),
            ("interval_between_packets", self.interval_between_packets),
            ("packet_frequency", self.packet_frequency),
            ("total_data_sent", self.total_data_sent),
            ("source_destination_ratio", self.source_destination_ratio),
        ]
    }

    /// Reject empty ranges.
    pub fn validate(&self, class_name: &str) -> Result<()> {
        for (name, range) in self.fields() {
            if range.low >= range.high {
                return Err(TrafficGbdtError::invalid_parameter(
                    format!("{}.{}", class_name, name),
                    format!("[{}, {})", range.low, range.high),
                    "range must be non-empty",
                ));
            }
        }
        Ok(())
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R, label: bool) -> TrafficSample {
        TrafficSample {
            packet_count: self.packet_count.sample(rng),
            avg_packet_size: self.avg_packet_size.sample(rng),
            packet_duration: self.packet_duration.sample(rng),
            interval_between_packets: self.interval_between_packets.sample(rng),
            packet_frequency: self.packet_frequency.sample(rng),
            total_data_sent: self.total_data_sent.sample(rng),
            source_destination_ratio: self.source_destination_ratio.sample(rng) as f64,
            label: Some(label),
        }
    }
}

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Probability that a draw is an anomaly
    pub anomaly_probability: f64,
    /// Ranges used for normal samples
    pub normal: ClassProfile,
    /// Ranges used for anomalous samples
    pub anomaly: ClassProfile,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            anomaly_probability: crate::core::constants::DEFAULT_ANOMALY_PROBABILITY,
            normal: ClassProfile::normal(),
            anomaly: ClassProfile::anomaly(),
        }
    }
}

impl GeneratorConfig {
    /// Validate probability and ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.anomaly_probability) {
            return Err(TrafficGbdtError::invalid_parameter(
                "anomaly_probability",
                self.anomaly_probability.to_string(),
                "must be in range [0.0, 1.0]",
            ));
        }
        self.normal.validate("normal")?;
        self.anomaly.validate("anomaly")
    }
}

/// Produces labelled synthetic traffic samples.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    config: GeneratorConfig,
}

impl SampleGenerator {
    /// Create a generator after validating its settings.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(SampleGenerator { config })
    }

    /// Create a generator with the default class profiles.
    pub fn with_anomaly_probability(anomaly_probability: f64) -> Result<Self> {
        Self::new(GeneratorConfig {
            anomaly_probability,
            ..GeneratorConfig::default()
        })
    }

    /// Create a generator from the harness configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_anomaly_probability(config.anomaly_probability)
    }

    /// Generator settings.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draw `count` samples. A fixed `seed` makes the output reproducible;
    /// without one the generator is seeded from system entropy.
    pub fn generate(&self, count: usize, seed: Option<u64>) -> Result<Vec<TrafficSample>> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate_with_rng(count, &mut rng)
    }

    /// Draw `count` samples from a caller-owned random generator.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<TrafficSample>> {
        if count == 0 {
            return Err(TrafficGbdtError::invalid_parameter(
                "count",
                "0",
                "must be positive",
            ));
        }

        let samples: Vec<TrafficSample> = (0..count)
            .map(|_| {
                let is_anomaly = rng.gen_bool(self.config.anomaly_probability);
                let profile = if is_anomaly {
                    &self.config.anomaly
                } else {
                    &self.config.normal
                };
                profile.draw(rng, !is_anomaly)
            })
            .collect();

        let anomalies = samples.iter().filter(|s| s.is_anomaly()).count();
        log::info!(
            "Generated {} samples ({} normal, {} anomalous)",
            count,
            count - anomalies,
            anomalies
        );

        Ok(samples)
    }
}

/// Draw `count` samples with the default class profiles.
pub fn generate(count: usize, anomaly_probability: f64, seed: Option<u64>) -> Result<Vec<TrafficSample>> {
    SampleGenerator::with_anomaly_probability(anomaly_probability)?.generate(count, seed)
}
