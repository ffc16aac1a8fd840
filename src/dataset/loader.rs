//! CSV input and output of traffic samples.
//!
//! Files carry a header row with the sample field names. The `label` column
//! is optional and may be left empty for unlabelled rows.

use crate::core::error::{Result, TrafficGbdtError};
use crate::dataset::sample::TrafficSample;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Read samples from a CSV file.
pub fn load_samples_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TrafficSample>> {
    let path = path.as_ref();
    log::info!("Loading samples from {}", path.display());
    let file = File::open(path)?;
    read_samples_csv(file)
}

/// Read samples from any CSV source.
pub fn read_samples_csv<R: Read>(reader: R) -> Result<Vec<TrafficSample>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (row, record) in reader.deserialize::<TrafficSample>().enumerate() {
        let sample = record?;
        sample
            .validate()
            .map_err(|e| TrafficGbdtError::data(format!("row {}: {}", row + 1, e)))?;
        samples.push(sample);
    }

    if samples.is_empty() {
        return Err(TrafficGbdtError::data("CSV input contains no samples"));
    }
    log::debug!("Read {} samples", samples.len());
    Ok(samples)
}

/// Write samples to a CSV file, creating or truncating it.
pub fn save_samples_csv<P: AsRef<Path>>(path: P, samples: &[TrafficSample]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_samples_csv(file, samples)?;
    log::info!("Wrote {} samples to {}", samples.len(), path.as_ref().display());
    Ok(())
}

/// Write samples with a header row.
pub fn write_samples_csv<W: Write>(writer: W, samples: &[TrafficSample]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for sample in samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generator::generate;
    use tempfile::NamedTempFile;

    const HEADER: &str = "packet_count,avg_packet_size,packet_duration,interval_between_packets,packet_frequency,total_data_sent,source_destination_ratio,label\n";

    #[test]
    fn test_read_labelled_and_unlabelled_rows() {
        let data = format!(
            "{}150,500,100,50,4,3000,1.0,true\n700,2000,300,20,10,9000,3.5,false\n400,1500,0,0,0,0,0,\n",
            HEADER
        );
        let samples = read_samples_csv(data.as_bytes()).unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].packet_count, 150);
        assert_eq!(samples[0].label, Some(true));
        assert_eq!(samples[1].source_destination_ratio, 3.5);
        assert!(samples[1].is_anomaly());
        assert_eq!(samples[2].label, None);
    }

    #[test]
    fn test_rejects_bad_rows() {
        let negative_ratio = format!("{}150,500,100,50,4,3000,-1.0,true\n", HEADER);
        assert!(read_samples_csv(negative_ratio.as_bytes())
            .unwrap_err()
            .is_data_error());

        let not_a_number = format!("{}abc,500,100,50,4,3000,1.0,true\n", HEADER);
        let err = read_samples_csv(not_a_number.as_bytes()).unwrap_err();
        assert_eq!(err.category(), "csv");

        assert!(read_samples_csv(HEADER.as_bytes()).unwrap_err().is_data_error());
    }

    #[test]
    fn test_file_round_trip() {
        let samples = generate(25, 0.3, Some(9)).unwrap();
        let file = NamedTempFile::new().unwrap();

        save_samples_csv(file.path(), &samples).unwrap();
        let loaded = load_samples_csv(file.path()).unwrap();
        assert_eq!(loaded, samples);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_samples_csv("/nonexistent/samples.csv").unwrap_err();
        assert_eq!(err.category(), "io");
    }
}
