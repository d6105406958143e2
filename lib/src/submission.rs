//! Prediction output: one decimal rating per line, in input order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::Result;

/// Writes each prediction on its own line.
pub fn write_predictions<W: Write>(mut writer: W, predictions: &[f64]) -> Result<()> {
    for prediction in predictions {
        writeln!(writer, "{prediction}")?;
    }
    writer.flush()?;
    Ok(())
}

/// [`write_predictions`] into a newly created file at `path`.
pub fn save_predictions<P: AsRef<Path>>(path: P, predictions: &[f64]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_predictions(BufWriter::new(file), predictions)?;
    info!(path = %path.display(), count = predictions.len(), "wrote predictions");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_per_prediction() {
        let mut out = Vec::new();
        write_predictions(&mut out, &[3.5, 4.0, 1.25]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3.5\n4\n1.25\n");
    }

    #[test]
    fn test_empty_predictions_write_nothing() {
        let mut out = Vec::new();
        write_predictions(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_values_parse_back_in_order() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let predictions = [2.718281828, 3.0, 4.999];
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("submission.txt");

        save_predictions(&path, &predictions)?;
        let parsed: Vec<f64> = std::fs::read_to_string(&path)?
            .lines()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()?;

        assert_eq!(parsed, predictions);
        Ok(())
    }
}
