//! Row sinks: where finished report rows go.

use std::fs::File;
use std::path::Path;

/// The report file cannot be created or written.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("flush failed: {0}")]
    Flush(#[from] std::io::Error),
}

/// Append-only row consumer. Implementations must keep emission order; the
/// scan loop relies on rows landing exactly as handed over.
pub trait RowSink {
    fn write_row(&mut self, row: &[String]) -> Result<(), SinkError>;

    /// Push buffered rows to stable storage. Called after every host so an
    /// interrupted run still leaves a parseable report behind.
    fn flush(&mut self) -> Result<(), SinkError>;
}

/// Semicolon-delimited file writer. Fields are never quoted; raw values must
/// not contain the delimiter (that contract sits with the data, not here).
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    pub const DELIMITER: u8 = b';';

    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|source| SinkError::Create {
            path: path.display().to_string(),
            source,
        })?;
        let writer = csv::WriterBuilder::new()
            .delimiter(Self::DELIMITER)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(file);
        Ok(Self { writer })
    }
}

impl RowSink for CsvSink {
    fn write_row(&mut self, row: &[String]) -> Result<(), SinkError> {
        self.writer.write_record(row)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory sink for tests.
#[derive(Debug, Default)]
pub struct VecSink {
    pub rows: Vec<Vec<String>>,
}

impl RowSink for VecSink {
    fn write_row(&mut self, row: &[String]) -> Result<(), SinkError> {
        self.rows.push(row.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_sink_writes_semicolon_rows_without_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let mut sink = CsvSink::create(&path).unwrap();
        sink.write_row(&["hostname".into(), "system_owner".into()])
            .unwrap();
        sink.write_row(&["web01".into(), "Jane Doe".into()]).unwrap();
        sink.flush().unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "hostname;system_owner\nweb01;Jane Doe\n");
    }

    #[test]
    fn csv_sink_reports_unwritable_target() {
        let err = CsvSink::create(Path::new("/nonexistent-dir/report.csv"))
            .err()
            .expect("must fail");
        assert!(matches!(err, SinkError::Create { .. }));
    }
}
