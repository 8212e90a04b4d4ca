/// trade_log.rs — Append-only CSV trade ledger
///
/// The header is written once when the file is created; every trade appends
/// one row. Each append opens the file fresh, so workers for different
/// symbols may share a path without coordinating.
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::models::TradeRecord;

const HEADER: [&str; 6] = ["timestamp", "side", "amount", "price", "order_id", "note"];

pub struct TradeLogger {
    path: PathBuf,
}

impl TradeLogger {
    /// Open (and if necessary create with header) the ledger at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                let mut writer = csv::Writer::from_writer(file);
                writer
                    .write_record(HEADER)
                    .context("Failed to write trade log header")?;
                writer.flush().context("Failed to flush trade log header")?;
            }
            // existing ledger: keep appending to it
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create trade log {path:?}"))
            }
        }
        Ok(Self { path })
    }

    pub fn append(&self, record: &TradeRecord) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open trade log {:?}", self.path))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .serialize(record)
            .context("Failed to serialize trade record")?;
        writer.flush().context("Failed to flush trade record")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Side, SIMULATED_ORDER_ID};
    use chrono::Utc;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mtf_bot_{}_{}.csv", name, std::process::id()))
    }

    fn record(side: Side) -> TradeRecord {
        TradeRecord {
            timestamp: Utc::now(),
            side,
            amount: 0.08,
            price: 50_000.0,
            order_id: SIMULATED_ORDER_ID.to_owned(),
            note: "LONG entry".to_owned(),
        }
    }

    #[test]
    fn writes_header_once_and_appends_rows() {
        let path = temp_path("header_once");
        let _ = std::fs::remove_file(&path);

        let logger = TradeLogger::new(&path).unwrap();
        logger.append(&record(Side::Buy)).unwrap();

        // reopening must not rewrite the header
        let logger = TradeLogger::new(&path).unwrap();
        logger.append(&record(Side::Sell)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,side,amount,price,order_id,note");
        assert!(lines[1].contains("buy"));
        assert!(lines[2].contains("sell"));
        assert!(lines[1].contains("SIMULATED"));

        std::fs::remove_file(&path).unwrap();
    }
}
