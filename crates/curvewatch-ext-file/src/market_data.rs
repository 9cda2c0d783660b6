//! File, stdin and in-memory market data sources.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use curvewatch_core::Date;
use curvewatch_traits::{MarketDataEvent, MarketDataSource, PartitionAssignment, TraitError};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info};

/// Curve id for CSV rows without a `curve_type` column.
pub const DEFAULT_CURVE_TYPE: &str = "USD_SOFR";

/// Longest pause between two paced replay events.
const MAX_REPLAY_PAUSE: Duration = Duration::from_secs(60);

// =============================================================================
// STREAM POSITION
// =============================================================================

/// Line-order sequencing, partition filtering and commit bookkeeping shared by the sources.
#[derive(Debug)]
struct StreamPosition {
    assignment: PartitionAssignment,
    read: u64,
    committed: HashMap<u32, u64>,
}

impl StreamPosition {
    fn new(assignment: PartitionAssignment) -> Self {
        Self {
            assignment,
            read: 0,
            committed: HashMap::new(),
        }
    }

    /// Sequence number of the next line.
    fn advance(&mut self) -> u64 {
        self.read += 1;
        self.read
    }

    /// Stamps partition and sequence, or drops the event if the partition is not assigned.
    fn place(&self, event: MarketDataEvent, sequence: u64) -> Option<MarketDataEvent> {
        let partition = self.assignment.partition_of(event.curve_id.as_str());
        if self.assignment.owns(partition) {
            Some(event.with_position(partition, sequence))
        } else {
            debug!(curve_id = %event.curve_id, partition, sequence, "event for unassigned partition filtered");
            None
        }
    }

    fn commit(&mut self, partition: u32, sequence: u64) {
        let entry = self.committed.entry(partition).or_insert(sequence);
        *entry = (*entry).max(sequence);
        debug!(partition, sequence, "committed");
    }
}

// =============================================================================
// CSV REPLAY
// =============================================================================

/// Parses a replay timestamp: ISO date-time, ISO date or Unix epoch milliseconds.
///
/// Date-times without an offset are taken as UTC.
///
/// # Errors
///
/// `ParseError` if no format matches.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TraitError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    if let Ok(millis) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| TraitError::ParseError(format!("timestamp out of range: {raw}")));
    }
    Err(TraitError::ParseError(format!("cannot parse timestamp '{raw}'")))
}

/// Replays a CSV of curve snapshots, one event per row.
///
/// Columns are `timestamp`, `curve_type` and one column per tenor label. Empty or
/// non-numeric rate cells are left out of the event. The curve date is the UTC date of the
/// timestamp.
pub struct CsvReplaySource {
    path: PathBuf,
    headers: csv::StringRecord,
    records: csv::StringRecordsIntoIter<File>,
    position: StreamPosition,
    replay_speed: f64,
    last_timestamp: Option<i64>,
    replayed: u64,
}

impl CsvReplaySource {
    /// Opens a CSV file.
    ///
    /// `replay_speed` paces events by their timestamp gaps divided by the speed (1.0 is real
    /// time). Zero replays as fast as the worker consumes.
    ///
    /// # Errors
    ///
    /// `IoError` if the file cannot be opened, `ParseError` for a missing `timestamp` header.
    pub fn new(
        path: impl AsRef<Path>,
        assignment: PartitionAssignment,
        replay_speed: f64,
    ) -> Result<Self, TraitError> {
        let path = path.as_ref().to_path_buf();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(|e| TraitError::IoError(format!("{}: {e}", path.display())))?;
        let headers = reader
            .headers()
            .map_err(|e| TraitError::ParseError(e.to_string()))?
            .clone();
        if !headers.iter().any(|h| h == "timestamp") {
            return Err(TraitError::ParseError(format!(
                "{}: missing 'timestamp' column",
                path.display()
            )));
        }
        Ok(Self {
            path,
            headers,
            records: reader.into_records(),
            position: StreamPosition::new(assignment),
            replay_speed: replay_speed.max(0.0),
            last_timestamp: None,
            replayed: 0,
        })
    }

    /// Highest committed sequence of a partition.
    #[must_use]
    pub fn committed(&self, partition: u32) -> Option<u64> {
        self.position.committed.get(&partition).copied()
    }

    fn parse_row(&self, row: &csv::StringRecord) -> Result<MarketDataEvent, TraitError> {
        let mut timestamp = None;
        let mut curve_type = None;
        let mut rates = Vec::new();
        for (header, value) in self.headers.iter().zip(row.iter()) {
            match header {
                "timestamp" => timestamp = Some(parse_timestamp(value)?),
                "curve_type" if !value.is_empty() => curve_type = Some(value),
                "curve_type" | "curve_date" => {}
                label => {
                    if let Ok(rate) = value.parse::<f64>() {
                        rates.push((label.to_string(), rate));
                    }
                }
            }
        }
        let timestamp =
            timestamp.ok_or_else(|| TraitError::ParseError("row has no timestamp".into()))?;
        Ok(MarketDataEvent::new(
            timestamp.timestamp_millis(),
            curve_type.unwrap_or(DEFAULT_CURVE_TYPE),
            rates,
        )
        .with_curve_date(Date::from(timestamp.date_naive())))
    }

    async fn pace(&mut self, timestamp: i64) {
        if self.replay_speed > 0.0 {
            if let Some(previous) = self.last_timestamp {
                let gap_ms = timestamp - previous;
                if gap_ms > 0 {
                    let pause = Duration::from_secs_f64(gap_ms as f64 / 1000.0 / self.replay_speed)
                        .min(MAX_REPLAY_PAUSE);
                    if pause > Duration::from_millis(1) {
                        sleep(pause).await;
                    }
                }
            }
        }
        self.last_timestamp = Some(timestamp);
    }
}

#[async_trait]
impl MarketDataSource for CsvReplaySource {
    async fn next_event(&mut self) -> Option<Result<MarketDataEvent, TraitError>> {
        loop {
            let Some(row) = self.records.next() else {
                info!(path = %self.path.display(), rows = self.replayed, "replay finished");
                return None;
            };
            let sequence = self.position.advance();
            let event = match row {
                Ok(row) => self.parse_row(&row),
                Err(e) => Err(TraitError::ParseError(e.to_string())),
            };
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    return Some(Err(TraitError::ParseError(format!("row {sequence}: {e}"))));
                }
            };
            self.pace(event.timestamp).await;
            self.replayed += 1;
            if let Some(event) = self.position.place(event, sequence) {
                return Some(Ok(event));
            }
        }
    }

    async fn commit(&mut self, partition: u32, sequence: u64) -> Result<(), TraitError> {
        self.position.commit(partition, sequence);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("csv replay {}", self.path.display())
    }
}

// =============================================================================
// JSON LINES
// =============================================================================

type LineReader = Lines<BufReader<Box<dyn AsyncRead + Send + Unpin>>>;

/// Reads wire-format events, one JSON object per line. Blank lines are ignored.
pub struct JsonLinesSource {
    label: String,
    lines: LineReader,
    position: StreamPosition,
    finished: bool,
}

impl JsonLinesSource {
    /// Wraps any async reader.
    pub fn from_reader(
        reader: impl AsyncRead + Send + Unpin + 'static,
        label: impl Into<String>,
        assignment: PartitionAssignment,
    ) -> Self {
        let boxed: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
        Self {
            label: label.into(),
            lines: BufReader::new(boxed).lines(),
            position: StreamPosition::new(assignment),
            finished: false,
        }
    }

    /// Opens a file.
    ///
    /// # Errors
    ///
    /// `IoError` if the file cannot be opened.
    pub async fn open(
        path: impl AsRef<Path>,
        assignment: PartitionAssignment,
    ) -> Result<Self, TraitError> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| TraitError::IoError(format!("{}: {e}", path.display())))?;
        Ok(Self::from_reader(file, format!("jsonl {}", path.display()), assignment))
    }

    /// Reads standard input.
    #[must_use]
    pub fn stdin(assignment: PartitionAssignment) -> Self {
        Self::from_reader(tokio::io::stdin(), "stdin", assignment)
    }

    /// Highest committed sequence of a partition.
    #[must_use]
    pub fn committed(&self, partition: u32) -> Option<u64> {
        self.position.committed.get(&partition).copied()
    }
}

#[async_trait]
impl MarketDataSource for JsonLinesSource {
    async fn next_event(&mut self) -> Option<Result<MarketDataEvent, TraitError>> {
        while !self.finished {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            };
            let sequence = self.position.advance();
            if line.trim().is_empty() {
                continue;
            }
            match MarketDataEvent::from_json(&line) {
                Ok(event) => {
                    if let Some(event) = self.position.place(event, sequence) {
                        return Some(Ok(event));
                    }
                }
                Err(e) => {
                    return Some(Err(TraitError::ParseError(format!("line {sequence}: {e}"))));
                }
            }
        }
        self.finished = true;
        None
    }

    async fn commit(&mut self, partition: u32, sequence: u64) -> Result<(), TraitError> {
        self.position.commit(partition, sequence);
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

// =============================================================================
// CHANNEL
// =============================================================================

/// In-process stream fed through an mpsc channel. Ends when every sender is dropped.
pub struct ChannelMarketDataSource {
    rx: mpsc::Receiver<MarketDataEvent>,
    position: StreamPosition,
}

impl ChannelMarketDataSource {
    /// Creates the source and its sender. Sequences follow send order.
    #[must_use]
    pub fn new(
        capacity: usize,
        assignment: PartitionAssignment,
    ) -> (mpsc::Sender<MarketDataEvent>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            tx,
            Self {
                rx,
                position: StreamPosition::new(assignment),
            },
        )
    }

    /// Highest committed sequence of a partition.
    #[must_use]
    pub fn committed(&self, partition: u32) -> Option<u64> {
        self.position.committed.get(&partition).copied()
    }
}

#[async_trait]
impl MarketDataSource for ChannelMarketDataSource {
    async fn next_event(&mut self) -> Option<Result<MarketDataEvent, TraitError>> {
        loop {
            let event = self.rx.recv().await?;
            let sequence = self.position.advance();
            if let Some(event) = self.position.place(event, sequence) {
                return Some(Ok(event));
            }
        }
    }

    async fn commit(&mut self, partition: u32, sequence: u64) -> Result<(), TraitError> {
        self.position.commit(partition, sequence);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory channel".into()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = 1_769_558_400_000;
        assert_eq!(parse_timestamp("2026-01-28").unwrap().timestamp_millis(), expected);
        assert_eq!(parse_timestamp("2026-01-28T00:00:00").unwrap().timestamp_millis(), expected);
        assert_eq!(parse_timestamp("2026-01-28T00:00:00Z").unwrap().timestamp_millis(), expected);
        assert_eq!(parse_timestamp("1769558400000").unwrap().timestamp_millis(), expected);
        assert_eq!(
            parse_timestamp("2026-01-28T10:30:00.250").unwrap().timestamp_millis(),
            expected + 37_800_250
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_csv_replay_rows() {
        let file = write_temp(
            "timestamp,curve_type,1Y,2Y,5Y\n\
             2026-01-28T10:00:00,USD_SOFR,0.042,0.041,\n\
             not-a-time,USD_SOFR,0.042,0.041,0.040\n\
             1769594400000,,0.0421,abc,0.0401\n",
        );
        let mut source = CsvReplaySource::new(file.path(), PartitionAssignment::single(), 0.0).unwrap();

        let first = source.next_event().await.unwrap().unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.curve_id.as_str(), "USD_SOFR");
        assert_eq!(first.rates.len(), 2);
        assert_eq!(first.curve_date, Some(Date::from_ymd(2026, 1, 28).unwrap()));

        assert!(source.next_event().await.unwrap().is_err());

        let third = source.next_event().await.unwrap().unwrap();
        assert_eq!(third.sequence, 3);
        assert_eq!(third.curve_id.as_str(), DEFAULT_CURVE_TYPE);
        assert_eq!(third.rates.keys().collect::<Vec<_>>(), ["1Y", "5Y"]);

        assert!(source.next_event().await.is_none());
    }

    #[test]
    fn test_csv_requires_timestamp_column() {
        let file = write_temp("curve_type,2Y\nUSD_SOFR,0.04\n");
        assert!(CsvReplaySource::new(file.path(), PartitionAssignment::single(), 0.0).is_err());
    }

    #[tokio::test]
    async fn test_replay_speed_paces_by_gap() {
        let file = write_temp(
            "timestamp,curve_type,2Y\n\
             2026-01-28T10:00:00.000,USD_SOFR,0.041\n\
             2026-01-28T10:00:00.080,USD_SOFR,0.042\n",
        );
        let mut source = CsvReplaySource::new(file.path(), PartitionAssignment::single(), 1.0).unwrap();
        source.next_event().await.unwrap().unwrap();

        let before = std::time::Instant::now();
        source.next_event().await.unwrap().unwrap();
        assert!(before.elapsed() >= Duration::from_millis(75));
    }

    #[tokio::test]
    async fn test_json_lines_sequences_by_line() {
        let lines = [
            r#"{"timestamp":1769558400000,"curve_type":"USD_SOFR","rates":{"2Y":0.041}}"#,
            "",
            "{not json",
            r#"{"timestamp":1769558402000,"curve_date":"2026-01-27","curve_type":"USD_SOFR","rates":{"2Y":0.042}}"#,
        ]
        .join("\n");
        let mut source = JsonLinesSource::from_reader(
            std::io::Cursor::new(lines.into_bytes()),
            "test",
            PartitionAssignment::single(),
        );

        let first = source.next_event().await.unwrap().unwrap();
        assert_eq!((first.partition, first.sequence), (0, 1));
        assert!(source.next_event().await.unwrap().is_err());

        let last = source.next_event().await.unwrap().unwrap();
        assert_eq!(last.sequence, 4);
        assert_eq!(last.curve_date, Some(Date::from_ymd(2026, 1, 27).unwrap()));
        assert!(source.next_event().await.is_none());
        assert!(source.next_event().await.is_none());

        source.commit(0, 4).await.unwrap();
        source.commit(0, 1).await.unwrap();
        assert_eq!(source.committed(0), Some(4));
    }

    #[tokio::test]
    async fn test_json_lines_filters_unassigned_partitions() {
        let lines = [
            r#"{"timestamp":1,"curve_type":"USD_SOFR","rates":{}}"#,
            r#"{"timestamp":2,"curve_type":"GBP_SONIA","rates":{}}"#,
            r#"{"timestamp":3,"curve_type":"USD_SOFR","rates":{}}"#,
        ]
        .join("\n");
        let assignment = PartitionAssignment::new([1], 2).unwrap();
        assert_eq!(assignment.partition_of("GBP_SONIA"), 1);
        assert_eq!(assignment.partition_of("USD_SOFR"), 0);

        let mut source =
            JsonLinesSource::from_reader(std::io::Cursor::new(lines.into_bytes()), "test", assignment);
        let only = source.next_event().await.unwrap().unwrap();
        assert_eq!(only.curve_id.as_str(), "GBP_SONIA");
        assert_eq!((only.partition, only.sequence), (1, 2));
        assert!(source.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_channel_source() {
        let (tx, mut source) = ChannelMarketDataSource::new(4, PartitionAssignment::single());
        tx.send(MarketDataEvent::new(1, "USD_SOFR", [("2Y".to_string(), 0.04)]))
            .await
            .unwrap();
        drop(tx);

        let event = source.next_event().await.unwrap().unwrap();
        assert_eq!((event.partition, event.sequence), (0, 1));
        assert!(source.next_event().await.is_none());
    }
}
