//! Reading and writing the files that connect the two jobs.
//!
//! - The **manifest** (`articles_<date>.csv`) is appended by discovery. The
//!   header is written only when the file is new or empty, so a second
//!   discovery run on the same day adds its rows below the first.
//! - The **content file** (`content_<date>.jsonl`) is recreated by every
//!   fetch run and receives one JSON object per line, flushed as each row
//!   completes.

use crate::error::PipelineError;
use crate::models::{ContentRecord, DiscoveredArticle};
use std::fs::OpenOptions;
use std::io::Read;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Append `articles` to the manifest at `path`, creating it if needed.
///
/// # Errors
///
/// Fails if the parent directory cannot be created or the file cannot be
/// written.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub fn append_manifest(path: &Path, articles: &[DiscoveredArticle]) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PipelineError::io(path, e))?;
    let needs_header = file
        .metadata()
        .map_err(|e| PipelineError::io(path, e))?
        .len()
        == 0;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    for article in articles {
        wtr.serialize(article).map_err(|e| PipelineError::csv(path, e))?;
    }
    wtr.flush().map_err(|e| PipelineError::io(path, e))?;

    info!(header = needs_header, "Appended manifest rows");
    Ok(())
}

/// Read every row of the manifest at `path`, in file order.
///
/// # Errors
///
/// A missing or malformed manifest is fatal for the fetch job.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_manifest(path: &Path) -> Result<Vec<DiscoveredArticle>, PipelineError> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let rows = parse_manifest(file).map_err(|e| PipelineError::csv(path, e))?;
    info!(count = rows.len(), "Loaded manifest");
    Ok(rows)
}

/// Parse manifest rows from any reader. A missing `time_published` column
/// reads as empty strings.
pub fn parse_manifest<R: Read>(reader: R) -> Result<Vec<DiscoveredArticle>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}

/// Line-oriented writer for the content file.
#[derive(Debug)]
pub struct ContentWriter {
    path: PathBuf,
    file: fs::File,
    written: usize,
}

impl ContentWriter {
    /// Create (or truncate) the content file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn create(path: &Path) -> Result<Self, PipelineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::io(parent, e))?;
        }
        let file = fs::File::create(path)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        debug!("Opened content file");
        Ok(Self {
            path: path.to_path_buf(),
            file,
            written: 0,
        })
    }

    /// Serialize `record` as a single JSON line and flush it to disk.
    pub async fn write(&mut self, record: &ContentRecord) -> Result<(), PipelineError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .await
            .map_err(|e| PipelineError::io(&self.path, e))?;
        self.file
            .flush()
            .await
            .map_err(|e| PipelineError::io(&self.path, e))?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleFields;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
    }

    fn sample() -> Vec<DiscoveredArticle> {
        vec![
            DiscoveredArticle {
                source: "EXAMPLE".to_string(),
                url: "https://example.com/a".to_string(),
                date_found: "2024-01-06".to_string(),
                date_published: "2024-01-05".to_string(),
                time_published: "10:30:00".to_string(),
            },
            DiscoveredArticle::undated("SITE", "https://example.com/b?x=1,2", day()),
        ]
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("articles_2024-01-06.csv");

        append_manifest(&path, &sample()).unwrap();
        append_manifest(&path, &sample()[..1]).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(
            lines[0],
            "source,url,date_found,date_published,time_published"
        );
        assert_eq!(lines[1], "EXAMPLE,https://example.com/a,2024-01-06,2024-01-05,10:30:00");
        assert_eq!(lines[2], "SITE,\"https://example.com/b?x=1,2\",2024-01-06,,");
        assert_eq!(lines.len(), 4);

        let rows = read_manifest(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], rows[2]);
        assert_eq!(rows[1].url, "https://example.com/b?x=1,2");
    }

    #[test]
    fn test_parse_manifest_without_time_column() {
        let raw = "source,url,date_found,date_published\nNOS,https://nos.nl/a,2024-01-06,2024-01-05\n";
        let rows = parse_manifest(raw.as_bytes()).unwrap();
        assert_eq!(rows[0].date_published, "2024-01-05");
        assert_eq!(rows[0].time_published, "");
    }

    #[test]
    fn test_read_manifest_missing_is_fatal() {
        let err = read_manifest(Path::new("/no/such/articles.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[tokio::test]
    async fn test_content_writer_truncates_and_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content_2024-01-06.jsonl");
        std::fs::write(&path, "stale\n").unwrap();

        let mut writer = ContentWriter::create(&path).await.unwrap();
        let record = ContentRecord::new(sample().remove(0), ArticleFields::default());
        writer.write(&record).await.unwrap();
        writer.write(&record).await.unwrap();
        assert_eq!(writer.written(), 2);

        let raw = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let back: ContentRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back, record);
    }
}
