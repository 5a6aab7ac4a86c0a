//! Source registry loading.
//!
//! The registry is a UTF-8 CSV with a `source,url,type` header:
//!
//! ```text
//! source,url,type
//! NOS,https://feeds.nos.nl/nosnieuwsalgemeen,RSS
//! TELEGRAAF,https://www.telegraaf.nl/nieuws,HTML
//! ```

use crate::error::PipelineError;
use crate::models::SourceEntry;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Load every source entry from the registry file at `path`.
///
/// # Errors
///
/// A missing file or a row that does not match the header is fatal: the
/// discovery job has nothing sensible to do without a valid registry.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_sources(path: &Path) -> Result<Vec<SourceEntry>, PipelineError> {
    let file = std::fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let sources = read_sources(file).map_err(|e| PipelineError::csv(path, e))?;
    info!(count = sources.len(), "Loaded source registry");
    Ok(sources)
}

/// Parse registry rows from any reader, preserving file order.
pub fn read_sources<R: Read>(reader: R) -> Result<Vec<SourceEntry>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut sources = Vec::new();
    for row in rdr.deserialize() {
        let entry: SourceEntry = row?;
        debug!(source = %entry.name, url = %entry.url, kind = %entry.fetch_type, "Registry entry");
        sources.push(entry);
    }
    Ok(sources)
}
