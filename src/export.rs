//! Spreadsheet and CSV sinks. No transformation logic of its own: the rows
//! arrive flattened, this module only serializes them. Both writers go
//! through a sibling temp file and a rename, so the target path never holds
//! a half-written artifact.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::{Error, Result};
use crate::model::{TableRow, Tweet};

const WORKBOOK_HEADER: [&str; 6] = ["ID", "LEN", "DATE", "SOURCE", "LIKES", "RETWEETS"];
const CSV_HEADER: [&str; 4] = ["username", "tweet_id", "created_at", "text"];
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write the flattened table to an xlsx workbook: one header row, then one
/// row per tweet in input order.
pub fn write_workbook(rows: &[TableRow], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, title) in WORKBOOK_HEADER.iter().enumerate() {
        sheet
            .write(0, col as u16, *title)
            .map_err(|e| Error::Write(e.to_string()))?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet
            .write(r, 0, row.id)
            .and_then(|s| s.write(r, 1, row.len as u64))
            .and_then(|s| s.write(r, 2, row.date.format(DATE_FORMAT).to_string()))
            .and_then(|s| s.write(r, 3, row.source.as_str()))
            .and_then(|s| s.write(r, 4, row.likes))
            .and_then(|s| s.write(r, 5, row.retweets))
            .map_err(|e| Error::Write(e.to_string()))?;
    }

    let tmp = sibling_tmp(path);
    workbook
        .save(&tmp)
        .map_err(|e| Error::Write(format!("cannot save {}: {e}", tmp.display())))?;
    replace(&tmp, path)?;
    info!(rows = rows.len(), path = %path.display(), "workbook written");
    Ok(())
}

/// Write the per-tweet CSV (`username, tweet_id, created_at, text`), UTF-8.
pub fn write_csv(tweets: &[Tweet], path: &Path) -> Result<()> {
    let tmp = sibling_tmp(path);
    let mut writer = csv::Writer::from_path(&tmp)
        .map_err(|e| Error::Write(format!("cannot create {}: {e}", tmp.display())))?;

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| Error::Write(e.to_string()))?;
    for tweet in tweets {
        writer
            .write_record([
                tweet.user.screen_name.as_str(),
                &tweet.id.to_string(),
                &tweet.created_at.format(DATE_FORMAT).to_string(),
                tweet.full_text.as_str(),
            ])
            .map_err(|e| Error::Write(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| Error::Write(e.to_string()))?;
    drop(writer);

    replace(&tmp, path)?;
    info!(rows = tweets.len(), path = %path.display(), "csv written");
    Ok(())
}

// Suffixed with the pid so concurrent exports to the same target cannot
// race on one temp file; the final rename stays atomic either way.
fn sibling_tmp(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

fn replace(tmp: &Path, path: &Path) -> Result<()> {
    std::fs::rename(tmp, path).map_err(|e| {
        Error::Write(format!(
            "cannot move {} into place at {}: {e}",
            tmp.display(),
            path.display()
        ))
    })
}
