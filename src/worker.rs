use std::path::Path;

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, Sender};
use csv_editor::Grid;

#[derive(Debug)]
pub enum IoRequest {
    Load {
        path: String,
    },
    Save {
        path: String,
        grid: Grid,
        /// Session revision the snapshot was taken at
        revision: u64,
    },
}

#[derive(Debug)]
pub enum IoResponse {
    Loaded {
        path: String,
        grid: Grid,
    },
    Saved {
        path: String,
        rows: usize,
        revision: u64,
    },
    Error(String),
}

pub fn start_io_worker(req_rx: Receiver<IoRequest>, resp_tx: Sender<IoResponse>) {
    while let Ok(req) = req_rx.recv() {
        let result = match req {
            IoRequest::Load { path } => {
                load_csv(Path::new(&path)).map(|grid| IoResponse::Loaded { path, grid })
            }
            IoRequest::Save {
                path,
                grid,
                revision,
            } => save_csv(Path::new(&path), &grid).map(|rows| IoResponse::Saved {
                path,
                rows,
                revision,
            }),
        };

        match result {
            Ok(resp) => {
                let _ = resp_tx.send(resp);
            }
            Err(e) => {
                tracing::warn!("csv worker: {e:#}");
                let _ = resp_tx.send(IoResponse::Error(format!("{e:#}")));
            }
        }
    }
}

/// Read a CSV file: the first record is the header row, the rest are data.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn load_csv(path: &Path) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut records = Vec::new();
    for record in reader.byte_records() {
        let record = record.with_context(|| format!("failed to read {}", path.display()))?;
        records.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect::<Vec<_>>(),
        );
    }
    if records.is_empty() {
        bail!("{} is empty", path.display());
    }

    let mut headers = records.remove(0);
    if let Some(first) = headers.first_mut()
        && first.starts_with('\u{feff}')
    {
        first.remove(0);
    }
    tracing::info!(
        path = %path.display(),
        rows = records.len(),
        cols = headers.len(),
        "loaded csv"
    );
    Ok(Grid::from_records(headers, records))
}

/// Write the header row then every data row. Headers are written as stored,
/// so unlabeled columns stay blank. Returns the number of data rows written.
pub fn save_csv(path: &Path, grid: &Grid) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(grid.headers())?;
    for row in grid.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = grid.row_count(), "saved csv");
    Ok(grid.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_splits_header_and_pads_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "\u{feff}t,speed\n0,1.5,extra\n1\n").unwrap();

        let grid = load_csv(&path).unwrap();
        assert_eq!(grid.headers(), ["t", "speed", ""]);
        assert_eq!(grid.row(0), ["0", "1.5", "extra"]);
        assert_eq!(grid.row(1), ["1", "", ""]);
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        let err = load_csv(&path).unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn save_then_load_preserves_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut grid = Grid::from_records(
            vec!["name".into(), String::new()],
            vec![vec!["a,b".into(), "say \"hi\"".into()]],
        );
        grid.set(2, 0, "last");

        assert_eq!(save_csv(&path, &grid).unwrap(), 3);
        let back = load_csv(&path).unwrap();
        assert_eq!(back.headers(), ["name", ""]);
        assert_eq!(back.row(0), ["a,b", "say \"hi\""]);
        assert_eq!(back.row(1), ["", ""]);
        assert_eq!(back.get(2, 0), "last");
    }

    #[test]
    fn blank_headers_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.csv");
        let grid = Grid::from_records(
            vec![String::new(), "b".into(), String::new()],
            vec![vec!["1".into(), "2".into(), "3".into()]],
        );
        save_csv(&path, &grid).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), ",b,\n1,2,3\n");
        assert_eq!(load_csv(&path).unwrap(), grid);
    }

    #[test]
    fn worker_reports_errors_instead_of_panicking() {
        let (req_tx, req_rx) = crossbeam_channel::unbounded();
        let (resp_tx, resp_rx) = crossbeam_channel::unbounded();
        req_tx
            .send(IoRequest::Load {
                path: "/definitely/not/here.csv".into(),
            })
            .unwrap();
        drop(req_tx);
        start_io_worker(req_rx, resp_tx);
        assert!(matches!(resp_rx.recv().unwrap(), IoResponse::Error(_)));
    }
}
