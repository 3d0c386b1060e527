//! Discovery and parsing of the input CSV files.
//!
//! Every `*.csv` file in the input directory is read independently and the
//! rows are concatenated in file order. Nothing is merged or deduplicated, so
//! the combined row count is always the sum of the per-file counts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::LoadError;
use crate::schema::ColumnIndex;

const INPUT_EXTENSION: &str = "csv";

/// Cell values read as missing in addition to the empty string.
const MISSING_MARKERS: [&str; 19] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "",
];

fn is_missing(value: &str) -> bool {
    MISSING_MARKERS.contains(&value)
}

/// One row as read from disk, aligned to [`RawDataset::columns`].
///
/// Empty or placeholder cells (`NA`, `null`, ...), and columns the source
/// file did not have, are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    values: Vec<Option<String>>,
}

impl RawRecord {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Value at column `index`, or `None` if missing.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// True when every one of the first `width` columns has a value.
    pub fn is_complete(&self, width: usize) -> bool {
        (0..width).all(|i| self.get(i).is_some())
    }
}

/// A file that contributed rows to the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub rows: usize,
}

/// All input rows, concatenated across files.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    /// Union of every file's headers, in first-seen order.
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
    pub sources: Vec<SourceFile>,
}

impl RawDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends one parsed file, remapping its columns onto the union header.
    fn append(&mut self, path: &Path, headers: Vec<String>, rows: Vec<Vec<Option<String>>>) {
        let mapping: Vec<usize> = headers
            .into_iter()
            .map(|header| match self.columns.iter().position(|c| *c == header) {
                Some(i) => i,
                None => {
                    self.columns.push(header);
                    self.columns.len() - 1
                }
            })
            .collect();

        let row_count = rows.len();
        for row in rows {
            let mut values = vec![None; self.columns.len()];
            for (value, &target) in row.into_iter().zip(&mapping) {
                values[target] = value;
            }
            self.records.push(RawRecord::new(values));
        }

        self.sources.push(SourceFile {
            path: path.to_path_buf(),
            rows: row_count,
        });
    }
}

/// Result of scanning the input directory.
#[derive(Debug)]
pub enum LoadOutcome {
    /// No input files were found; there is nothing to report on.
    NoInput,
    Loaded(RawDataset),
}

/// Lists the CSV files directly inside `dir`, sorted by path.
///
/// Hidden files are skipped and symlinks are followed. A directory that does
/// not exist yields an empty list.
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_err = |source: io::Error| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_err(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(INPUT_EXTENSION) {
            continue;
        }

        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// Reads one CSV file into its header row and data rows.
///
/// The header is checked against the column contract, and for repeated
/// names, before any rows are read. Rows shorter than the header get missing trailing values.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn read_file(path: &Path) -> Result<(Vec<String>, Vec<Vec<Option<String>>>), LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    ColumnIndex::resolve(path, &headers)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_err)?;
        let row = (0..headers.len())
            .map(|i| record.get(i).filter(|v| !is_missing(v)).map(str::to_string))
            .collect();
        rows.push(row);
    }

    debug!(columns = headers.len(), rows = rows.len(), "File parsed");
    Ok((headers, rows))
}

/// Loads and concatenates every CSV file in `dir`.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_directory(dir: &Path) -> Result<LoadOutcome, LoadError> {
    let files = discover_files(dir)?;
    info!(files = ?files, "Input files discovered");

    if files.is_empty() {
        return Ok(LoadOutcome::NoInput);
    }

    let mut dataset = RawDataset::default();
    for path in &files {
        let (headers, rows) = read_file(path)?;
        info!(file = %path.display(), rows = rows.len(), "File loaded");
        dataset.append(path, headers, rows);
    }

    info!(
        total_rows = dataset.len(),
        columns = ?dataset.columns,
        "Combined dataset ready"
    );

    Ok(LoadOutcome::Loaded(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SchemaError;
    use std::env;

    const HEADER: &str =
        "ID de Pedido,Producto,Cantidad Pedida,Precio Unitario,Fecha de Pedido,Dirección de Envio";

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("sales_report_loader_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_directory_is_no_input() {
        let dir = env::temp_dir().join("sales_report_loader_does_not_exist");
        let _ = fs::remove_dir_all(&dir);

        let outcome = load_directory(&dir).unwrap();
        assert!(matches!(outcome, LoadOutcome::NoInput));
    }

    #[test]
    fn test_empty_directory_is_no_input() {
        let dir = temp_dir("empty");
        fs::write(dir.join("notes.txt"), "not a csv").unwrap();

        let outcome = load_directory(&dir).unwrap();
        assert!(matches!(outcome, LoadOutcome::NoInput));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_concatenation_preserves_counts_and_order() {
        let dir = temp_dir("concat");
        fs::write(
            dir.join("b.csv"),
            format!(
                "{HEADER}\n3,C,1,1.00,01/03/19 10:00,\"1 Elm St, Dallas, TX 75001\"\n"
            ),
        )
        .unwrap();
        fs::write(
            dir.join("a.csv"),
            format!(
                "{HEADER}\n1,A,1,1.00,01/01/19 10:00,\"1 Main St, Boston, MA 02215\"\n\
                 2,B,1,1.00,01/02/19 10:00,\"1 Main St, Boston, MA 02215\"\n"
            ),
        )
        .unwrap();

        let LoadOutcome::Loaded(dataset) = load_directory(&dir).unwrap() else {
            panic!("expected rows");
        };

        assert_eq!(dataset.len(), 3);
        let counts: Vec<usize> = dataset.sources.iter().map(|s| s.rows).collect();
        assert_eq!(counts, vec![2, 1]);
        assert_eq!(counts.iter().sum::<usize>(), dataset.len());

        let products: Vec<&str> = dataset
            .records
            .iter()
            .map(|r| r.get(1).unwrap())
            .collect();
        assert_eq!(products, vec!["A", "B", "C"]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_duplicate_rows_are_kept() {
        let dir = temp_dir("duplicates");
        let row = "1,A,1,1.00,01/01/19 10:00,\"1 Main St, Boston, MA 02215\"";
        fs::write(dir.join("a.csv"), format!("{HEADER}\n{row}\n")).unwrap();
        fs::write(dir.join("b.csv"), format!("{HEADER}\n{row}\n")).unwrap();

        let LoadOutcome::Loaded(dataset) = load_directory(&dir).unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0], dataset.records[1]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_cells_and_short_rows_are_missing() {
        let dir = temp_dir("missing");
        fs::write(
            dir.join("a.csv"),
            format!("{HEADER}\n1,,2,3.00\n"),
        )
        .unwrap();

        let LoadOutcome::Loaded(dataset) = load_directory(&dir).unwrap() else {
            panic!("expected rows");
        };
        let record = &dataset.records[0];
        assert_eq!(record.get(0), Some("1"));
        assert_eq!(record.get(1), None);
        assert_eq!(record.get(2), Some("2"));
        assert_eq!(record.get(5), None);
        assert!(!record.is_complete(dataset.columns.len()));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_differing_headers_are_unioned() {
        let dir = temp_dir("union");
        fs::write(
            dir.join("a.csv"),
            "Producto,Cantidad Pedida,Precio Unitario,Fecha de Pedido,Dirección de Envio\n\
             A,1,1.00,01/01/19 10:00,\"1 Main St, Boston, MA 02215\"\n",
        )
        .unwrap();
        fs::write(
            dir.join("b.csv"),
            format!("{HEADER}\n2,B,1,1.00,01/02/19 10:00,\"1 Main St, Boston, MA 02215\"\n"),
        )
        .unwrap();

        let LoadOutcome::Loaded(dataset) = load_directory(&dir).unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(dataset.columns.len(), 6);
        assert_eq!(dataset.columns[5], "ID de Pedido");
        assert_eq!(dataset.records[0].get(5), None);
        assert_eq!(dataset.records[1].get(5), Some("2"));
        assert_eq!(dataset.records[1].get(0), Some("B"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_hidden_files_are_skipped() {
        let dir = temp_dir("hidden");
        fs::write(
            dir.join("a.csv"),
            format!("{HEADER}\n1,A,1,1.00,01/01/19 10:00,\"1 Main St, Boston, MA 02215\"\n"),
        )
        .unwrap();
        fs::write(dir.join("._a.csv"), [0u8, 5, 22, 7, 0, 2, 0, 0]).unwrap();
        fs::write(dir.join(".x.csv"), "Product,Qty\nA,1\n").unwrap();

        let files = discover_files(&dir).unwrap();
        assert_eq!(files, vec![dir.join("a.csv")]);

        let LoadOutcome::Loaded(dataset) = load_directory(&dir).unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(dataset.len(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_followed() {
        let dir = temp_dir("symlink");
        let target = env::temp_dir().join("sales_report_loader_symlink_target.csv");
        fs::write(
            &target,
            format!("{HEADER}\n1,A,1,1.00,01/01/19 10:00,\"1 Main St, Boston, MA 02215\"\n"),
        )
        .unwrap();
        std::os::unix::fs::symlink(&target, dir.join("linked.csv")).unwrap();

        let files = discover_files(&dir).unwrap();
        assert_eq!(files, vec![dir.join("linked.csv")]);

        fs::remove_dir_all(&dir).unwrap();
        fs::remove_file(&target).unwrap();
    }

    #[test]
    fn test_placeholder_cells_are_missing() {
        let dir = temp_dir("placeholders");
        fs::write(
            dir.join("a.csv"),
            format!(
                "{HEADER}\n1,NA,2,N/A,01/01/19 10:00,null\n\
                 2,NaN,1,1.00,None,\"1 Main St, Boston, MA 02215\"\n\
                 3,Nail Polish,1,1.00,01/01/19 10:00,\"1 Main St, Boston, MA 02215\"\n"
            ),
        )
        .unwrap();

        let LoadOutcome::Loaded(dataset) = load_directory(&dir).unwrap() else {
            panic!("expected rows");
        };
        let first = &dataset.records[0];
        assert_eq!(first.get(1), None);
        assert_eq!(first.get(3), None);
        assert_eq!(first.get(5), None);
        assert_eq!(dataset.records[1].get(1), None);
        assert_eq!(dataset.records[1].get(4), None);
        assert_eq!(dataset.records[2].get(1), Some("Nail Polish"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_repeated_header_is_rejected() {
        let dir = temp_dir("repeated_header");
        fs::write(
            dir.join("a.csv"),
            format!(
                "{HEADER},Producto\n1,A,1,1.00,01/01/19 10:00,\"1 Main St, Boston, MA 02215\",B\n"
            ),
        )
        .unwrap();

        let err = load_directory(&dir).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Schema(SchemaError::DuplicateColumns { ref duplicates, .. })
                if duplicates == &vec!["Producto".to_string()]
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_schema_mismatch_fails_fast() {
        let dir = temp_dir("schema");
        fs::write(dir.join("a.csv"), "Product,Qty\nA,1\n").unwrap();

        let err = load_directory(&dir).unwrap_err();
        assert!(matches!(err, LoadError::Schema(_)));

        fs::remove_dir_all(&dir).unwrap();
    }
}
