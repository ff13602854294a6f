use crate::anchors::Anchor;
use crate::error::{WarpError, WarpResult};
use csv::{ReaderBuilder, StringRecord};
use log::debug;
use std::fs::File;
use std::path::Path;

pub const NAME_COLUMN: &str = "name";
pub const SCAN_COLUMN: &str = "scan";

/// Reads raw anchors from a CSV file with `name` and `scan` columns.
/// Other columns are ignored. Scan indices are kept as written, so negative
/// values are left for [`crate::AnchorPairSet::build`] to reject.
pub fn read_anchor_csv(path: impl AsRef<Path>) -> WarpResult<Vec<Anchor>> {
    let path_ref = path.as_ref();
    let path_str = path_ref.display().to_string();
    let file = File::open(path_ref).map_err(|e| WarpError::CsvParse {
        path: path_str.clone(),
        source: csv::Error::from(e),
    })?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| WarpError::CsvParse {
            path: path_str.clone(),
            source: e,
        })?
        .clone();
    let name_idx = resolve_column(NAME_COLUMN, &headers, &path_str)?;
    let scan_idx = resolve_column(SCAN_COLUMN, &headers, &path_str)?;

    let mut anchors = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| WarpError::CsvParse {
            path: path_str.clone(),
            source: e,
        })?;
        let row = row_idx + 1;
        let name = record.get(name_idx).unwrap_or("");
        let scan_field = record.get(scan_idx).unwrap_or("");
        let scan = scan_field
            .parse::<i64>()
            .map_err(|_| WarpError::CsvInvalidScan {
                row,
                value: scan_field.to_string(),
                path: path_str.clone(),
            })?;
        anchors.push(Anchor::new(name, scan));
    }
    debug!("read {} anchors from {}", anchors.len(), path_str);
    Ok(anchors)
}

fn resolve_column(name: &str, headers: &StringRecord, path: &str) -> WarpResult<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| WarpError::CsvMissingColumn {
            name: name.to_string(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            path: path.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::pair_by_name;
    use crate::error::ErrorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_named_scans() {
        let file = write_temp_csv("scan,name,note\n12,caffeine,x\n40, theobromine ,\n");
        let anchors = read_anchor_csv(file.path()).unwrap();
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].name.as_ref(), "caffeine");
        assert_eq!(anchors[0].scan, 12);
        assert_eq!(anchors[1].name.as_ref(), "theobromine");
        assert_eq!(anchors[1].scan, 40);
    }

    #[test]
    fn keeps_negative_scans() {
        let file = write_temp_csv("name,scan\nbad,-3\n");
        assert_eq!(read_anchor_csv(file.path()).unwrap()[0].scan, -3);
    }

    #[test]
    fn missing_scan_column() {
        let file = write_temp_csv("name,index\na,1\n");
        match read_anchor_csv(file.path()).unwrap_err() {
            WarpError::CsvMissingColumn { name, headers, .. } => {
                assert_eq!(name, "scan");
                assert_eq!(headers, vec!["name".to_string(), "index".to_string()]);
            }
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_scan_reports_row() {
        let file = write_temp_csv("name,scan\na,1\nb,1.5\n");
        let err = read_anchor_csv(file.path()).unwrap_err();
        assert!(matches!(err, WarpError::CsvInvalidScan { row: 2, .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_anchor_csv(dir.path().join("absent.csv")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn files_pair_by_name() {
        let left = write_temp_csv("name,scan\na,5\nb,9\nonly_left,11\n");
        let right = write_temp_csv("name,scan\nb,12\na,6\n");
        let pairs = pair_by_name(
            &read_anchor_csv(left.path()).unwrap(),
            &read_anchor_csv(right.path()).unwrap(),
        );
        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].row, pairs[0].col), (5, 6));
        assert_eq!((pairs[1].row, pairs[1].col), (9, 12));
    }
}
