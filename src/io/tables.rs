//! Flat-table reads/writes.
//!
//! Inputs (fleet summary, galaxy mass table) are parsed through a normalized
//! header map so extra columns and header case don't matter. Intermediate
//! tables (BTFR, BTFR-with-mass, RAR points) have a schema we own, so they go
//! through serde. Writers truncate: re-running a stage fully overwrites its
//! output.

use std::fs::File;
use std::path::Path;

use crate::domain::{BtfrMassRecord, BtfrRecord, MassRecord, RarPoint};
use crate::error::AppError;
use crate::io::curve::{build_header_map, parse_f64};

/// Read the fleet summary and return galaxy names in file order.
///
/// A missing fleet summary is fatal: it is the top-level input that defines
/// which galaxies exist at all.
pub fn read_fleet(path: &Path) -> Result<Vec<String>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open fleet summary '{}': {e}", path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read fleet summary headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let name_idx = *header_map
        .get("name")
        .ok_or_else(|| AppError::new(2, "Fleet summary is missing the `name` column."))?;

    let mut names = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::new(2, format!("Fleet summary parse error: {e}")))?;
        if let Some(name) = record.get(name_idx).map(str::trim).filter(|s| !s.is_empty()) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// Read the galaxy mass table (`name`, `Mstar`, `Mgas`).
///
/// Rows with unparseable masses are dropped; they can never join anyway.
pub fn read_mass_table(path: &Path) -> Result<Vec<MassRecord>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open galaxy mass table '{}': {e}", path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read mass table headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let name_idx = *header_map
        .get("name")
        .ok_or_else(|| AppError::new(2, "Mass table is missing the `name` column."))?;
    let mstar_idx = *header_map
        .get("mstar")
        .ok_or_else(|| AppError::new(2, "Mass table is missing the `Mstar` column."))?;
    let mgas_idx = *header_map
        .get("mgas")
        .ok_or_else(|| AppError::new(2, "Mass table is missing the `Mgas` column."))?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::new(2, format!("Mass table parse error: {e}")))?;
        let Some(name) = record.get(name_idx).map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        let (Some(mstar), Some(mgas)) = (
            record.get(mstar_idx).and_then(parse_f64),
            record.get(mgas_idx).and_then(parse_f64),
        ) else {
            continue;
        };
        records.push(MassRecord {
            name: name.to_string(),
            mstar,
            mgas,
        });
    }
    Ok(records)
}

pub fn write_btfr_table(path: &Path, records: &[BtfrRecord]) -> Result<(), AppError> {
    write_records(path, records, "BTFR table")
}

pub fn read_btfr_table(path: &Path) -> Result<Vec<BtfrRecord>, AppError> {
    read_records(path, "BTFR table")
}

pub fn write_btfr_mass_table(path: &Path, records: &[BtfrMassRecord]) -> Result<(), AppError> {
    write_records(path, records, "BTFR-with-mass table")
}

pub fn read_btfr_mass_table(path: &Path) -> Result<Vec<BtfrMassRecord>, AppError> {
    read_records(path, "BTFR-with-mass table")
}

pub fn write_rar_table(path: &Path, points: &[RarPoint]) -> Result<(), AppError> {
    write_records(path, points, "RAR points table")
}

pub fn read_rar_table(path: &Path) -> Result<Vec<RarPoint>, AppError> {
    read_records(path, "RAR points table")
}

fn write_records<T: serde::Serialize>(
    path: &Path,
    records: &[T],
    label: &str,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create {label} '{}': {e}", path.display()))
    })?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::new(2, format!("Failed to write {label} row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush {label}: {e}")))?;
    Ok(())
}

fn read_records<T: for<'de> serde::Deserialize<'de>>(
    path: &Path,
    label: &str,
) -> Result<Vec<T>, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open {label} '{}': {e}", path.display()))
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for record in reader.deserialize::<T>() {
        let record =
            record.map_err(|e| AppError::new(2, format!("Invalid {label} row: {e}")))?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rcrel-tables-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn fleet_read_keeps_file_order() {
        let dir = temp_dir("fleet");
        let path = dir.join("fleet_summary_compact.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "name,chi2").unwrap();
        writeln!(file, "NGC3198,1.2").unwrap();
        writeln!(file, "DDO154,0.9").unwrap();
        drop(file);

        let names = read_fleet(&path).unwrap();
        assert_eq!(names, vec!["NGC3198", "DDO154"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn btfr_table_roundtrip_preserves_nan_placeholder() {
        let dir = temp_dir("btfr");
        let path = dir.join("btfr_table.csv");
        let records = vec![
            BtfrRecord { name: "G1".to_string(), m_b: f64::NAN, v_flat: 120.0 },
            BtfrRecord { name: "G2".to_string(), m_b: f64::NAN, v_flat: 80.5 },
        ];
        write_btfr_table(&path, &records).unwrap();

        let back = read_btfr_table(&path).unwrap();
        assert_eq!(back.len(), 2);
        assert!(back[0].m_b.is_nan());
        assert_eq!(back[1].v_flat, 80.5);
        assert_eq!(back[0].name, "G1");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rewriting_a_table_is_idempotent() {
        let dir = temp_dir("idem");
        let path = dir.join("rar_points.csv");
        let points = vec![RarPoint {
            name: "G1".to_string(),
            g_bar: 2500.0,
            g_obs: 10000.0,
            r_frac: 0.5,
        }];

        write_rar_table(&path, &points).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        write_rar_table(&path, &points).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_fleet_summary_is_fatal() {
        let err = read_fleet(Path::new("/nonexistent/fleet.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
