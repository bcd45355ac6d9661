//! Excel export of the comparison
//!
//! One row per (insurer, plan) with the raw coverage figures, plus the
//! blank layout template used by the bulk upload.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde_json::Value;

use crate::services::normalizer::{value_text, MISSING};
use crate::types::{CotizadorError, CoveragePlan, Insurer, Result, UserData, VehicleData};

pub const DETAIL_SHEET_NAME: &str = "Cotización Detallada";

pub const DETAIL_HEADERS: [&str; 15] = [
    "Vehículo",
    "Usuario",
    "Aseguradora",
    "Plan",
    "Cobertura",
    "Precio Total",
    "Plazo",
    "Daños a Terceros",
    "Robo Total",
    "Robo Parcial",
    "Gastos Médicos",
    "Fallecimiento",
    "Defensa Legal",
    "Asistencia Vial",
    "Daños al Vehículo",
];

const DETAIL_WIDTHS: [f64; 15] = [
    35.0, 35.0, 15.0, 10.0, 20.0, 15.0, 10.0, 18.0, 12.0, 15.0, 15.0, 15.0, 15.0, 18.0, 15.0,
];

pub const LAYOUT_SHEET_NAME: &str = "Layout";
pub const LAYOUT_FILE_NAME: &str = "layout_cotizacion.xlsx";

pub const LAYOUT_HEADERS: [&str; 8] = [
    "Categoría",
    "Tipo",
    "Año",
    "Modelo",
    "Uso",
    "Fecha de nacimiento",
    "Sexo",
    "Teléfono",
];

/// Raw fields copied as-is, in column order after the plan label
const VERBATIM_FIELDS: [&str; 8] = [
    "vNombreCobertura",
    "dPrecioTotal",
    "vPlazoCobertura",
    "dDanosTerceros",
    "iRoboTotal",
    "iRoboParcial",
    "dGastosMedicos",
    "dFallecimiento",
];

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Number(f64),
}

impl ExportCell {
    fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Numbers stay numeric, null or absent becomes "-"
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Self::Number)
                .unwrap_or_else(|| Self::text(n.to_string())),
            Some(other) => value_text(other)
                .map(Self::Text)
                .unwrap_or_else(|| Self::text(MISSING)),
            None => Self::text(MISSING),
        }
    }

    /// "Sí" for `true` or "true", otherwise "No"
    fn yes_no(value: Option<&Value>) -> Self {
        let yes = match value {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        };
        Self::text(if yes { "Sí" } else { "No" })
    }
}

/// `cotizacion_detallada_{YYYY-MM-DD}.xlsx`
pub fn export_filename(date: NaiveDate) -> String {
    format!("cotizacion_detallada_{}.xlsx", date.format("%Y-%m-%d"))
}

/// Data rows (no header). Every plan of every quoted insurer gets a row; a
/// plan the insurer did not return is all "-".
pub fn build_rows(
    insurers: &[Insurer],
    vehicle: &VehicleData,
    user: &UserData,
) -> Vec<Vec<ExportCell>> {
    let vehicle_info = vehicle.summary();
    let user_info = user.summary();
    let mut rows = Vec::new();

    for insurer in insurers {
        let Some(quoted) = insurer.quoted() else {
            continue;
        };

        for &plan in CoveragePlan::all() {
            let coverage = quoted.coverages_raw.get(plan);
            let mut row = vec![
                ExportCell::text(&vehicle_info),
                ExportCell::text(&user_info),
                ExportCell::text(&insurer.name),
                ExportCell::text(plan.label()),
            ];
            row.extend(
                VERBATIM_FIELDS
                    .iter()
                    .map(|field| ExportCell::from_value(coverage.get(*field))),
            );
            row.push(ExportCell::yes_no(coverage.get("bDefensaLegal")));
            row.push(ExportCell::yes_no(coverage.get("bAsistencialVialCarretera")));
            row.push(ExportCell::from_value(coverage.get("iDanoVehiculo")));

            rows.push(row);
        }
    }

    rows
}

/// Write the detailed comparison into `dir` and return the file path
pub fn export_comparison(
    insurers: &[Insurer],
    vehicle: &VehicleData,
    user: &UserData,
    dir: &Path,
    date: NaiveDate,
) -> Result<PathBuf> {
    let rows = build_rows(insurers, vehicle, user);
    let path = dir.join(export_filename(date));

    write_workbook(&path, DETAIL_SHEET_NAME, &DETAIL_HEADERS, &DETAIL_WIDTHS, &rows)?;

    tracing::info!(path = %path.display(), rows = rows.len(), "exported comparison");
    Ok(path)
}

/// Write the empty bulk upload template to `path`
pub fn write_layout_template(path: &Path) -> Result<()> {
    let widths = [20.0; LAYOUT_HEADERS.len()];
    write_workbook(path, LAYOUT_SHEET_NAME, &LAYOUT_HEADERS, &widths, &[])?;
    tracing::info!(path = %path.display(), "wrote layout template");
    Ok(())
}

/// Save to a temp file next to `path`, then rename into place
fn write_workbook(
    path: &Path,
    sheet_name: &str,
    headers: &[&str],
    widths: &[f64],
    rows: &[Vec<ExportCell>],
) -> Result<()> {
    let temp_path = path.with_extension("xlsx.tmp");

    let saved = build_workbook(sheet_name, headers, widths, rows)
        .and_then(|mut workbook| workbook.save(&temp_path));

    if let Err(e) = saved {
        let _ = fs::remove_file(&temp_path);
        return Err(CotizadorError::Export(e.to_string()));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CotizadorError::Export(e.to_string())
    })
}

fn build_workbook(
    sheet_name: &str,
    headers: &[&str],
    widths: &[f64],
    rows: &[Vec<ExportCell>],
) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    for (col, width) in widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let row_idx = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                ExportCell::Text(text) => {
                    worksheet.write_string(row_idx, col as u16, text)?;
                }
                ExportCell::Number(n) => {
                    worksheet.write_number(row_idx, col as u16, *n)?;
                }
            }
        }
    }

    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InsurerStatus, PlanValues, QuotedCoverage};
    use serde_json::json;
    use tempfile::TempDir;

    fn vehicle() -> VehicleData {
        VehicleData {
            marca: "Honda".into(),
            anio: "2017".into(),
            modelo: "CRV".into(),
            descripcion: "Elegance 2WD".into(),
        }
    }

    fn user() -> UserData {
        UserData {
            genero: "Femenino".into(),
            fecha_nacimiento: "2001-02-01".into(),
            codigo_postal: "07310".into(),
        }
    }

    fn insurer_with(amplia: Value) -> Insurer {
        let amplia = amplia.as_object().cloned().unwrap_or_default();
        Insurer {
            id: "chubb".into(),
            name: "Chubb".into(),
            logo: "/images/chubb-logo.png".into(),
            status: InsurerStatus::Quoted(QuotedCoverage {
                prices: PlanValues {
                    amplia: "$8320".into(),
                    limitada: "-".into(),
                    rc: "-".into(),
                },
                deductible: "-".into(),
                medical_expenses: "-".into(),
                coverages_raw: PlanValues {
                    amplia,
                    ..PlanValues::default()
                },
            }),
            is_highlighted: false,
        }
    }

    fn text(s: &str) -> ExportCell {
        ExportCell::Text(s.to_string())
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(date), "cotizacion_detallada_2024-03-09.xlsx");
    }

    #[test]
    fn test_single_plan_yields_row_per_plan() {
        let insurer = insurer_with(json!({
            "vNombreCobertura": "Amplia Plus",
            "dPrecioTotal": 8320,
            "vPlazoCobertura": "ANUAL",
            "bDefensaLegal": "true",
            "bAsistencialVialCarretera": false,
            "iDanoVehiculo": 5
        }));
        let rows = build_rows(&[insurer], &vehicle(), &user());

        assert_eq!(rows.len(), 3);
        let row = &rows[0];
        assert_eq!(row.len(), DETAIL_HEADERS.len());
        assert_eq!(row[0], text("Honda - 2017 - CRV - Elegance 2WD"));
        assert_eq!(row[1], text("Femenino - 2001-02-01 - 07310"));
        assert_eq!(row[2], text("Chubb"));
        assert_eq!(row[3], text("Amplia"));
        assert_eq!(row[4], text("Amplia Plus"));
        assert_eq!(row[5], ExportCell::Number(8320.0));
        assert_eq!(row[6], text("ANUAL"));
        assert_eq!(row[7], text("-"));
        assert_eq!(row[12], text("Sí"));
        assert_eq!(row[13], text("No"));
        assert_eq!(row[14], ExportCell::Number(5.0));

        // Plans the insurer did not return are dashed out
        assert_eq!(rows[1][2], text("Chubb"));
        assert_eq!(rows[1][3], text("Limitada"));
        assert_eq!(rows[2][3], text("RC"));
        assert!(rows[2][4..12].iter().all(|cell| *cell == text("-")));
        assert_eq!(rows[2][12], text("No"));
    }

    #[test]
    fn test_unavailable_insurers_skipped() {
        let mut loading = insurer_with(json!({"dPrecioTotal": 1}));
        loading.status = InsurerStatus::Loading;
        let mut failed = insurer_with(json!({"dPrecioTotal": 1}));
        failed.status = InsurerStatus::Error {
            message: "Sin tarifa".into(),
            image_url: None,
        };

        let rows = build_rows(&[loading, failed], &vehicle(), &user());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_null_values_become_dash() {
        let insurer = insurer_with(json!({"dPrecioTotal": null, "iRoboTotal": "Valor comercial"}));
        let rows = build_rows(&[insurer], &vehicle(), &user());
        assert_eq!(rows[0][5], text("-"));
        assert_eq!(rows[0][8], text("Valor comercial"));
    }

    #[test]
    fn test_export_writes_xlsx() {
        let temp = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let insurer = insurer_with(json!({"dPrecioTotal": 8320}));

        let path = export_comparison(&[insurer], &vehicle(), &user(), temp.path(), date).unwrap();

        assert_eq!(path, temp.path().join("cotizacion_detallada_2024-03-09.xlsx"));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
        assert!(!path.with_extension("xlsx.tmp").exists());
    }

    #[test]
    fn test_export_failure_leaves_no_file() {
        let temp = TempDir::new().unwrap();
        let missing_dir = temp.path().join("does-not-exist");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();

        let err = export_comparison(&[], &vehicle(), &user(), &missing_dir, date).unwrap_err();
        assert!(matches!(err, CotizadorError::Export(_)));
        assert!(!missing_dir.exists());
    }

    #[test]
    fn test_layout_template() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(LAYOUT_FILE_NAME);
        write_layout_template(&path).unwrap();
        assert!(path.exists());
    }
}
