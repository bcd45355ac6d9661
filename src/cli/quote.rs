//! `cotizador quote`, `compare` and `export` subcommands

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::Local;
use clap::Args;

use crate::config::AppConfig;
use crate::insurers::InsurerId;
use crate::services::{
    build_request, export_comparison, normalize_results, sort_insurers, Aggregator,
    QuoteDispatcher, QuoteStore, StoredQuote,
};
use crate::types::{CotizadorError, CoveragePlan, Insurer, Result, SortOrder, UserData, VehicleData};

/// Vehicle and applicant data for a quote
#[derive(Args, Debug, Clone, Default)]
pub struct QuoteInputArgs {
    /// Vehicle brand (e.g. Honda)
    #[arg(long)]
    pub marca: Option<String>,

    /// Model year (YYYY)
    #[arg(long)]
    pub anio: Option<String>,

    /// Vehicle model (e.g. CRV)
    #[arg(long)]
    pub modelo: Option<String>,

    /// Version description
    #[arg(long)]
    pub descripcion: Option<String>,

    /// Hombre / Mujer
    #[arg(long)]
    pub genero: Option<String>,

    /// Birthdate (YYYY-MM-DD)
    #[arg(long)]
    pub nacimiento: Option<String>,

    /// Postal code (5 digits)
    #[arg(long)]
    pub cp: Option<String>,

    /// Insurer to quote (repeatable, default: all)
    #[arg(long, value_enum)]
    pub insurer: Vec<InsurerId>,
}

impl QuoteInputArgs {
    /// True when any vehicle or applicant flag was given
    pub fn is_provided(&self) -> bool {
        [
            &self.marca,
            &self.anio,
            &self.modelo,
            &self.descripcion,
            &self.genero,
            &self.nacimiento,
            &self.cp,
        ]
        .iter()
        .any(|field| field.is_some())
    }

    pub fn forms(&self) -> (VehicleData, UserData) {
        let text = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
        (
            VehicleData {
                marca: text(&self.marca),
                anio: text(&self.anio),
                modelo: text(&self.modelo),
                descripcion: text(&self.descripcion),
            },
            UserData {
                genero: text(&self.genero),
                fecha_nacimiento: text(&self.nacimiento),
                codigo_postal: text(&self.cp),
            },
        )
    }

    /// Selected insurers, all of them when none was given
    pub fn insurers(&self) -> Vec<InsurerId> {
        if self.insurer.is_empty() {
            InsurerId::all().to_vec()
        } else {
            let mut selected = Vec::new();
            for id in &self.insurer {
                if !selected.contains(id) {
                    selected.push(*id);
                }
            }
            selected
        }
    }
}

/// Quote every selected insurer and print the comparison
#[derive(Args, Debug)]
pub struct QuoteArgs {
    #[command(flatten)]
    pub input: QuoteInputArgs,

    /// Coverage plan to compare
    #[arg(long, value_enum, default_value_t = CoveragePlan::Amplia)]
    pub plan: CoveragePlan,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the Excel comparison
    #[arg(long)]
    pub export: bool,
}

impl QuoteArgs {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let (vehicle, user) = self.input.forms();
        let selected = self.input.insurers();
        let request = build_request(&vehicle, &user, &selected)?;

        let dispatcher = QuoteDispatcher::new(config)?;
        let results = dispatcher.quote_all(&request, &selected)?;

        let stored = StoredQuote::new(vehicle, user, results);
        match QuoteStore::new().and_then(|store| store.save(&stored)) {
            Ok(()) => {}
            Err(e) => tracing::warn!(error = %e, "could not save last quote"),
        }

        let mut insurers = normalize_results(&stored.results);
        Aggregator::highlight_lowest(&mut insurers, self.plan);
        print_insurers(&insurers, self.plan, self.json)?;

        if self.export {
            export_stored(&stored, &insurers, config.export_dir())?;
        }
        Ok(())
    }
}

/// Re-render the last quote
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Coverage plan to compare
    #[arg(long, value_enum, default_value_t = CoveragePlan::Amplia)]
    pub plan: CoveragePlan,

    /// Price ordering
    #[arg(long, value_enum, default_value_t = SortOrder::Default)]
    pub sort: SortOrder,

    /// Hide insurers without a quote
    #[arg(long)]
    pub hide_unavailable: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CompareArgs {
    pub fn run(self) -> Result<()> {
        let stored = load_stored()?;
        let mut insurers = normalize_results(&stored.results);
        Aggregator::highlight_lowest(&mut insurers, self.plan);

        let mut view = sort_insurers(&insurers, self.plan, self.sort);
        if self.hide_unavailable {
            view.retain(Insurer::is_available);
        }
        print_insurers(&view, self.plan, self.json)
    }
}

/// Write the last quote to Excel
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output directory (default: configured export dir)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let stored = load_stored()?;
        let insurers = normalize_results(&stored.results);
        let dir = self.output.unwrap_or_else(|| config.export_dir());
        export_stored(&stored, &insurers, dir)
    }
}

fn load_stored() -> Result<StoredQuote> {
    QuoteStore::new()?.load()?.ok_or_else(|| {
        CotizadorError::Store("No hay cotización guardada; ejecuta `cotizador quote` primero".into())
    })
}

fn export_stored(stored: &StoredQuote, insurers: &[Insurer], dir: PathBuf) -> Result<()> {
    let path = export_comparison(
        insurers,
        &stored.vehicle,
        &stored.user,
        &dir,
        Local::now().date_naive(),
    )?;
    println!("Archivo generado: {}", path.display());
    Ok(())
}

fn print_insurers(insurers: &[Insurer], plan: CoveragePlan, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(insurers)
            .map_err(|e| CotizadorError::Parse(format!("Serialization failed: {}", e)))?;
        println!("{}", out);
    } else {
        print!("{}", render_table(insurers, plan));
    }
    Ok(())
}

/// Plain-text comparison: lowest-price banner, then one line per insurer
pub fn render_table(insurers: &[Insurer], plan: CoveragePlan) -> String {
    let mut out = String::new();

    let lowest = Aggregator::lowest_prices(insurers);
    for &p in CoveragePlan::all() {
        match lowest.get(p) {
            Some(info) => {
                let _ = writeln!(out, "Mejor {:<9} {} ({})", p.label(), info.price, info.insurer);
            }
            None => {
                let _ = writeln!(out, "Mejor {:<9} -", p.label());
            }
        }
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "  {:<10} {:>14} {:>14} {:>14} {:>10} {:>16}",
        "Aseguradora", "Amplia", "Limitada", "RC", "Deducible", "Gastos Médicos"
    );

    for insurer in insurers {
        let marker = if insurer.is_highlighted { "*" } else { " " };
        match insurer.quoted() {
            Some(quoted) => {
                let _ = writeln!(
                    out,
                    "{} {:<10} {:>14} {:>14} {:>14} {:>10} {:>16}",
                    marker,
                    insurer.name,
                    quoted.prices.amplia,
                    quoted.prices.limitada,
                    quoted.prices.rc,
                    quoted.deductible,
                    quoted.medical_expenses
                );
            }
            None => {
                let state = insurer.error_message().unwrap_or("Cotizando...");
                let _ = writeln!(out, "{} {:<10} {}", marker, insurer.name, state);
            }
        }
    }

    let _ = writeln!(out, "\nPlan seleccionado: {}", plan.label());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawInsurerResult;
    use serde_json::json;

    fn sample() -> Vec<Insurer> {
        let ok: RawInsurerResult = serde_json::from_value(json!({
            "insurer": "Chubb",
            "loading": false,
            "data": {"success": true, "resultado": [{"AMPLIA": {"dPrecioTotal": 8320}}]}
        }))
        .unwrap();
        let mut insurers = normalize_results(&[ok, RawInsurerResult::failure("GNP", "Sin cobertura", None)]);
        Aggregator::highlight_lowest(&mut insurers, CoveragePlan::Amplia);
        insurers
    }

    #[test]
    fn test_insurers_default_to_all() {
        let args = QuoteInputArgs::default();
        assert_eq!(args.insurers(), InsurerId::all().to_vec());
        assert!(!args.is_provided());
    }

    #[test]
    fn test_insurers_deduplicated() {
        let args = QuoteInputArgs {
            insurer: vec![InsurerId::Gnp, InsurerId::Gnp, InsurerId::Hdi],
            ..QuoteInputArgs::default()
        };
        assert_eq!(args.insurers(), vec![InsurerId::Gnp, InsurerId::Hdi]);
    }

    #[test]
    fn test_forms_trim_and_default() {
        let args = QuoteInputArgs {
            marca: Some(" Honda ".into()),
            cp: Some("07310".into()),
            ..QuoteInputArgs::default()
        };
        let (vehicle, user) = args.forms();
        assert_eq!(vehicle.marca, "Honda");
        assert_eq!(vehicle.modelo, "");
        assert_eq!(user.codigo_postal, "07310");
        assert!(args.is_provided());
    }

    #[test]
    fn test_render_table() {
        let table = render_table(&sample(), CoveragePlan::Amplia);
        assert!(table.contains("Mejor Amplia    $8,320 (Chubb)"));
        assert!(table.contains("* Chubb"));
        assert!(table.contains("GNP        Sin cobertura"));
        assert!(table.contains("Plan seleccionado: Amplia"));
    }
}
