//! `cotizador lotes` subcommand for the bulk quoting API

use std::path::PathBuf;
use std::thread;

use clap::Subcommand;

use crate::config::AppConfig;
use crate::services::LoteClient;
use crate::types::{EstadoCotizacionResponse, EstadoLoteResponse, Result};

#[derive(Subcommand, Debug)]
pub enum LotesCommand {
    /// Show the status of every batch, or of one with --id
    Status {
        #[arg(long)]
        id: Option<u64>,
    },

    /// Poll batch status until every batch is complete
    Watch {
        /// Seconds between polls (default: configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Upload an Excel file for validation, optionally submitting the valid rows
    Upload {
        file: PathBuf,

        /// Submit valid rows right after validation
        #[arg(long)]
        submit: bool,
    },

    /// Validate an Excel file and submit its valid rows
    Submit { file: PathBuf },

    /// Download the results workbook of a batch
    Download {
        #[arg(long)]
        id: u64,

        /// File name without extension (default: the batch name)
        #[arg(long)]
        nombre: Option<String>,

        /// Output directory (default: configured export directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

impl LotesCommand {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let client = LoteClient::new(config)?;

        match self {
            Self::Status { id: Some(id) } => {
                let lote = client.lote_status(id)?;
                println!("{}", lote_line(&lote));
            }
            Self::Status { id: None } => {
                print!("{}", status_report(&client.status()?));
            }
            Self::Watch { interval } => {
                let interval = interval
                    .map(std::time::Duration::from_secs)
                    .unwrap_or_else(|| config.poll_interval());
                loop {
                    let status = client.status()?;
                    print!("{}", status_report(&status));
                    if status.all_completed() {
                        break;
                    }
                    thread::sleep(interval);
                }
            }
            Self::Upload { file, submit } => upload(&client, file, submit)?,
            Self::Submit { file } => upload(&client, file, true)?,
            Self::Download { id, nombre, dir } => {
                let nombre = match nombre {
                    Some(nombre) => nombre,
                    None => client.lote_status(id)?.nombre_lote,
                };
                let dir = dir.unwrap_or_else(|| config.export_dir());
                let path = client.download_results(id, &dir, &nombre)?;
                println!("Resultados descargados: {}", path.display());
            }
        }
        Ok(())
    }
}

fn upload(client: &LoteClient, file: PathBuf, submit: bool) -> Result<()> {
    let validation = client.upload_excel(&file)?;
    let (total, valid, invalid) = validation.stats();
    println!(
        "Filas: {}  Válidas: {}  Con errores: {}",
        total, valid, invalid
    );
    for row in &validation.resumen_validacion.resultados_validacion {
        if !row.errores.is_empty() {
            println!("  Fila {}: {}", row.fila, row.errores.join(", "));
        }
    }

    if submit {
        if validation.vehiculos_validos.is_empty() {
            println!("No hay vehículos válidos para cotizar");
            return Ok(());
        }
        let lote = client.submit(&validation.vehiculos_validos)?;
        println!("Lote {} creado ({})", lote.nombre_lote, lote.estado_inicial.label());
    }
    Ok(())
}

fn lote_line(lote: &EstadoLoteResponse) -> String {
    format!(
        "#{:<5} {:<30} {:<12} {:>3}%  {}/{} ok, {} error",
        lote.id_lote,
        lote.nombre_lote,
        lote.estado_lote.label(),
        lote.progress_percent(),
        lote.cotizaciones_exitosas,
        lote.total_cotizaciones,
        lote.cotizaciones_error
    )
}

/// Summary line followed by one line per batch
pub fn status_report(status: &EstadoCotizacionResponse) -> String {
    let mut out = format!(
        "Lotes: {} total, {} en proceso, {} completados, {} con error\n",
        status.total_lotes, status.lotes_en_proceso, status.lotes_completados, status.lotes_con_error
    );
    for lote in &status.lotes {
        out.push_str(&lote_line(lote));
        out.push('\n');
    }
    out
}
