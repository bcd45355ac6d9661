//! Bulk quoting (lote) API payloads

use serde::{Deserialize, Serialize};

use super::QuoteRequestBody;

/// Server-side state of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoLote {
    EnProceso,
    EnCola,
    Completado,
    #[serde(other)]
    Desconocido,
}

impl EstadoLote {
    pub fn label(self) -> &'static str {
        match self {
            Self::EnProceso => "En proceso",
            Self::EnCola => "En cola",
            Self::Completado => "Completado",
            Self::Desconocido => "Desconocido",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadoLoteResponse {
    pub id_lote: u64,
    pub nombre_lote: String,
    #[serde(default)]
    pub estado_lote_id: Option<u32>,
    pub estado_lote: EstadoLote,
    pub total_cotizaciones: u64,
    pub cotizaciones_exitosas: u64,
    pub cotizaciones_error: u64,
    pub cotizaciones_pendientes: u64,
    #[serde(default)]
    pub fecha_creacion: Option<i64>,
    #[serde(default)]
    pub fecha_creacion_str: Option<String>,
}

impl EstadoLoteResponse {
    /// Completion percentage; a completed batch is always 100
    pub fn progress_percent(&self) -> u8 {
        if self.estado_lote == EstadoLote::Completado {
            return 100;
        }
        if self.total_cotizaciones == 0 {
            return 0;
        }
        let done = self
            .cotizaciones_exitosas
            .saturating_add(self.cotizaciones_error);
        let percent = (done as f64 / self.total_cotizaciones as f64 * 100.0).round();
        percent.clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadoCotizacionResponse {
    pub lotes_en_proceso: u64,
    #[serde(default)]
    pub lotes: Vec<EstadoLoteResponse>,
    pub lotes_con_error: u64,
    pub lotes_completados: u64,
    pub total_lotes: u64,
}

impl EstadoCotizacionResponse {
    pub fn all_completed(&self) -> bool {
        self.lotes
            .iter()
            .all(|l| l.estado_lote == EstadoLote::Completado)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoValidacion {
    Valido,
    Error,
}

/// Per-row outcome of the server-side Excel validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultadoValidacion {
    pub fila: u64,
    pub estado: EstadoValidacion,
    #[serde(default)]
    pub errores: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenValidacion {
    #[serde(default)]
    pub resultados_validacion: Vec<ResultadoValidacion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiculoValido {
    #[serde(rename = "vehiculoRequestDTO")]
    pub vehiculo_request_dto: QuoteRequestBody,
    pub aseguradoras: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidacionResponse {
    pub resumen_validacion: ResumenValidacion,
    #[serde(default)]
    pub vehiculos_validos: Vec<VehiculoValido>,
}

impl ValidacionResponse {
    /// (total, valid, with errors)
    pub fn stats(&self) -> (usize, usize, usize) {
        let rows = &self.resumen_validacion.resultados_validacion;
        let valid = rows
            .iter()
            .filter(|r| r.estado == EstadoValidacion::Valido)
            .count();
        (rows.len(), valid, rows.len() - valid)
    }
}

/// Reply to a batch submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcesarResponse {
    pub nombre_lote: String,
    pub estado_inicial: EstadoLote,
}
