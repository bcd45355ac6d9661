//! Bulk quoting (lote) API client
//!
//! Upload an Excel file for server-side validation, submit the valid rows,
//! poll batch progress and download the finished results.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::{multipart, Client, Response};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::types::{
    CotizadorError, EstadoCotizacionResponse, EstadoLoteResponse, ProcesarResponse, Result,
    ValidacionResponse, VehiculoValido,
};

/// Uploads can take a while to validate server-side
const UPLOAD_TIMEOUT_SECS: u64 = 120;

pub struct LoteClient {
    client: Client,
    base_url: String,
}

impl LoteClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_base_url(config.batch_url(), config.request_timeout())
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CotizadorError::Http(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// POST `cargar-excel` with the file as multipart field `file`
    pub fn upload_excel(&self, path: &Path) -> Result<ValidacionResponse> {
        let form = multipart::Form::new().file("file", path)?;
        tracing::info!(path = %path.display(), "uploading batch file");

        let response = self
            .client
            .post(self.url("cargar-excel"))
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .multipart(form)
            .send();
        read_json(response, "Error al cargar el archivo")
    }

    /// POST `cotizar` with the validated vehicles
    pub fn submit(&self, vehiculos: &[VehiculoValido]) -> Result<ProcesarResponse> {
        tracing::info!(count = vehiculos.len(), "submitting batch");
        let response = self.client.post(self.url("cotizar")).json(vehiculos).send();
        read_json(response, "Error al procesar la cotización")
    }

    /// GET `consultar-estado`
    pub fn status(&self) -> Result<EstadoCotizacionResponse> {
        let response = self.client.get(self.url("consultar-estado")).send();
        read_json(response, "Error al consultar el estado")
    }

    /// GET `consultar-estado/{id}`
    pub fn lote_status(&self, id: u64) -> Result<EstadoLoteResponse> {
        let response = self
            .client
            .get(self.url(&format!("consultar-estado/{}", id)))
            .send();
        read_json(response, "Error al consultar el estado del lote")
    }

    /// GET `lote/{id}/descargar` and save the body as `{nombre}.xlsx` in `dir`
    pub fn download_results(&self, id: u64, dir: &Path, nombre: &str) -> Result<PathBuf> {
        const CONTEXT: &str = "Error al descargar el archivo";

        let response = self
            .client
            .get(self.url(&format!("lote/{}/descargar", id)))
            .send()
            .map_err(|e| CotizadorError::Http(format!("{}: {}", CONTEXT, e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CotizadorError::Http(format!("{}: {}", CONTEXT, status.as_u16())));
        }
        let bytes = response
            .bytes()
            .map_err(|e| CotizadorError::Http(format!("{}: {}", CONTEXT, e)))?;

        let path = dir.join(results_filename(nombre));
        let temp_path = path.with_extension("xlsx.tmp");
        if let Err(e) = fs::write(&temp_path, &bytes).and_then(|_| fs::rename(&temp_path, &path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::info!(id, path = %path.display(), bytes = bytes.len(), "downloaded batch results");
        Ok(path)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// `{nombre}.xlsx`, with path separators in the batch name replaced
pub fn results_filename(nombre: &str) -> String {
    let stem: String = nombre
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    let stem = if stem.is_empty() { "lote" } else { stem.as_str() };
    format!("{}.xlsx", stem)
}

fn read_json<T: DeserializeOwned>(
    response: reqwest::Result<Response>,
    context: &str,
) -> Result<T> {
    let response = response
        .map_err(|e| CotizadorError::Http(format!("{}: {}", context, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CotizadorError::Http(format!(
            "{}: {}",
            context,
            status.as_u16()
        )));
    }

    response
        .json()
        .map_err(|e| CotizadorError::Parse(format!("{}: {}", context, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_urls_join_base() {
        let client =
            LoteClient::with_base_url("http://localhost:8080/x/api/cotizacion-masiva/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            client.url("consultar-estado/7"),
            "http://localhost:8080/x/api/cotizacion-masiva/consultar-estado/7"
        );
    }

    #[test]
    fn test_results_filename() {
        assert_eq!(results_filename("flotilla_marzo"), "flotilla_marzo.xlsx");
        assert_eq!(results_filename("a/b\\c"), "a_b_c.xlsx");
        assert_eq!(results_filename("  "), "lote.xlsx");
    }

    #[test]
    fn test_download_unreachable_leaves_no_file() {
        let temp = TempDir::new().unwrap();
        let client = LoteClient::with_base_url("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client.download_results(7, temp.path(), "flotilla").unwrap_err();
        assert!(matches!(err, CotizadorError::Http(_)));
        assert!(err.to_string().contains("Error al descargar el archivo"));
        assert!(!temp.path().join("flotilla.xlsx").exists());
    }

    #[test]
    fn test_upload_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let client = LoteClient::with_base_url("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client
            .upload_excel(&temp.path().join("nope.xlsx"))
            .unwrap_err();
        assert!(matches!(err, CotizadorError::Io(_)));
    }

    #[test]
    fn test_status_unreachable_is_http_error() {
        let client = LoteClient::with_base_url("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client.status().unwrap_err();
        assert!(matches!(err, CotizadorError::Http(_)));
        assert!(err.to_string().contains("Error al consultar el estado"));
    }
}
