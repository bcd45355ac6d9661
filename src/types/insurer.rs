//! Insurer result types: raw API wrappers and the normalized view model

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Raw coverage payload as returned by an insurer (field names vary per API)
pub type CoverageObject = Map<String, Value>;

/// Coverage tier offered by every insurer
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CoveragePlan {
    #[default]
    Amplia,
    Limitada,
    Rc,
}

impl CoveragePlan {
    /// All plans in display order
    pub fn all() -> &'static [CoveragePlan] {
        &[Self::Amplia, Self::Limitada, Self::Rc]
    }

    /// Key used in normalized records ("amplia", "limitada", "rc")
    pub fn key(self) -> &'static str {
        match self {
            Self::Amplia => "amplia",
            Self::Limitada => "limitada",
            Self::Rc => "rc",
        }
    }

    /// Human label used in tables and spreadsheets
    pub fn label(self) -> &'static str {
        match self {
            Self::Amplia => "Amplia",
            Self::Limitada => "Limitada",
            Self::Rc => "RC",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Amplia => Self::Limitada,
            Self::Limitada => Self::Rc,
            Self::Rc => Self::Amplia,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Amplia => Self::Rc,
            Self::Limitada => Self::Amplia,
            Self::Rc => Self::Limitada,
        }
    }

    /// Plan from number key (1-3)
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Amplia),
            2 => Some(Self::Limitada),
            3 => Some(Self::Rc),
            _ => None,
        }
    }
}

/// Price ordering applied to the comparison table
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Default,
    Asc,
    Desc,
}

impl SortOrder {
    /// Cycle Default → Asc → Desc → Default
    pub fn next(self) -> Self {
        match self {
            Self::Default => Self::Asc,
            Self::Asc => Self::Desc,
            Self::Desc => Self::Default,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "Sin orden",
            Self::Asc => "Menor precio",
            Self::Desc => "Mayor precio",
        }
    }
}

/// One value per coverage plan
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanValues<T> {
    pub amplia: T,
    pub limitada: T,
    pub rc: T,
}

impl<T> PlanValues<T> {
    pub fn get(&self, plan: CoveragePlan) -> &T {
        match plan {
            CoveragePlan::Amplia => &self.amplia,
            CoveragePlan::Limitada => &self.limitada,
            CoveragePlan::Rc => &self.rc,
        }
    }

    /// Build by evaluating `f` for every plan
    pub fn from_fn(mut f: impl FnMut(CoveragePlan) -> T) -> Self {
        Self {
            amplia: f(CoveragePlan::Amplia),
            limitada: f(CoveragePlan::Limitada),
            rc: f(CoveragePlan::Rc),
        }
    }
}

/// Body of an insurer quoting response.
///
/// Successful responses carry `resultado`; failures carry `message` and
/// optionally an HTTP-like `status` and a screenshot URL.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuoteResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub resultado: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_image: Option<String>,
}

impl QuoteResponse {
    /// Only an explicit `success: false` marks a failure
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }
}

/// Backends send `null` where a field is simply absent
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-insurer API response wrapper (loading, success or error)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInsurerResult {
    pub insurer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub loading: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<QuoteResponse>,
}

impl RawInsurerResult {
    /// Placeholder for a request still in flight
    pub fn pending(insurer: impl Into<String>) -> Self {
        Self {
            insurer: insurer.into(),
            loading: true,
            data: None,
        }
    }

    pub fn resolved(insurer: impl Into<String>, data: QuoteResponse) -> Self {
        Self {
            insurer: insurer.into(),
            loading: false,
            data: Some(data),
        }
    }

    pub fn failure(insurer: impl Into<String>, message: impl Into<String>, status: Option<u16>) -> Self {
        Self::resolved(
            insurer,
            QuoteResponse {
                success: Some(false),
                message: Some(message.into()),
                status,
                ..QuoteResponse::default()
            },
        )
    }
}

/// Coverage data of an insurer that returned a quote
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedCoverage {
    /// "$<value>" or "-"
    pub prices: PlanValues<String>,
    pub deductible: String,
    pub medical_expenses: String,
    pub coverages_raw: PlanValues<CoverageObject>,
}

/// Display state of one insurer; exactly one applies at a time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum InsurerStatus {
    Loading,
    Error {
        message: String,
        #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
    Quoted(QuotedCoverage),
}

/// Normalized insurer record consumed by the table and the exporter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insurer {
    pub id: String,
    pub name: String,
    pub logo: String,
    #[serde(flatten)]
    pub status: InsurerStatus,
    pub is_highlighted: bool,
}

impl Insurer {
    pub fn is_loading(&self) -> bool {
        matches!(self.status, InsurerStatus::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, InsurerStatus::Error { .. })
    }

    /// True when the insurer returned a quote (neither loading nor errored)
    pub fn is_available(&self) -> bool {
        matches!(self.status, InsurerStatus::Quoted(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            InsurerStatus::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn quoted(&self) -> Option<&QuotedCoverage> {
        match &self.status {
            InsurerStatus::Quoted(coverage) => Some(coverage),
            _ => None,
        }
    }

    /// Formatted price for a plan ("$8320", "-"), None unless quoted
    pub fn price(&self, plan: CoveragePlan) -> Option<&str> {
        self.quoted().map(|c| c.prices.get(plan).as_str())
    }

    /// Numeric price for a plan, stripping "$" and ","
    pub fn plan_price(&self, plan: CoveragePlan) -> Option<f64> {
        self.price(plan).and_then(parse_price)
    }

    pub fn coverage(&self, plan: CoveragePlan) -> Option<&CoverageObject> {
        self.quoted().map(|c| c.coverages_raw.get(plan))
    }
}

/// Parse a formatted price back to a number ("$8,320.50" → 8320.5).
/// Returns None for the "-" sentinel and anything non-numeric.
pub fn parse_price(price: &str) -> Option<f64> {
    let cleaned: String = price.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Lowest price found for a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceInfo {
    pub price: String,
    pub insurer: String,
    pub logo: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_cycle() {
        assert_eq!(CoveragePlan::Amplia.next(), CoveragePlan::Limitada);
        assert_eq!(CoveragePlan::Rc.next(), CoveragePlan::Amplia);
        assert_eq!(CoveragePlan::Amplia.prev(), CoveragePlan::Rc);
        assert_eq!(CoveragePlan::from_number(3), Some(CoveragePlan::Rc));
        assert_eq!(CoveragePlan::from_number(4), None);
    }

    #[test]
    fn test_sort_order_cycle() {
        assert_eq!(SortOrder::Default.next(), SortOrder::Asc);
        assert_eq!(SortOrder::Asc.next(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.next(), SortOrder::Default);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$8,320"), Some(8320.0));
        assert_eq!(parse_price("$8320.5"), Some(8320.5));
        assert_eq!(parse_price("-"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("$abc"), None);
    }

    #[test]
    fn test_raw_result_roundtrip_keeps_wire_names() {
        let json = r#"{"insurer":"HDI","loading":false,"data":{"success":false,"message":"caido","status":404,"url_image":"http://x/y.png"}}"#;
        let raw: RawInsurerResult = serde_json::from_str(json).unwrap();
        assert!(raw.data.as_ref().unwrap().is_failure());
        assert_eq!(raw.data.as_ref().unwrap().status, Some(404));

        let back = serde_json::to_value(&raw).unwrap();
        assert_eq!(back["data"]["url_image"], "http://x/y.png");
    }

    #[test]
    fn test_null_resultado_keeps_failure_message() {
        let json = r#"{"success":false,"message":"Código postal sin cobertura","resultado":null,"status":null,"url_image":null}"#;
        let data: QuoteResponse = serde_json::from_str(json).unwrap();
        assert!(data.is_failure());
        assert!(data.resultado.is_empty());
        assert_eq!(data.message.as_deref(), Some("Código postal sin cobertura"));

        let raw: RawInsurerResult =
            serde_json::from_str(r#"{"insurer":"GNP","loading":null,"data":null}"#).unwrap();
        assert!(!raw.loading);
        assert!(raw.data.is_none());
    }

    #[test]
    fn test_missing_success_is_not_failure() {
        let data: QuoteResponse = serde_json::from_str(r#"{"resultado":[]}"#).unwrap();
        assert!(!data.is_failure());
    }

    #[test]
    fn test_insurer_serializes_state_tag() {
        let insurer = Insurer {
            id: "axa".into(),
            name: "AXA".into(),
            logo: "/images/axa-logo.png".into(),
            status: InsurerStatus::Error {
                message: "sin servicio".into(),
                image_url: None,
            },
            is_highlighted: false,
        };
        let value = serde_json::to_value(&insurer).unwrap();
        assert_eq!(value["state"], "error");
        assert_eq!(value["message"], "sin servicio");
        assert_eq!(value["isHighlighted"], false);
    }
}
