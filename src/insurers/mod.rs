//! Supported insurers and how each one shapes its coverage payload
//!
//! Upstream APIs disagree on which raw key holds which coverage tier. Rather
//! than branching on insurer names inside the normalizer, every insurer maps
//! to a [`CoverageLayout`] describing where to read each field.

use serde::{Deserialize, Serialize};

use crate::types::{CoveragePlan, PlanValues};

/// Insurers the comparator can quote against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InsurerId {
    Hdi,
    Mapfre,
    Gnp,
    Chubb,
    Axa,
}

impl InsurerId {
    /// All insurers in display order
    pub fn all() -> &'static [InsurerId] {
        &[Self::Hdi, Self::Mapfre, Self::Gnp, Self::Chubb, Self::Axa]
    }

    /// Display name, also used as the `insurer` field of raw results
    pub fn name(self) -> &'static str {
        match self {
            Self::Hdi => "HDI",
            Self::Mapfre => "Mapfre",
            Self::Gnp => "GNP",
            Self::Chubb => "Chubb",
            Self::Axa => "AXA",
        }
    }

    /// Case-insensitive lookup by display name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Path segment of `/api/cotizacion/{n}` used when no override is configured.
    /// Mapfre and GNP share a quoting service upstream.
    pub fn default_endpoint(self) -> u32 {
        match self {
            Self::Hdi => 1,
            Self::Mapfre => 3,
            Self::Gnp => 3,
            Self::Chubb => 4,
            Self::Axa => 5,
        }
    }

    pub fn layout(self) -> &'static CoverageLayout {
        match self {
            Self::Hdi => &HDI_LAYOUT,
            Self::Mapfre => &MAPFRE_LAYOUT,
            Self::Gnp | Self::Chubb | Self::Axa => &DEFAULT_LAYOUT,
        }
    }
}

/// How the deductible is rendered from the amplia coverage object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeductibleRule {
    /// Numeric field rendered as "{n}%" (present even when zero)
    Percent(&'static str),
    /// Field copied as-is when truthy
    Verbatim(&'static str),
}

/// Where each normalized field lives inside `resultado[0]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageLayout {
    /// Raw keys tried in order for each plan; the first present wins
    pub plans: PlanValues<&'static [&'static str]>,
    pub deductible: DeductibleRule,
    /// Field of the amplia coverage holding the medical-expenses figure
    pub medical_expenses: &'static str,
}

impl CoverageLayout {
    pub fn keys(&self, plan: CoveragePlan) -> &'static [&'static str] {
        self.plans.get(plan)
    }
}

/// HDI names its tiers one step "up": PREMIUM is amplia, AMPLIA is limitada
/// and LIMITADA is rc.
pub static HDI_LAYOUT: CoverageLayout = CoverageLayout {
    plans: PlanValues {
        amplia: &["PREMIUM"],
        limitada: &["AMPLIA"],
        rc: &["LIMITADA"],
    },
    deductible: DeductibleRule::Percent("iDanoVehiculo"),
    medical_expenses: "dGastosMedicos",
};

pub static DEFAULT_LAYOUT: CoverageLayout = CoverageLayout {
    plans: PlanValues {
        amplia: &["AMPLIA"],
        limitada: &["LIMITADA"],
        rc: &["PREMIUM"],
    },
    deductible: DeductibleRule::Verbatim("deductible"),
    medical_expenses: "dGastosMedicos",
};

/// Mapfre sometimes answers with capitalized tier names and an explicit RC key
pub static MAPFRE_LAYOUT: CoverageLayout = CoverageLayout {
    plans: PlanValues {
        amplia: &["AMPLIA", "Amplia"],
        limitada: &["LIMITADA", "Limitada"],
        rc: &["PREMIUM", "RC"],
    },
    deductible: DeductibleRule::Verbatim("deductible"),
    medical_expenses: "dGastosMedicos",
};

/// Layout for a raw `insurer` name; unknown insurers use the default layout
pub fn layout_for(name: &str) -> &'static CoverageLayout {
    InsurerId::from_name(name)
        .map(InsurerId::layout)
        .unwrap_or(&DEFAULT_LAYOUT)
}
