use serde::{Deserialize, Serialize};

/// One fund, as persisted to `<ISIN>.json`.
///
/// Serialized key names are the output contract and stay French; every
/// scraped value is kept as the display string the site shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundProfile {
    pub isin: String,
    #[serde(rename = "nom")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "donnees")]
    pub data: FundData,
    #[serde(rename = "cagr_depuis_creation_pct")]
    pub cagr_since_inception_pct: Option<f64>,
    #[serde(rename = "cagr_depuis_creation_source")]
    pub cagr_source: Option<CagrSource>,
    #[serde(rename = "heatmap_mensuelle")]
    pub monthly_returns: Option<MonthlyReturns>,
}

/// The label-driven key facts block of a profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundData {
    #[serde(rename = "axe_investissement")]
    pub investment_focus: Option<String>,
    #[serde(rename = "taille_du_fonds")]
    pub fund_size: Option<String>,
    #[serde(rename = "frais_totaux_sur_encours_ter")]
    pub ter: Option<String>,
    #[serde(rename = "methode_de_replication")]
    pub replication_method: Option<String>,
    #[serde(rename = "risque_de_la_strategie")]
    pub strategy_risk: Option<String>,
    #[serde(rename = "monnaie_du_fonds")]
    pub fund_currency: Option<String>,
    #[serde(rename = "volatilite_sur_1_an")]
    pub volatility_1y: Option<String>,
    #[serde(rename = "distribution")]
    pub distribution_policy: Option<String>,
    #[serde(rename = "domicile_du_fonds")]
    pub fund_domicile: Option<String>,
    #[serde(rename = "promoteur")]
    pub promoter: Option<String>,
}

/// Where `cagr_depuis_creation_pct` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CagrSource {
    #[serde(rename = "heatmap_mensuelle")]
    MonthlyReturns,
    #[serde(rename = "max_return_plus_launch_date")]
    MaxReturnAndLaunchDate,
}

/// Monthly returns chart (months × years) as rendered by the returns section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturns {
    pub months: Vec<String>,
    pub years: Vec<String>,
    pub values: Vec<MonthlyReturn>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: String,
    pub month: String,
    /// 1-based position of `month` in the chart's month axis.
    pub month_index: u32,
    pub return_pct: f64,
}
