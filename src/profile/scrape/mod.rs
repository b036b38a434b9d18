//! Parse the profile page HTML into a [`FundProfile`].

use scraper::Html;
use tracing::debug;

use super::{FundData, FundProfile};
use crate::EtfError;

pub(crate) mod extract;
use extract::{Field, extract_fields};

/// Raw inputs for the fallback CAGR, kept out of the persisted record.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ReturnHints {
    pub max_return_text: Option<String>,
    pub launch_date_text: Option<String>,
}

pub(crate) fn parse_profile_html(body: &str, isin: &str) -> Result<(FundProfile, ReturnHints), EtfError> {
    if body.trim().is_empty() {
        return Err(EtfError::Extraction("empty response body".into()));
    }

    let doc = Html::parse_document(body);
    let mut fields = extract_fields(&doc);

    let name = fields.take(Field::Name).ok_or_else(|| {
        EtfError::Extraction(
            "fund name not found: page is probably invalid or its structure changed".into(),
        )
    })?;

    // The method only qualifies a replication value, it never stands alone.
    let replication = fields.take(Field::Replication);
    let replication_method = match (replication, fields.take(Field::ReplicationMethod)) {
        (Some(r), Some(m)) => Some(format!("{r} ({m})")),
        (r, _) => r,
    };

    let data = FundData {
        investment_focus: fields.take(Field::InvestmentFocus),
        fund_size: fields.take(Field::FundSize),
        ter: fields.take(Field::Ter),
        replication_method,
        strategy_risk: fields.take(Field::StrategyRisk),
        fund_currency: fields.take(Field::FundCurrency),
        volatility_1y: fields.take(Field::Volatility1y),
        distribution_policy: fields.take(Field::DistributionPolicy),
        fund_domicile: fields.take(Field::FundDomicile),
        promoter: fields.take(Field::Promoter),
    };

    let hints = ReturnHints {
        max_return_text: fields.take(Field::MaxReturn),
        launch_date_text: fields.take(Field::LaunchDate),
    };

    debug!(isin, name = %name, "profile page parsed");

    let profile = FundProfile {
        isin: isin.to_string(),
        name: Some(name),
        description: fields.take(Field::Description),
        data,
        cagr_since_inception_pct: None,
        cagr_source: None,
        monthly_returns: None,
    };
    Ok((profile, hints))
}
