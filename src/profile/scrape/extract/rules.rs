/// Every value the profile scraper looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Field {
    Name,
    Description,
    InvestmentFocus,
    FundSize,
    Ter,
    Replication,
    ReplicationMethod,
    StrategyRisk,
    FundCurrency,
    Volatility1y,
    DistributionPolicy,
    FundDomicile,
    Promoter,
    MaxReturn,
    LaunchDate,
}

/// A visible row label, compared after accent folding and lowercasing.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Label {
    Exact(&'static str),
    Prefix(&'static str),
}

impl Label {
    pub(crate) fn matches(self, normalized: &str) -> bool {
        match self {
            Self::Exact(l) => normalized == l,
            Self::Prefix(l) => normalized.starts_with(l),
        }
    }
}

/// How one field is located on the page.
#[derive(Debug)]
pub(crate) struct FieldRule {
    pub field: Field,
    /// `data-testid` of the element carrying the value.
    pub testid: &'static str,
    /// Leading label text some test ids include in their value.
    pub strip_prefix: Option<&'static str>,
    /// Row labels tried when the test id is gone.
    pub labels: &'static [Label],
}

pub(crate) const RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Name,
        testid: "etf-profile-header_etf-name",
        strip_prefix: None,
        labels: &[],
    },
    FieldRule {
        field: Field::Description,
        testid: "etf-quote-section_description-content-inner",
        strip_prefix: None,
        labels: &[],
    },
    FieldRule {
        field: Field::InvestmentFocus,
        testid: "tl_etf-basics_value_investment-focus",
        strip_prefix: None,
        labels: &[Label::Exact("axe d'investissement")],
    },
    FieldRule {
        field: Field::FundSize,
        testid: "etf-basics_row_fund-size",
        strip_prefix: Some("taille du fonds"),
        labels: &[Label::Exact("taille du fonds")],
    },
    FieldRule {
        field: Field::Ter,
        testid: "tl_etf-basics_value_ter",
        strip_prefix: None,
        labels: &[
            Label::Exact("frais totaux sur encours (ter)"),
            Label::Exact("ter"),
        ],
    },
    FieldRule {
        field: Field::Replication,
        testid: "tl_etf-basics_value_replication",
        strip_prefix: None,
        labels: &[Label::Exact("replication")],
    },
    FieldRule {
        field: Field::ReplicationMethod,
        testid: "tl_etf-basics_value_replication-method",
        strip_prefix: None,
        labels: &[Label::Exact("methode de replication")],
    },
    FieldRule {
        field: Field::StrategyRisk,
        testid: "tl_etf-basics_value_strategy-risk",
        strip_prefix: None,
        labels: &[Label::Exact("risque de la strategie")],
    },
    FieldRule {
        field: Field::FundCurrency,
        testid: "tl_etf-basics_value_fund-currency",
        strip_prefix: None,
        labels: &[Label::Exact("monnaie du fonds")],
    },
    FieldRule {
        field: Field::Volatility1y,
        testid: "tl_etf-basics_value_volatility",
        strip_prefix: None,
        labels: &[Label::Prefix("volatilite sur 1 an")],
    },
    FieldRule {
        field: Field::DistributionPolicy,
        testid: "tl_etf-basics_value_distribution-policy",
        strip_prefix: None,
        labels: &[
            Label::Exact("distribution"),
            Label::Exact("politique de distribution"),
        ],
    },
    FieldRule {
        field: Field::FundDomicile,
        testid: "tl_etf-basics_value_domicile-country",
        strip_prefix: None,
        labels: &[Label::Exact("domicile du fonds")],
    },
    FieldRule {
        field: Field::Promoter,
        testid: "tl_etf-basics_value_fund-provider",
        strip_prefix: None,
        labels: &[Label::Exact("promoteur")],
    },
    FieldRule {
        field: Field::MaxReturn,
        testid: "etf-returns-section_max-return",
        strip_prefix: None,
        labels: &[],
    },
    FieldRule {
        field: Field::LaunchDate,
        testid: "tl_etf-basics_value_launch-date",
        strip_prefix: None,
        labels: &[
            Label::Exact("date de creation"),
            Label::Exact("date de lancement"),
        ],
    },
];
