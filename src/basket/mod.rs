use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::Sale;

#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum BasketError {
    #[error("min support must be in (0, 1], got {0}")]
    InvalidSupport(f64),
    #[error("unknown rule metric '{0}' (expected support, confidence, lift, leverage or conviction)")]
    UnknownMetric(String),
}

/// Boolean item-presence matrix: one row per transaction, one column per
/// distinct item name (alphabetical).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct OneHotMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<bool>>,
}

impl OneHotMatrix {
    pub(crate) fn from_baskets(baskets: &[Vec<String>]) -> Self {
        let columns: Vec<String> = baskets
            .iter()
            .flatten()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = baskets
            .iter()
            .map(|basket| {
                let mut row = vec![false; columns.len()];
                for name in basket {
                    if let Ok(idx) = columns.binary_search(name) {
                        row[idx] = true;
                    }
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub(crate) fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Fraction of rows containing every column in `itemset`.
    fn support(&self, itemset: &[usize]) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let hits = self
            .rows
            .iter()
            .filter(|row| itemset.iter().all(|&c| row[c]))
            .count();
        hits as f64 / self.rows.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FrequentItemset {
    /// Alphabetical item names.
    pub(crate) items: Vec<String>,
    pub(crate) support: f64,
}

/// Level-wise apriori: every itemset whose support is at least `min_support`.
pub(crate) fn frequent_itemsets(
    matrix: &OneHotMatrix,
    min_support: f64,
) -> Result<Vec<FrequentItemset>, BasketError> {
    if !(min_support > 0.0 && min_support <= 1.0) {
        return Err(BasketError::InvalidSupport(min_support));
    }

    let mut found: Vec<(Vec<usize>, f64)> = Vec::new();
    let mut level: Vec<Vec<usize>> = (0..matrix.columns.len())
        .map(|c| vec![c])
        .filter_map(|set| keep_if_frequent(matrix, set, min_support, &mut found))
        .collect();

    while !level.is_empty() {
        let candidates = next_candidates(&level);
        level = candidates
            .into_iter()
            .filter_map(|set| keep_if_frequent(matrix, set, min_support, &mut found))
            .collect();
    }

    Ok(found
        .into_iter()
        .map(|(set, support)| FrequentItemset {
            items: set.iter().map(|&c| matrix.columns[c].clone()).collect(),
            support,
        })
        .collect())
}

fn keep_if_frequent(
    matrix: &OneHotMatrix,
    set: Vec<usize>,
    min_support: f64,
    found: &mut Vec<(Vec<usize>, f64)>,
) -> Option<Vec<usize>> {
    let support = matrix.support(&set);
    if support >= min_support {
        found.push((set.clone(), support));
        Some(set)
    } else {
        None
    }
}

/// Join frequent k-itemsets sharing their first k-1 columns, then drop any
/// candidate with an infrequent k-subset.
fn next_candidates(level: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let frequent: BTreeSet<&[usize]> = level.iter().map(Vec::as_slice).collect();
    let mut candidates = Vec::new();

    for (i, a) in level.iter().enumerate() {
        for b in &level[i + 1..] {
            let k = a.len();
            if a[..k - 1] != b[..k - 1] {
                continue;
            }
            let mut candidate = a.clone();
            candidate.push(b[k - 1]);
            candidate.sort_unstable();

            let all_subsets_frequent = (0..candidate.len()).all(|skip| {
                let subset: Vec<usize> = candidate
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != skip)
                    .map(|(_, &c)| c)
                    .collect();
                frequent.contains(subset.as_slice())
            });
            if all_subsets_frequent {
                candidates.push(candidate);
            }
        }
    }

    candidates.sort();
    candidates.dedup();
    candidates
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RuleMetric {
    Support,
    Confidence,
    #[default]
    Lift,
    Leverage,
    Conviction,
}

impl RuleMetric {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Confidence => "confidence",
            Self::Lift => "lift",
            Self::Leverage => "leverage",
            Self::Conviction => "conviction",
        }
    }
}

impl FromStr for RuleMetric {
    type Err = BasketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "support" => Ok(Self::Support),
            "confidence" => Ok(Self::Confidence),
            "lift" => Ok(Self::Lift),
            "leverage" => Ok(Self::Leverage),
            "conviction" => Ok(Self::Conviction),
            other => Err(BasketError::UnknownMetric(other.to_string())),
        }
    }
}

impl std::fmt::Display for RuleMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// "If a basket holds `antecedents`, it tends to hold `consequents` too."
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Rule {
    pub(crate) antecedents: Vec<String>,
    pub(crate) consequents: Vec<String>,
    pub(crate) antecedent_support: f64,
    pub(crate) consequent_support: f64,
    pub(crate) support: f64,
    pub(crate) confidence: f64,
    pub(crate) lift: f64,
    pub(crate) leverage: f64,
    /// `None` when confidence is 1 (unbounded).
    pub(crate) conviction: Option<f64>,
}

impl Rule {
    pub(crate) fn metric(&self, metric: RuleMetric) -> f64 {
        match metric {
            RuleMetric::Support => self.support,
            RuleMetric::Confidence => self.confidence,
            RuleMetric::Lift => self.lift,
            RuleMetric::Leverage => self.leverage,
            RuleMetric::Conviction => self.conviction.unwrap_or(f64::INFINITY),
        }
    }

    pub(crate) fn antecedents_label(&self) -> String {
        self.antecedents.join(", ")
    }

    pub(crate) fn consequents_label(&self) -> String {
        self.consequents.join(", ")
    }
}

/// Every rule derivable from `itemsets` whose `metric` reaches `min_threshold`.
pub(crate) fn association_rules(
    itemsets: &[FrequentItemset],
    metric: RuleMetric,
    min_threshold: f64,
) -> Vec<Rule> {
    let supports: HashMap<&[String], f64> = itemsets
        .iter()
        .map(|set| (set.items.as_slice(), set.support))
        .collect();

    let mut rules = Vec::new();
    for set in itemsets.iter().filter(|s| s.items.len() >= 2) {
        let n = set.items.len();
        // Every non-empty proper subset is an antecedent.
        for mask in 1..(1u64 << n) - 1 {
            let (antecedents, consequents): (Vec<(usize, &String)>, Vec<(usize, &String)>) =
                set.items.iter().enumerate().partition(|&(i, _)| mask & (1u64 << i) != 0);
            let antecedents: Vec<String> = antecedents.into_iter().map(|(_, s)| s.clone()).collect();
            let consequents: Vec<String> = consequents.into_iter().map(|(_, s)| s.clone()).collect();

            let (Some(&a_sup), Some(&c_sup)) = (
                supports.get(antecedents.as_slice()),
                supports.get(consequents.as_slice()),
            ) else {
                continue;
            };

            let confidence = set.support / a_sup;
            let rule = Rule {
                lift: confidence / c_sup,
                leverage: set.support - a_sup * c_sup,
                conviction: (confidence < 1.0).then(|| (1.0 - c_sup) / (1.0 - confidence)),
                antecedents,
                consequents,
                antecedent_support: a_sup,
                consequent_support: c_sup,
                support: set.support,
                confidence,
            };
            if rule.metric(metric) >= min_threshold {
                rules.push(rule);
            }
        }
    }
    rules
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BasketParams {
    pub(crate) min_support: f64,
    pub(crate) metric: RuleMetric,
    pub(crate) min_threshold: f64,
}

impl Default for BasketParams {
    fn default() -> Self {
        Self {
            min_support: 0.1,
            metric: RuleMetric::Lift,
            min_threshold: 1.0,
        }
    }
}

/// Mine association rules from the baskets of `rows`, strongest first.
/// An empty result is a normal outcome when the thresholds are strict.
pub(crate) fn analyze(rows: &[&Sale], params: &BasketParams) -> Result<Vec<Rule>, BasketError> {
    let baskets: Vec<Vec<String>> = rows.iter().map(|s| s.basket()).collect();
    let matrix = OneHotMatrix::from_baskets(&baskets);
    debug!(
        rows = matrix.row_count(),
        columns = matrix.columns().len(),
        "Built one-hot basket matrix"
    );

    let itemsets = frequent_itemsets(&matrix, params.min_support)?;
    let mut rules = association_rules(&itemsets, params.metric, params.min_threshold);
    rules.sort_by(|a, b| {
        b.metric(params.metric)
            .total_cmp(&a.metric(params.metric))
            .then_with(|| a.antecedents.cmp(&b.antecedents))
            .then_with(|| a.consequents.cmp(&b.consequents))
    });

    info!(
        itemsets = itemsets.len(),
        rules = rules.len(),
        min_support = params.min_support,
        metric = %params.metric,
        min_threshold = params.min_threshold,
        "Basket analysis complete"
    );
    Ok(rules)
}
