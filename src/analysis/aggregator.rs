//! Result-set aggregation.
//!
//! This module derives the three independent summaries shown on the
//! dashboard: the risk distribution, the scatter projection and the
//! top-reason ranking. Every function is a pure, total function of the
//! record slice; malformed per-record data is excluded, never an error.

use crate::models::{RiskLevel, SuspectProperty};
use serde::Serialize;
use std::collections::HashMap;

/// Maximum number of entries in the reason ranking.
pub const TOP_REASON_LIMIT: usize = 5;

/// Levels shown in the distribution, in fixed display order, with their
/// chart colors. Low is deliberately absent: it is not actionable.
const DISTRIBUTION_LEVELS: [(RiskLevel, &str); 3] = [
    (RiskLevel::Critical, "#ef4444"),
    (RiskLevel::High, "#f97316"),
    (RiskLevel::Medium, "#eab308"),
];

/// One slice of the risk distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSlice {
    /// Serializes to the Portuguese display label.
    #[serde(rename = "label")]
    pub level: RiskLevel,
    pub count: usize,
    pub color: &'static str,
}

/// One point of the area-vs-value scatter projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// Area in m².
    pub x: f64,
    /// Declared value.
    pub y: f64,
    /// Locality, used as the point label.
    pub label: String,
    pub risk: RiskLevel,
}

/// One entry of the top-reason ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonCount {
    pub name: String,
    pub count: usize,
}

/// All three summaries for one record set, computed together so the
/// controller can cache them under a single version stamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregates {
    pub distribution: Vec<RiskSlice>,
    pub scatter: Vec<ScatterPoint>,
    pub top_reasons: Vec<ReasonCount>,
}

/// Compute all summaries for a record set.
pub fn aggregate(records: &[SuspectProperty]) -> Aggregates {
    Aggregates {
        distribution: risk_distribution(records),
        scatter: scatter_projection(records),
        top_reasons: top_reasons(records),
    }
}

/// Tally records per actionable risk level.
///
/// Order is fixed Critical, High, Medium regardless of magnitude; slices
/// with a zero count are dropped instead of rendered empty. Low and
/// unclassified records are not counted here.
pub fn risk_distribution(records: &[SuspectProperty]) -> Vec<RiskSlice> {
    DISTRIBUTION_LEVELS
        .iter()
        .map(|&(level, color)| RiskSlice {
            level,
            count: records.iter().filter(|r| r.risk_level == level).count(),
            color,
        })
        .filter(|slice| slice.count > 0)
        .collect()
}

/// Project records onto (area, declared value) points.
///
/// Points with a non-positive coordinate are dropped: they would break a
/// logarithmic-scale plot. No sampling is applied.
pub fn scatter_projection(records: &[SuspectProperty]) -> Vec<ScatterPoint> {
    records
        .iter()
        .map(|r| ScatterPoint {
            x: r.area_m2,
            y: r.declared_value,
            label: r.locality.clone(),
            risk: r.risk_level,
        })
        .filter(|p| p.x > 0.0 && p.y > 0.0)
        .collect()
}

/// Canonical short form of a `reasons` string: everything before the
/// first `:`, then before the first `(`, trimmed. The input is a simple
/// human-authored convention, so this stays a string transform.
pub fn canonical_reason(reasons: &str) -> &str {
    let head = reasons.split(':').next().unwrap_or("");
    head.split('(').next().unwrap_or("").trim()
}

/// Rank canonical reasons by frequency, capped at [`TOP_REASON_LIMIT`].
///
/// Keys compare by exact, case-sensitive equality. The descending sort is
/// stable over first-occurrence order, so equal counts keep the order in
/// which the reasons first appeared in the record set.
pub fn top_reasons(records: &[SuspectProperty]) -> Vec<ReasonCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<ReasonCount> = Vec::new();

    for record in records {
        if record.reasons.is_empty() {
            continue;
        }
        let name = canonical_reason(&record.reasons);
        match index.get(name) {
            Some(&i) => ranked[i].count += 1,
            None => {
                index.insert(name, ranked.len());
                ranked.push(ReasonCount {
                    name: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    ranked.sort_by_key(|entry| std::cmp::Reverse(entry.count));
    ranked.truncate(TOP_REASON_LIMIT);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(risk: RiskLevel, reasons: &str) -> SuspectProperty {
        SuspectProperty {
            risk_level: risk,
            reasons: reasons.to_string(),
            ..Default::default()
        }
    }

    fn example_records() -> Vec<SuspectProperty> {
        vec![
            SuspectProperty {
                locality: "Rua 1".to_string(),
                registration_number: "123".to_string(),
                area_m2: 50.0,
                declared_value: 0.10,
                risk_level: RiskLevel::Critical,
                reasons: "Valor Irrisório: R$0,10".to_string(),
                ..Default::default()
            },
            SuspectProperty {
                locality: "Rua 2".to_string(),
                registration_number: "124".to_string(),
                area_m2: 80.0,
                declared_value: 50_000.0,
                risk_level: RiskLevel::High,
                reasons: "Indícios Textuais (INVASÃO)".to_string(),
                ..Default::default()
            },
            SuspectProperty {
                locality: "Rua 1 Anexo".to_string(),
                registration_number: "125".to_string(),
                area_m2: -10.0,
                declared_value: 30_000.0,
                risk_level: RiskLevel::Medium,
                reasons: "Anomalia de Mercado".to_string(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_distribution_fixed_order() {
        let distribution = risk_distribution(&example_records());

        let levels: Vec<RiskLevel> = distribution.iter().map(|s| s.level).collect();
        assert_eq!(
            levels,
            vec![RiskLevel::Critical, RiskLevel::High, RiskLevel::Medium]
        );
        assert!(distribution.iter().all(|s| s.count == 1));
    }

    #[test]
    fn test_distribution_drops_zero_counts() {
        let records = vec![
            record(RiskLevel::High, ""),
            record(RiskLevel::High, ""),
            record(RiskLevel::Low, ""),
        ];

        let distribution = risk_distribution(&records);
        assert_eq!(distribution.len(), 1);
        assert_eq!(distribution[0].level, RiskLevel::High);
        assert_eq!(distribution[0].count, 2);
        assert_eq!(distribution[0].color, "#f97316");
    }

    #[test]
    fn test_distribution_excludes_low_and_unclassified() {
        let records = vec![
            record(RiskLevel::Critical, ""),
            record(RiskLevel::Medium, ""),
            record(RiskLevel::Low, ""),
            record(RiskLevel::Unclassified, ""),
        ];

        let distribution = risk_distribution(&records);
        let counted: usize = distribution.iter().map(|s| s.count).sum();

        // Counted = total minus records at Low or unclassified.
        assert_eq!(counted, records.len() - 2);
        assert!(counted <= records.len());
    }

    #[test]
    fn test_scatter_drops_non_positive_coordinates() {
        let points = scatter_projection(&example_records());

        // A and B qualify; C has negative area.
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].label, "Rua 1");
        assert_eq!(points[1].label, "Rua 2");
    }

    #[test]
    fn test_scatter_keeps_unclassified_records() {
        let records = vec![SuspectProperty {
            area_m2: 10.0,
            declared_value: 5.0,
            risk_level: RiskLevel::Unclassified,
            ..Default::default()
        }];

        assert_eq!(scatter_projection(&records).len(), 1);
    }

    #[test]
    fn test_scatter_zero_is_excluded() {
        let records = vec![SuspectProperty {
            area_m2: 0.0,
            declared_value: 100.0,
            ..Default::default()
        }];

        assert!(scatter_projection(&records).is_empty());
    }

    #[test]
    fn test_canonical_reason() {
        assert_eq!(canonical_reason("Valor Irrisório: R$0,10"), "Valor Irrisório");
        assert_eq!(
            canonical_reason("Indícios Textuais (INVASÃO)"),
            "Indícios Textuais"
        );
        assert_eq!(canonical_reason("Anomalia de Mercado"), "Anomalia de Mercado");
        assert_eq!(canonical_reason("  espaçado : x"), "espaçado");
    }

    #[test]
    fn test_top_reasons_first_seen_order_on_ties() {
        let ranked = top_reasons(&example_records());

        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Valor Irrisório", "Indícios Textuais", "Anomalia de Mercado"]
        );
        assert!(ranked.iter().all(|e| e.count == 1));
    }

    #[test]
    fn test_top_reasons_sorted_descending() {
        let mut records = vec![record(RiskLevel::Low, "B: x")];
        records.push(record(RiskLevel::Low, "A: y"));
        records.push(record(RiskLevel::Low, "A (z)"));

        let ranked = top_reasons(&records);
        assert_eq!(ranked[0].name, "A");
        assert_eq!(ranked[0].count, 2);
        assert_eq!(ranked[1].name, "B");

        for pair in ranked.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn test_top_reasons_capped_at_five() {
        let records: Vec<SuspectProperty> = (0..8)
            .map(|i| record(RiskLevel::Low, &format!("Motivo {}", i)))
            .collect();

        assert_eq!(top_reasons(&records).len(), TOP_REASON_LIMIT);
    }

    #[test]
    fn test_top_reasons_skips_empty_and_never_pads() {
        let records = vec![record(RiskLevel::Low, ""), record(RiskLevel::Low, "A")];

        let ranked = top_reasons(&records);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "A");
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let records = example_records();
        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
