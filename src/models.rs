//! Data models for the fraud dashboard.
//!
//! This module contains the wire-level data structures returned by the
//! analysis endpoint. Field names on the wire are Portuguese; they are
//! mapped to the crate's vocabulary with serde renames. Every field has
//! a default so a partially absent payload deserializes to zero values
//! instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status marker the backend uses for a valid-but-empty analysis.
pub const EMPTY_STATUS: &str = "vazio";

/// Risk level assigned to a record by the detection engine.
///
/// The wire carries the Portuguese labels. Any other value (or an absent
/// field) becomes `Unclassified`: such records stay visible in the table,
/// scatter and filter views but are excluded from risk-distribution counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    /// Crítico - negligible declared value, near-certain evasion
    Critical,
    /// Alto - physical irregularity indications, aggressive underpricing
    High,
    /// Médio - missing registration data
    Medium,
    /// Baixo - not actionable
    Low,
    /// Any label outside the four known variants
    #[default]
    Unclassified,
}

impl RiskLevel {
    /// Returns the Portuguese display label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "Crítico",
            RiskLevel::High => "Alto",
            RiskLevel::Medium => "Médio",
            RiskLevel::Low => "Baixo",
            RiskLevel::Unclassified => "Não classificado",
        }
    }

    /// Returns an emoji badge for terminal output.
    pub fn badge(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "🔴",
            RiskLevel::High => "🟠",
            RiskLevel::Medium => "🟡",
            RiskLevel::Low => "🟢",
            RiskLevel::Unclassified => "⚪",
        }
    }

    /// Severity rank for threshold comparisons. Unclassified ranks below Low.
    pub fn rank(&self) -> u8 {
        match self {
            RiskLevel::Critical => 4,
            RiskLevel::High => 3,
            RiskLevel::Medium => 2,
            RiskLevel::Low => 1,
            RiskLevel::Unclassified => 0,
        }
    }

    /// Whether this level is at or above `threshold`.
    pub fn at_least(&self, threshold: RiskLevel) -> bool {
        self.rank() >= threshold.rank()
    }
}

impl From<String> for RiskLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Crítico" => RiskLevel::Critical,
            "Alto" => RiskLevel::High,
            "Médio" => RiskLevel::Medium,
            "Baixo" => RiskLevel::Low,
            _ => RiskLevel::Unclassified,
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.label().to_string()
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One suspect property record as reported by the analysis endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuspectProperty {
    /// Identifier from the source file. Not guaranteed unique across files.
    #[serde(rename = "id_original", default)]
    pub source_id: i64,
    /// Property kind (residential, commercial, ...).
    #[serde(rename = "tipo", default)]
    pub kind: String,
    /// Municipal registration number. Treated as an opaque identifier.
    #[serde(rename = "inscricao", default)]
    pub registration_number: String,
    /// Free-text address / locality.
    #[serde(rename = "localidade", default)]
    pub locality: String,
    /// Declared area in square meters.
    #[serde(rename = "metragem", default)]
    pub area_m2: f64,
    /// Declared monetary value.
    #[serde(rename = "valor_declarado", default)]
    pub declared_value: f64,
    /// Value per m² computed by the engine from the declaration.
    #[serde(rename = "valor_m2_calculado", default)]
    pub computed_value_per_m2: f64,
    /// External market benchmark per m², display-only.
    #[serde(rename = "referencia_mercado_m2", default)]
    pub market_reference_value_per_m2: f64,
    /// Risk level assigned upstream.
    #[serde(rename = "nivel_risco", default)]
    pub risk_level: RiskLevel,
    /// Delimiter-joined free-text evidence for the classification.
    #[serde(rename = "motivos", default)]
    pub reasons: String,
    /// Name of the source data file this record came from.
    #[serde(rename = "arquivo_origem", default)]
    pub source_file: String,
}

impl SuspectProperty {
    /// First comma-separated segment of `reasons`, shown as the
    /// main accusation in the detail table.
    pub fn primary_accusation(&self) -> &str {
        self.reasons.split(',').next().unwrap_or("").trim()
    }
}

/// The complete outcome of one fetch from the analysis endpoint.
///
/// Held immutably until the next successful fetch replaces it. Note that
/// `total_suspicious` and `records.len()` are independently sourced and
/// are not reconciled; both are surfaced as observed quantities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Backend status marker (`sucesso`, `erro`, `vazio`).
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable message accompanying the status.
    #[serde(rename = "mensagem", default)]
    pub message: Option<String>,
    /// Data files the engine processed to produce this result.
    #[serde(rename = "arquivos_processados", default)]
    pub processed_files: Vec<String>,
    /// Server-declared count of suspicious properties.
    #[serde(rename = "total_imoveis_suspeitos", default)]
    pub total_suspicious: u64,
    /// The suspect records themselves.
    #[serde(rename = "resultados", default)]
    pub records: Vec<SuspectProperty>,
}

impl AnalysisResult {
    /// Whether the backend marked this result as empty.
    pub fn is_marked_empty(&self) -> bool {
        self.status.as_deref() == Some(EMPTY_STATUS)
    }

    /// Number of records at exactly the given risk level.
    pub fn count_at_level(&self, level: RiskLevel) -> usize {
        self.records
            .iter()
            .filter(|r| r.risk_level == level)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_from_wire_labels() {
        assert_eq!(RiskLevel::from("Crítico".to_string()), RiskLevel::Critical);
        assert_eq!(RiskLevel::from("Alto".to_string()), RiskLevel::High);
        assert_eq!(RiskLevel::from("Médio".to_string()), RiskLevel::Medium);
        assert_eq!(RiskLevel::from("Baixo".to_string()), RiskLevel::Low);
    }

    #[test]
    fn test_unknown_risk_label_is_unclassified() {
        assert_eq!(
            RiskLevel::from("Altíssimo".to_string()),
            RiskLevel::Unclassified
        );
        assert_eq!(RiskLevel::from(String::new()), RiskLevel::Unclassified);
    }

    #[test]
    fn test_risk_level_rank_ordering() {
        assert!(RiskLevel::Critical.at_least(RiskLevel::High));
        assert!(RiskLevel::High.at_least(RiskLevel::High));
        assert!(!RiskLevel::Medium.at_least(RiskLevel::High));
        assert!(!RiskLevel::Unclassified.at_least(RiskLevel::Low));
    }

    #[test]
    fn test_record_deserializes_wire_names() {
        let json = r#"{
            "id_original": 7,
            "tipo": "Residencial",
            "inscricao": "123.456-X",
            "localidade": "Rua das Flores 10",
            "metragem": 250.5,
            "valor_declarado": 0.10,
            "valor_m2_calculado": 0.0,
            "referencia_mercado_m2": 1500.0,
            "nivel_risco": "Crítico",
            "motivos": "Valor Declarado Irrisório (R$ 0,10)",
            "arquivo_origem": "bens-imoveis.json"
        }"#;

        let record: SuspectProperty = serde_json::from_str(json).unwrap();
        assert_eq!(record.source_id, 7);
        assert_eq!(record.registration_number, "123.456-X");
        assert_eq!(record.risk_level, RiskLevel::Critical);
        assert_eq!(record.area_m2, 250.5);
        assert_eq!(record.source_file, "bens-imoveis.json");
    }

    #[test]
    fn test_record_with_absent_fields_defaults() {
        let record: SuspectProperty = serde_json::from_str("{}").unwrap();
        assert_eq!(record.source_id, 0);
        assert_eq!(record.locality, "");
        assert_eq!(record.area_m2, 0.0);
        assert_eq!(record.risk_level, RiskLevel::Unclassified);
    }

    #[test]
    fn test_empty_payload_defaults() {
        let result: AnalysisResult = serde_json::from_str("{}").unwrap();
        assert_eq!(result.status, None);
        assert_eq!(result.message, None);
        assert!(result.processed_files.is_empty());
        assert_eq!(result.total_suspicious, 0);
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_total_mismatch_is_tolerated() {
        // total_imoveis_suspeitos and resultados are independently sourced;
        // a mismatch must parse cleanly.
        let json = r#"{
            "status": "sucesso",
            "total_imoveis_suspeitos": 99,
            "resultados": [{"nivel_risco": "Alto"}]
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.total_suspicious, 99);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn test_marked_empty_status() {
        let json = r#"{"status": "vazio", "mensagem": "Arquivo não encontrado"}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(result.is_marked_empty());
        assert_eq!(result.message.as_deref(), Some("Arquivo não encontrado"));
    }

    #[test]
    fn test_count_at_level() {
        let result = AnalysisResult {
            records: vec![
                SuspectProperty {
                    risk_level: RiskLevel::Critical,
                    ..Default::default()
                },
                SuspectProperty {
                    risk_level: RiskLevel::Critical,
                    ..Default::default()
                },
                SuspectProperty {
                    risk_level: RiskLevel::Low,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        assert_eq!(result.count_at_level(RiskLevel::Critical), 2);
        assert_eq!(result.count_at_level(RiskLevel::High), 0);
        assert_eq!(result.count_at_level(RiskLevel::Low), 1);
    }

    #[test]
    fn test_primary_accusation() {
        let record = SuspectProperty {
            reasons: "Valor Declarado Irrisório (R$ 0,10), Inscrição Imobiliária Ausente"
                .to_string(),
            ..Default::default()
        };
        assert_eq!(
            record.primary_accusation(),
            "Valor Declarado Irrisório (R$ 0,10)"
        );

        let empty = SuspectProperty::default();
        assert_eq!(empty.primary_accusation(), "");
    }
}
