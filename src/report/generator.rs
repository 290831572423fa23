//! Dashboard rendering and report generation.
//!
//! Builds a serializable snapshot of the loaded dashboard and renders it
//! as a terminal view, a Markdown report or a JSON report. Section titles
//! follow the audit team's vocabulary. All numeric output goes through
//! the formatting contract in [`crate::report::format`].

use crate::analysis::aggregator::{ReasonCount, RiskSlice, ScatterPoint};
use crate::dashboard::Dashboard;
use crate::models::{RiskLevel, SuspectProperty};
use crate::report::format::{format_count, format_currency};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Width of the distribution bars in terminal output.
const BAR_WIDTH: usize = 30;

/// Metadata about one rendered snapshot.
///
/// `total_suspicious` (server-declared) and `record_count` (observed) are
/// independently sourced and reported side by side, never reconciled.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub endpoint: String,
    pub generated_at: DateTime<Utc>,
    pub total_suspicious: u64,
    pub record_count: usize,
    pub processed_files: Vec<String>,
    pub filter_query: String,
}

/// The KPI row of the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
    pub total_suspicious: u64,
    pub critical: usize,
    pub high: usize,
    pub files_processed: usize,
}

/// Serializable snapshot of everything the dashboard shows.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub metadata: ReportMetadata,
    pub kpis: Kpis,
    pub risk_distribution: Vec<RiskSlice>,
    pub top_reasons: Vec<ReasonCount>,
    pub scatter: Vec<ScatterPoint>,
    /// Rows of the detail table, after filtering.
    pub records: Vec<SuspectProperty>,
}

/// Build a snapshot of the current dashboard state.
pub fn build_report(dashboard: &mut Dashboard) -> DashboardReport {
    let aggregates = dashboard.aggregates().clone();
    let records = dashboard.filtered().to_vec();

    let (total_suspicious, processed_files) = match dashboard.result() {
        Some(r) => (r.total_suspicious, r.processed_files.clone()),
        None => (0, Vec::new()),
    };

    let kpis = Kpis {
        total_suspicious,
        critical: dashboard
            .result()
            .map(|r| r.count_at_level(RiskLevel::Critical))
            .unwrap_or(0),
        high: dashboard
            .result()
            .map(|r| r.count_at_level(RiskLevel::High))
            .unwrap_or(0),
        files_processed: processed_files.len(),
    };

    DashboardReport {
        metadata: ReportMetadata {
            endpoint: dashboard.endpoint().to_string(),
            generated_at: Utc::now(),
            total_suspicious,
            record_count: dashboard.records().len(),
            processed_files,
            filter_query: dashboard.query().to_string(),
        },
        kpis,
        risk_distribution: aggregates.distribution,
        top_reasons: aggregates.top_reasons,
        scatter: aggregates.scatter,
        records,
    }
}

/// Render the dashboard for the terminal.
///
/// Failure and empty states short-circuit into their notices; otherwise
/// the full view is rendered with the detail table capped at `max_rows`.
pub fn render_dashboard(dashboard: &mut Dashboard, max_rows: usize) -> String {
    let mut output = String::new();

    if let Some(notice) = dashboard.last_failure() {
        output.push_str(&format!("❌ {}\n", notice));
        if dashboard.result().is_none() {
            return output;
        }
        output.push_str("   Exibindo o último resultado carregado.\n\n");
    }

    if let Some(message) = dashboard.empty_message() {
        output.push_str(&format!("📭 {}\n", message));
        return output;
    }

    let report = build_report(dashboard);

    output.push_str(&render_kpi_section(&report.kpis, report.metadata.record_count));
    output.push_str(&render_distribution_section(&report.risk_distribution));
    output.push_str(&render_reasons_section(&report.top_reasons));
    output.push_str(&render_scatter_section(&report.scatter));
    output.push_str(&render_table_section(
        &report.records,
        report.metadata.record_count,
        &report.metadata.filter_query,
        max_rows,
    ));

    output
}

fn render_kpi_section(kpis: &Kpis, record_count: usize) -> String {
    let mut section = String::new();

    section.push_str("📊 Indicadores\n");
    section.push_str(&format!(
        "   Imóveis suspeitos (declarado): {}   Registros recebidos: {}\n",
        format_count(kpis.total_suspicious as i64),
        format_count(record_count as i64)
    ));
    section.push_str(&format!(
        "   🔴 Risco Crítico: {}   🟠 Risco Alto: {}   Arquivos lidos: {}\n\n",
        format_count(kpis.critical as i64),
        format_count(kpis.high as i64),
        format_count(kpis.files_processed as i64)
    ));

    section
}

fn render_distribution_section(distribution: &[RiskSlice]) -> String {
    let mut section = String::new();

    section.push_str("Severidade das Fraudes\n");

    if distribution.is_empty() {
        section.push_str("   (nenhum registro em nível acionável)\n\n");
        return section;
    }

    let max = distribution.iter().map(|s| s.count).max().unwrap_or(1);
    for slice in distribution {
        section.push_str(&format!(
            "   {} {:<16} {} {}\n",
            slice.level.badge(),
            slice.level.label(),
            bar(slice.count, max),
            format_count(slice.count as i64)
        ));
    }
    section.push('\n');

    section
}

fn render_reasons_section(reasons: &[ReasonCount]) -> String {
    let mut section = String::new();

    section.push_str("Top 5 Motivos de Irregularidade\n");
    for (i, entry) in reasons.iter().enumerate() {
        section.push_str(&format!(
            "   {}. {} ({})\n",
            i + 1,
            entry.name,
            format_count(entry.count as i64)
        ));
    }
    if reasons.is_empty() {
        section.push_str("   (sem motivos registrados)\n");
    }
    section.push('\n');

    section
}

fn render_scatter_section(scatter: &[ScatterPoint]) -> String {
    format!(
        "Dispersão: Valor vs Metragem\n   {} pontos válidos para escala logarítmica (coordenadas não positivas excluídas)\n\n",
        format_count(scatter.len() as i64)
    )
}

fn render_table_section(
    rows: &[SuspectProperty],
    total: usize,
    query: &str,
    max_rows: usize,
) -> String {
    let mut section = String::new();

    section.push_str("Detalhamento dos Imóveis");
    if !query.is_empty() {
        section.push_str(&format!("  (filtro: \"{}\")", query));
    }
    section.push('\n');

    section.push_str(&format!(
        "   {:<10} {:<32} {:<26} {:<14} {:>10} {:>16} {:>14}\n",
        "Risco", "Acusação Principal", "Localidade", "Inscrição", "Metragem", "Valor Decl.", "Ref. m²"
    ));

    for row in rows.iter().take(max_rows) {
        section.push_str(&format!(
            "   {:<10} {:<32} {:<26} {:<14} {:>10} {:>16} {:>14}\n",
            clip(row.risk_level.label(), 10),
            clip(row.primary_accusation(), 32),
            clip(&row.locality, 26),
            clip(&row.registration_number, 14),
            format_count(row.area_m2.round() as i64),
            format_currency(row.declared_value),
            format_currency(row.market_reference_value_per_m2),
        ));
    }

    let shown = rows.len().min(max_rows);
    section.push_str(&format!(
        "   Mostrando {} de {} resultados filtrados ({} no total)\n",
        format_count(shown as i64),
        format_count(rows.len() as i64),
        format_count(total as i64)
    ));

    section
}

/// Generate a complete Markdown report of the snapshot.
pub fn generate_markdown_report(report: &DashboardReport) -> String {
    let mut output = String::new();

    output.push_str("# Relatório de Auditoria Fiscal\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_kpi_section(&report.kpis, &report.metadata));
    output.push_str(&generate_distribution_section(&report.risk_distribution));
    output.push_str(&generate_reasons_section(&report.top_reasons));
    output.push_str(&generate_scatter_section(&report.scatter));
    output.push_str(&generate_table_section(&report.records));
    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadados\n\n");
    section.push_str(&format!("- **Endpoint:** {}\n", metadata.endpoint));
    section.push_str(&format!(
        "- **Gerado em:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Imóveis suspeitos (declarado pelo servidor):** {}\n",
        format_count(metadata.total_suspicious as i64)
    ));
    section.push_str(&format!(
        "- **Registros recebidos:** {}\n",
        format_count(metadata.record_count as i64)
    ));
    if !metadata.processed_files.is_empty() {
        section.push_str(&format!(
            "- **Arquivos processados:** {}\n",
            metadata.processed_files.join(", ")
        ));
    }
    if !metadata.filter_query.is_empty() {
        section.push_str(&format!("- **Filtro ativo:** `{}`\n", metadata.filter_query));
    }
    section.push('\n');

    section
}

fn generate_kpi_section(kpis: &Kpis, metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Indicadores\n\n");
    section.push_str("| Imóveis Suspeitos | Risco Crítico | Risco Alto | Arquivos Lidos |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        format_count(metadata.total_suspicious as i64),
        format_count(kpis.critical as i64),
        format_count(kpis.high as i64),
        format_count(kpis.files_processed as i64)
    ));

    section
}

fn generate_distribution_section(distribution: &[RiskSlice]) -> String {
    let mut section = String::new();

    section.push_str("## Severidade das Fraudes\n\n");

    if distribution.is_empty() {
        section.push_str("Nenhum registro em nível acionável.\n\n");
        return section;
    }

    section.push_str("| Nível | Quantidade | Cor |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for slice in distribution {
        section.push_str(&format!(
            "| {} {} | {} | `{}` |\n",
            slice.level.badge(),
            slice.level.label(),
            format_count(slice.count as i64),
            slice.color
        ));
    }
    section.push('\n');

    section
}

fn generate_reasons_section(reasons: &[ReasonCount]) -> String {
    let mut section = String::new();

    section.push_str("## Top 5 Motivos de Irregularidade\n\n");

    if reasons.is_empty() {
        section.push_str("Sem motivos registrados.\n\n");
        return section;
    }

    for (i, entry) in reasons.iter().enumerate() {
        section.push_str(&format!(
            "{}. **{}** — {}\n",
            i + 1,
            entry.name,
            format_count(entry.count as i64)
        ));
    }
    section.push('\n');

    section
}

fn generate_scatter_section(scatter: &[ScatterPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Dispersão: Valor vs Metragem\n\n");
    section.push_str(&format!(
        "{} pontos válidos (escala logarítmica; coordenadas não positivas excluídas).\n\n",
        format_count(scatter.len() as i64)
    ));

    if !scatter.is_empty() {
        section.push_str("| Localidade | Metragem (m²) | Valor Declarado | Risco |\n");
        section.push_str("|:---|---:|---:|:---|\n");
        for point in scatter {
            section.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                point.label,
                format_count(point.x.round() as i64),
                format_currency(point.y),
                point.risk.label()
            ));
        }
        section.push('\n');
    }

    section
}

fn generate_table_section(records: &[SuspectProperty]) -> String {
    let mut section = String::new();

    section.push_str("## Detalhamento dos Imóveis\n\n");

    if records.is_empty() {
        section.push_str("Nenhum registro corresponde ao filtro atual.\n\n");
        return section;
    }

    section.push_str(
        "| Risco | Acusação Principal | Localidade | Inscrição | Metragem | Valor Decl. | Ref. Mercado (m²) |\n",
    );
    section.push_str("|:---|:---|:---|:---|---:|---:|---:|\n");

    for row in records {
        section.push_str(&format!(
            "| {} {} | {} | {} | `{}` | {} m² | {} | {} |\n",
            row.risk_level.badge(),
            row.risk_level.label(),
            row.primary_accusation(),
            row.locality,
            row.registration_number,
            format_count(row.area_m2.round() as i64),
            format_currency(row.declared_value),
            format_currency(row.market_reference_value_per_m2),
        ));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    "---\n\n*Relatório gerado pelo fraudscope*\n".to_string()
}

/// Generate a JSON report of the snapshot.
pub fn generate_json_report(report: &DashboardReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

fn bar(count: usize, max: usize) -> String {
    let max = max.max(1);
    let len = ((count * BAR_WIDTH + max - 1) / max).clamp(1, BAR_WIDTH);
    "█".repeat(len)
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
