//! Result record to APA tables
//!
//! [`build_tables`] only rearranges values already present in the record.
//! Numbers are rendered at the record's own precision, p-values in APA form.

use crate::format::{format_fixed, format_p_value, Cell};
use crate::table::Table;
use crate::{Error, Result};
use serde::Serialize;
use thesis_engine::{
    AnalysisResult, DegreesOfFreedom, GroupStatistics, RankGroupStatistics, ResultRecord,
    TestDetails,
};
use tracing::debug;

/// Everything rendered for one result record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTables {
    pub tables: Vec<Table>,
    /// One-line model summary for regression families
    pub summary: Option<String>,
    /// `Note. N = …. Effect size interpretation: ….`
    pub note: String,
}

impl ReportTables {
    pub fn table(&self, title_prefix: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.title.starts_with(title_prefix))
    }

    pub fn to_markdown(&self) -> String {
        let mut parts: Vec<String> = self.tables.iter().map(Table::to_markdown).collect();
        if let Some(summary) = &self.summary {
            parts.push(summary.clone());
        }
        parts.push(format!("*{}*", self.note));
        parts.join("\n\n")
    }
}

/// Build the tables for a record; error-only records are passed through
/// as [`Error::ErrorRecord`]
pub fn build_tables(record: &ResultRecord) -> Result<ReportTables> {
    let result = match record {
        ResultRecord::Complete(r) => r,
        ResultRecord::Failed { error } => return Err(Error::ErrorRecord(error.clone())),
    };
    debug!(test = %result.selector, "building tables");

    let outcome = result.variables.outcome.as_deref().unwrap_or("outcome");
    let mut note = footnote(result);
    let mut summary = None;
    let tables = match &result.details {
        TestDetails::TwoSample {
            group_statistics,
            welch_df,
            ..
        } => {
            let title = format!("{} for {outcome}", result.test_type);
            let df = welch_df.map_or_else(|| df_cell(&result.degrees_of_freedom), Cell::Number);
            vec![mean_comparison(&title, result, group_statistics, df)]
        }
        TestDetails::Paired {
            group_statistics, ..
        } => {
            let title = format!("{} for {outcome}", result.test_type);
            let df = df_cell(&result.degrees_of_freedom);
            vec![mean_comparison(&title, result, group_statistics, df)]
        }
        TestDetails::KGroup {
            sums_of_squares,
            group_statistics,
            posthoc,
            ..
        } => {
            let (df_between, df_within) = match result.degrees_of_freedom {
                DegreesOfFreedom::Split { between, within } => (between, within),
                _ => (0, 0),
            };
            let main = Table::new(
                format!("One-Way ANOVA Results for {outcome}"),
                vec!["Source", "SS", "df", "F", "p", "η²"],
            )
            .with_row(vec![
                Cell::text("Between Groups"),
                Cell::Number(sums_of_squares.between),
                Cell::Count(df_between),
                Cell::Number(result.statistic),
                Cell::PValue(result.p_value),
                Cell::Number(result.effect_size.value),
            ])
            .with_row(vec![
                Cell::text("Within Groups"),
                Cell::Number(sums_of_squares.within),
                Cell::Count(df_within),
            ])
            .with_row(vec![
                Cell::text("Total"),
                Cell::Number(sums_of_squares.total),
                Cell::Count(df_between + df_within),
            ]);

            let mut comparisons = Table::new(
                format!("Post-Hoc Comparisons ({})", posthoc.method),
                vec!["Comparison", "Mean Diff", "95% CI", "p (adj)", "Significant"],
            );
            for c in &posthoc.comparisons {
                comparisons.push_row(vec![
                    Cell::text(format!("{} vs {}", c.group1, c.group2)),
                    Cell::Number(c.mean_diff),
                    Cell::Interval(c.ci_lower, c.ci_upper),
                    Cell::PValue(c.p_adj),
                    Cell::yes_no(c.significant),
                ]);
            }
            note.push_str(" Adjusted p-values use Tukey HSD correction.");
            vec![main, group_table(group_statistics), comparisons]
        }
        TestDetails::Association {
            contingency_table,
            exact_test,
            yates_corrected,
            ..
        } => {
            let v1 = result.variables.variable1.as_deref().unwrap_or("variable1");
            let mut columns = vec![v1.to_string()];
            columns.extend(contingency_table.column_labels.iter().cloned());
            let mut observed = Table::new("Observed Frequencies", columns);
            for (label, counts) in contingency_table
                .row_labels
                .iter()
                .zip(&contingency_table.observed)
            {
                let mut row = vec![Cell::text(label)];
                row.extend(counts.iter().map(|&c| Cell::Count(c as usize)));
                observed.push_row(row);
            }

            let mut stats = Table::new(
                format!("{} Results", result.test_type),
                vec!["Statistic", "Value"],
            )
            .with_row(vec![Cell::text("Chi-square (χ²)"), Cell::Number(result.statistic)])
            .with_row(vec![
                Cell::text("Degrees of freedom"),
                df_cell(&result.degrees_of_freedom),
            ])
            .with_row(vec![Cell::text("p-value"), Cell::PValue(result.p_value)])
            .with_row(vec![
                Cell::text("Cramér's V"),
                Cell::Number(result.effect_size.value),
            ]);
            if let Some(phi) = result.effect_size.phi {
                stats.push_row(vec![Cell::text("Phi (φ)"), Cell::Number(phi)]);
            }
            if let Some(or) = result.effect_size.odds_ratio {
                stats.push_row(vec![Cell::text("Odds ratio"), Cell::Number(or)]);
            }
            if *exact_test {
                note.push_str(" p-value from Fisher's exact test.");
            } else if *yates_corrected {
                note.push_str(" χ² includes Yates' continuity correction.");
            }
            vec![observed, stats]
        }
        TestDetails::Correlation {
            r_squared, ci_95, ..
        } => {
            let v1 = result.variables.variable1.as_deref().unwrap_or("variable1");
            let v2 = result.variables.variable2.as_deref().unwrap_or("variable2");
            vec![Table::new(
                format!("{} Results", result.test_type),
                vec!["Variables", "N", "r", "95% CI", "r²", "p"],
            )
            .with_row(vec![
                Cell::text(format!("{v1} & {v2}")),
                Cell::Count(result.sample_size),
                Cell::Number(result.statistic),
                Cell::interval(*ci_95),
                Cell::Number(*r_squared),
                Cell::PValue(result.p_value),
            ])]
        }
        TestDetails::LinearModel {
            model_summary,
            coefficients,
            multicollinearity,
            ..
        } => {
            let mut coef = Table::new(
                format!("Linear Regression Results: {outcome}"),
                vec!["Variable", "B", "SE", "β", "t", "p", "95% CI"],
            );
            for c in coefficients {
                coef.push_row(vec![
                    Cell::text(coefficient_label(&c.variable)),
                    Cell::Number(c.b),
                    Cell::Number(c.se),
                    Cell::maybe(c.beta),
                    Cell::Number(c.t),
                    Cell::PValue(c.p),
                    Cell::interval(c.ci_95),
                ]);
            }
            let (df_model, df_resid) = match result.degrees_of_freedom {
                DegreesOfFreedom::Split { between, within } => (between, within),
                _ => (coefficients.len().saturating_sub(1), 0),
            };
            summary = Some(format!(
                "R² = {}, Adjusted R² = {}, F({df_model}, {df_resid}) = {}, p {}",
                format_fixed(model_summary.r_squared, 3),
                format_fixed(model_summary.r_squared_adj, 3),
                format_fixed(model_summary.f_statistic, 2),
                p_clause(model_summary.f_pvalue),
            ));
            let mut tables = vec![coef];
            if let Some(entries) = multicollinearity {
                let mut vif = Table::new("Multicollinearity", vec!["Variable", "VIF", "Concern"]);
                for e in entries {
                    let concern = if e.severe {
                        "Severe"
                    } else if e.concern {
                        "Moderate"
                    } else {
                        "None"
                    };
                    vif.push_row(vec![
                        Cell::text(&e.variable),
                        Cell::Number(e.vif),
                        Cell::text(concern),
                    ]);
                }
                tables.push(vif);
            }
            tables
        }
        TestDetails::LogisticModel {
            model_summary,
            coefficients,
            classification,
            outcome_levels,
        } => {
            let mut coef = Table::new(
                format!("Logistic Regression Results: {outcome}"),
                vec!["Variable", "B", "SE", "Wald", "p", "OR", "95% CI OR"],
            );
            for c in coefficients {
                coef.push_row(vec![
                    Cell::text(coefficient_label(&c.variable)),
                    Cell::Number(c.b),
                    Cell::Number(c.se),
                    Cell::Number(c.wald),
                    Cell::PValue(c.p),
                    Cell::Number(c.odds_ratio),
                    Cell::interval(c.odds_ratio_ci),
                ]);
            }
            let mut confusion = Table::new(
                "Classification Table",
                vec![
                    "Observed".to_string(),
                    format!("Predicted {}", outcome_levels[0]),
                    format!("Predicted {}", outcome_levels[1]),
                ],
            );
            for (level, counts) in outcome_levels.iter().zip(&classification.confusion_matrix) {
                confusion.push_row(vec![
                    Cell::text(level),
                    Cell::Count(counts[0]),
                    Cell::Count(counts[1]),
                ]);
            }
            summary = Some(format!(
                "McFadden R² = {}, Model χ² p {}, Classification accuracy = {}%",
                format_fixed(model_summary.pseudo_r_squared, 3),
                p_clause(model_summary.llr_pvalue),
                format_fixed(classification.accuracy * 100.0, 1),
            ));
            note.push_str(" OR = Odds Ratio.");
            vec![coef, confusion]
        }
        TestDetails::RankTwoSample {
            exact,
            group_statistics,
        } => {
            let stats = Table::new(
                format!("{} Results for {outcome}", result.test_type),
                vec!["Statistic", "Value"],
            )
            .with_row(vec![Cell::text("U"), Cell::Number(result.statistic)])
            .with_row(vec![Cell::text("p-value"), Cell::PValue(result.p_value)])
            .with_row(vec![
                Cell::text("Rank-biserial r"),
                Cell::Number(result.effect_size.value),
            ]);
            if *exact {
                note.push_str(" p-value from the exact distribution of U.");
            }
            vec![stats, rank_group_table(group_statistics)]
        }
        TestDetails::RankKGroup { group_statistics } => {
            let stats = Table::new(
                format!("{} Results for {outcome}", result.test_type),
                vec!["Statistic", "Value"],
            )
            .with_row(vec![Cell::text("H"), Cell::Number(result.statistic)])
            .with_row(vec![
                Cell::text("Degrees of freedom"),
                df_cell(&result.degrees_of_freedom),
            ])
            .with_row(vec![Cell::text("p-value"), Cell::PValue(result.p_value)])
            .with_row(vec![Cell::text("ε²"), Cell::Number(result.effect_size.value)]);
            vec![stats, rank_group_table(group_statistics)]
        }
    };

    Ok(ReportTables {
        tables,
        summary,
        note,
    })
}

fn footnote(result: &AnalysisResult) -> String {
    format!(
        "Note. N = {}. Effect size interpretation: {}.",
        result.sample_size,
        result.effect_size.interpretation.as_str()
    )
}

/// `= .032` or `< .001`
fn p_clause(p: f64) -> String {
    let formatted = format_p_value(p);
    if formatted.starts_with('<') {
        formatted
    } else {
        format!("= {formatted}")
    }
}

fn df_cell(df: &DegreesOfFreedom) -> Cell {
    match df {
        DegreesOfFreedom::Scalar(n) => Cell::Count(*n),
        DegreesOfFreedom::Split { between, within } => Cell::text(format!("{between}, {within}")),
        DegreesOfFreedom::None => Cell::Empty,
    }
}

fn coefficient_label(variable: &str) -> &str {
    if variable == "const" {
        "(Constant)"
    } else {
        variable
    }
}

/// One row: outcome, M and SD per group, statistic, df, p and d
fn mean_comparison(
    title: &str,
    result: &AnalysisResult,
    groups: &[GroupStatistics],
    df: Cell,
) -> Table {
    let mut columns = vec!["Variable".to_string()];
    let mut row = vec![Cell::text(
        result.variables.outcome.as_deref().unwrap_or("outcome"),
    )];
    for g in groups {
        columns.push(format!("{} M", g.group));
        columns.push(format!("{} SD", g.group));
        row.push(Cell::Number(g.mean));
        row.push(Cell::Number(g.std));
    }
    columns.extend(
        ["t", "df", "p", "Cohen's d", "95% CI"]
            .into_iter()
            .map(String::from),
    );
    row.extend([
        Cell::Number(result.statistic),
        df,
        Cell::PValue(result.p_value),
        Cell::Number(result.effect_size.value),
        result.effect_size.ci_95.map_or(Cell::Empty, Cell::interval),
    ]);
    Table::new(title, columns).with_row(row)
}

fn group_table(groups: &[GroupStatistics]) -> Table {
    let mut table = Table::new("Group Statistics", vec!["Group", "n", "M", "SD", "SE"]);
    for g in groups {
        table.push_row(vec![
            Cell::text(&g.group),
            Cell::Count(g.n),
            Cell::Number(g.mean),
            Cell::Number(g.std),
            Cell::Number(g.se),
        ]);
    }
    table
}

fn rank_group_table(groups: &[RankGroupStatistics]) -> Table {
    let mut table = Table::new("Group Statistics", vec!["Group", "n", "Median", "IQR"]);
    for g in groups {
        table.push_row(vec![
            Cell::text(&g.group),
            Cell::Count(g.n),
            Cell::Number(g.median),
            Cell::Number(g.iqr),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_record_passes_through() {
        let record = ResultRecord::failed("ANOVA requires 3 or more groups. Use t-test for 2 groups.");
        match build_tables(&record) {
            Err(Error::ErrorRecord(msg)) => {
                assert_eq!(msg, "ANOVA requires 3 or more groups. Use t-test for 2 groups.")
            }
            other => panic!("expected pass-through, got {other:?}"),
        }
    }

    #[test]
    fn test_p_clause() {
        assert_eq!(p_clause(0.0), "< .001");
        assert_eq!(p_clause(0.0432), "= .043");
    }

    #[test]
    fn test_df_cells() {
        assert_eq!(df_cell(&DegreesOfFreedom::Scalar(8)), Cell::Count(8));
        assert_eq!(
            df_cell(&DegreesOfFreedom::Split {
                between: 2,
                within: 27
            })
            .to_string(),
            "2, 27"
        );
        assert_eq!(df_cell(&DegreesOfFreedom::None), Cell::Empty);
    }
}
