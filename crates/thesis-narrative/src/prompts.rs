//! Prompt templates filled from result records

use std::fmt::Write as _;
use thesis_engine::{AnalysisResult, Descriptives, DegreesOfFreedom, TestDetails};

pub const SYSTEM_PROMPT: &str = "\
You are interpreting statistical results for a university student's thesis.

Your task:
1. Explain what the test found in simple terms (1-2 sentences)
2. State whether the result is statistically significant
3. Explain the effect size in practical terms (what does it mean in real life?)
4. Write an APA-style results paragraph for Chapter 4
5. Link the finding back to the research objective

Rules:
- Use simple language, avoid jargon
- Always report: test statistic, p-value, effect size with CI
- Say \"significant\" only if p is below the stated alpha
- Interpret effect sizes: small, medium, large and what that means practically
- Do not invent or change any numbers; use exactly the values given
- Format for thesis: past tense, third person
- Keep explanations concise but complete
";

/// Returned when every provider failed
pub const FALLBACK_TEXT: &str = "\
**Interpretation (AI temporarily unavailable):**

The statistical results have been calculated exactly. Please review:
- The p-value to determine statistical significance (p < 0.05 is significant)
- The effect size to understand practical significance
- The confidence intervals for precision of estimates

For a complete narrative interpretation, please retry when AI services are available.
";

const PROVIDE_TAIL: &str = "\
4. APA-formatted paragraph for Chapter 4
5. Answer to the research objective
";

/// Interpretation prompt for one result
pub fn result_prompt(result: &AnalysisResult, objective: &str) -> String {
    let mut p = String::new();
    let outcome = result.variables.outcome.as_deref().unwrap_or("outcome");
    let effect = &result.effect_size;
    let asks: [&str; 3] = match &result.details {
        TestDetails::TwoSample {
            group_statistics, ..
        }
        | TestDetails::Paired {
            group_statistics, ..
        } => {
            let _ = writeln!(p, "Interpret these t-test results for a thesis:\n");
            let _ = writeln!(p, "Test: {}", result.test_type);
            let groups: Vec<String> = group_statistics
                .iter()
                .map(|g| format!("{} (n={}, M={}, SD={})", g.group, g.n, g.mean, g.std))
                .collect();
            let _ = writeln!(p, "Groups: {}", groups.join(" vs "));
            let _ = writeln!(
                p,
                "t({}) = {}, p = {}",
                df_text(&result.degrees_of_freedom),
                result.statistic,
                result.p_value
            );
            let ci = effect
                .ci_95
                .map(|(lo, hi)| format!(" [{lo}, {hi}]"))
                .unwrap_or_default();
            let _ = writeln!(p, "Cohen's d = {}{ci}", effect.value);
            let _ = writeln!(p, "Effect size: {}", effect.interpretation.as_str());
            [
                "Plain English explanation (what does this mean?)",
                "Statistical significance statement",
                "Practical significance (is the effect meaningful in real life?)",
            ]
        }
        TestDetails::KGroup {
            group_statistics,
            posthoc,
            ..
        } => {
            let _ = writeln!(p, "Interpret these ANOVA results for a thesis:\n");
            let _ = writeln!(p, "Test: {}", result.test_type);
            let _ = writeln!(p, "Groups: {}", result.variables.groups.join(", "));
            let _ = writeln!(
                p,
                "F({}) = {}, p = {}",
                df_text(&result.degrees_of_freedom),
                result.statistic,
                result.p_value
            );
            let _ = writeln!(
                p,
                "η² = {} ({})\n",
                effect.value,
                effect.interpretation.as_str()
            );
            let _ = writeln!(p, "Group means:");
            for g in group_statistics {
                let _ = writeln!(p, "- {}: M = {}, SD = {}, n = {}", g.group, g.mean, g.std, g.n);
            }
            let _ = writeln!(p, "\nPost-hoc comparisons ({}):", posthoc.method);
            for c in &posthoc.comparisons {
                let flag = if c.significant { " (significant)" } else { "" };
                let _ = writeln!(p, "- {} vs {}: p = {}{flag}", c.group1, c.group2, c.p_adj);
            }
            [
                "Plain English explanation",
                "Which groups differ significantly",
                "Practical meaning of the effect size",
            ]
        }
        TestDetails::Association {
            contingency_table, ..
        } => {
            let _ = writeln!(p, "Interpret these Chi-square results for a thesis:\n");
            let _ = writeln!(p, "Test: {}", result.test_type);
            let _ = writeln!(
                p,
                "χ²({}) = {}, p = {}",
                df_text(&result.degrees_of_freedom),
                result.statistic,
                result.p_value
            );
            let _ = writeln!(
                p,
                "Cramér's V = {} ({})",
                effect.value,
                effect.interpretation.as_str()
            );
            let _ = writeln!(p, "N = {}\n", result.sample_size);
            let _ = writeln!(p, "Contingency table:");
            let _ = writeln!(p, "| | {} |", contingency_table.column_labels.join(" | "));
            for (label, counts) in contingency_table
                .row_labels
                .iter()
                .zip(&contingency_table.observed)
            {
                let counts: Vec<String> = counts.iter().map(u64::to_string).collect();
                let _ = writeln!(p, "| {label} | {} |", counts.join(" | "));
            }
            [
                "Plain English explanation (is there an association?)",
                "Strength of the association",
                "Which categories show the strongest relationship",
            ]
        }
        TestDetails::Correlation {
            r_squared,
            ci_95,
            strength,
            direction,
            ..
        } => {
            let _ = writeln!(p, "Interpret these correlation results for a thesis:\n");
            let _ = writeln!(p, "Test: {}", result.test_type);
            let _ = writeln!(
                p,
                "Variables: {} and {}",
                result.variables.variable1.as_deref().unwrap_or("variable1"),
                result.variables.variable2.as_deref().unwrap_or("variable2")
            );
            let _ = writeln!(p, "r = {}, p = {}", result.statistic, result.p_value);
            let _ = writeln!(p, "95% CI [{}, {}]", ci_95.0, ci_95.1);
            let _ = writeln!(p, "r² = {r_squared}");
            let _ = writeln!(
                p,
                "Interpretation: {} {} correlation",
                strength.as_str(),
                direction.as_str()
            );
            [
                "Plain English explanation",
                "Strength and direction of relationship",
                "How much variance is explained (r²)",
            ]
        }
        TestDetails::LinearModel {
            model_summary,
            coefficients,
            ..
        } => {
            let _ = writeln!(p, "Interpret these linear regression results for a thesis:\n");
            let _ = writeln!(
                p,
                "Model: {outcome} predicted by {}",
                result.variables.predictors.join(", ")
            );
            let _ = writeln!(
                p,
                "R² = {}, Adjusted R² = {}",
                model_summary.r_squared, model_summary.r_squared_adj
            );
            let _ = writeln!(
                p,
                "F({}) = {}, p = {}",
                df_text(&result.degrees_of_freedom),
                model_summary.f_statistic,
                model_summary.f_pvalue
            );
            let _ = writeln!(p, "N = {}\n", result.sample_size);
            let _ = writeln!(p, "Coefficients:");
            for c in coefficients {
                let beta = c.beta.map_or_else(|| "N/A".to_string(), |b| b.to_string());
                let star = if c.significant { "*" } else { "" };
                let _ = writeln!(
                    p,
                    "- {}: B = {}, SE = {}, β = {beta}, t = {}, p = {}{star}",
                    c.variable, c.b, c.se, c.t, c.p
                );
            }
            [
                "Overall model interpretation (does it predict the outcome?)",
                "Which predictors are significant and their effects",
                "Practical meaning (for every unit increase in X, Y changes by...)",
            ]
        }
        TestDetails::LogisticModel {
            model_summary,
            coefficients,
            classification,
            outcome_levels,
        } => {
            let _ = writeln!(p, "Interpret these logistic regression results for a thesis:\n");
            let _ = writeln!(
                p,
                "Model: {outcome} ({} vs {}) predicted by {}",
                outcome_levels[1],
                outcome_levels[0],
                result.variables.predictors.join(", ")
            );
            let _ = writeln!(p, "McFadden pseudo R² = {}", model_summary.pseudo_r_squared);
            let _ = writeln!(p, "Model χ² p = {}", model_summary.llr_pvalue);
            let _ = writeln!(
                p,
                "Classification accuracy = {:.1}%",
                classification.accuracy * 100.0
            );
            let _ = writeln!(p, "N = {}\n", result.sample_size);
            let _ = writeln!(p, "Coefficients:");
            for c in coefficients {
                let star = if c.significant { "*" } else { "" };
                let _ = writeln!(
                    p,
                    "- {}: OR = {} [{}, {}], p = {}{star}",
                    c.variable, c.odds_ratio, c.odds_ratio_ci.0, c.odds_ratio_ci.1, c.p
                );
            }
            [
                "Overall model interpretation",
                "Significant predictors and their odds ratios",
                "Practical meaning (odds of outcome increase/decrease by X times when...)",
            ]
        }
        TestDetails::RankTwoSample {
            group_statistics, ..
        }
        | TestDetails::RankKGroup { group_statistics } => {
            let _ = writeln!(p, "Interpret these non-parametric test results for a thesis:\n");
            let _ = writeln!(p, "Test: {}", result.test_type);
            let groups: Vec<String> = group_statistics
                .iter()
                .map(|g| format!("{} (n={}, Mdn={}, IQR={})", g.group, g.n, g.median, g.iqr))
                .collect();
            let _ = writeln!(p, "Groups: {}", groups.join(" vs "));
            let df = match result.degrees_of_freedom {
                DegreesOfFreedom::None => String::new(),
                df => format!("({})", df_text(&df)),
            };
            let _ = writeln!(
                p,
                "Statistic{df} = {}, p = {}",
                result.statistic, result.p_value
            );
            let _ = writeln!(
                p,
                "{} = {} ({})",
                effect.metric.label(),
                effect.value,
                effect.interpretation.as_str()
            );
            [
                "Plain English explanation",
                "Whether the distributions differ and in which direction",
                "Practical meaning of the effect size",
            ]
        }
    };

    let _ = writeln!(p, "Significance level: α = {}", result.alpha);
    let _ = writeln!(p, "\nResearch objective: {objective}\n");
    let _ = writeln!(p, "Provide:");
    for (i, ask) in asks.iter().enumerate() {
        let _ = writeln!(p, "{}. {ask}", i + 1);
    }
    p.push_str(PROVIDE_TAIL);
    p
}

fn df_text(df: &DegreesOfFreedom) -> String {
    match df {
        DegreesOfFreedom::Scalar(n) => n.to_string(),
        DegreesOfFreedom::Split { between, within } => format!("{between}, {within}"),
        DegreesOfFreedom::None => "-".to_string(),
    }
}

/// Sample description for the start of Chapter 4
pub fn descriptive_prompt(descriptives: &Descriptives, sample_size: usize) -> String {
    let continuous: Vec<String> = descriptives
        .continuous
        .iter()
        .map(|s| {
            format!(
                "- {}: M = {}, SD = {}, range = {}-{}",
                s.variable, s.mean, s.std, s.min, s.max
            )
        })
        .collect();
    let categorical: Vec<String> = descriptives
        .categorical
        .iter()
        .map(|s| {
            let cats: Vec<String> = s
                .categories
                .iter()
                .take(5)
                .map(|c| format!("{} ({}%)", c.category, c.percentage))
                .collect();
            format!("- {}: {}", s.variable, cats.join(", "))
        })
        .collect();
    let or_none = |lines: Vec<String>| {
        if lines.is_empty() {
            "None".to_string()
        } else {
            lines.join("\n")
        }
    };
    format!(
        "Generate a Chapter 4 narrative for these sample characteristics:\n\n\
         Sample size: {sample_size}\n\
         Continuous variables:\n{}\n\n\
         Categorical variables:\n{}\n\n\
         Write 2-3 paragraphs describing the sample for a thesis Chapter 4.\n\
         Use past tense, third person.\n\
         Start with: \"A total of {sample_size} participants were included in this study...\"\n",
        or_none(continuous),
        or_none(categorical)
    )
}

/// Data analysis paragraph for Chapter 3
pub fn methods_prompt(tests_used: &[String], variables: &[String], alpha: f64) -> String {
    format!(
        "Generate a data analysis methods section for Chapter 3:\n\n\
         Analysis details:\n\
         - Statistical software: thesis-stats\n\
         - Significance level: α = {alpha}\n\
         - Tests performed: {}\n\
         - Variables analyzed: {}\n\n\
         Write 1-2 paragraphs describing the data analysis approach for a thesis.\n\
         Include mention of assumption checking and effect size reporting.\n",
        tests_used.join(", "),
        variables.join(", ")
    )
}
