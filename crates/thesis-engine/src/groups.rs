//! Splitting an outcome column by a grouping column

use crate::record::{GroupStatistics, RankGroupStatistics};
use crate::{Error, Result};
use thesis_core::numeric::{iqr, mean, median, std_dev};
use thesis_core::round4;
use thesis_data::Dataset;
use tracing::debug;

/// Outcome values per group, groups in order of first appearance
#[derive(Debug, Clone, PartialEq)]
pub struct Groups {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl Groups {
    /// Pairwise-complete split of `outcome` by the labels of `group`
    pub fn from_dataset(dataset: &Dataset, group: &str, outcome: &str) -> Result<Self> {
        let labels = dataset.labels(group)?;
        let values = dataset.numeric(outcome)?;
        let mut names: Vec<String> = Vec::new();
        let mut split: Vec<Vec<f64>> = Vec::new();
        let mut dropped = 0usize;
        for (label, value) in labels.into_iter().zip(values) {
            let (Some(label), Some(value)) = (label, value) else {
                dropped += 1;
                continue;
            };
            match names.iter().position(|n| *n == label) {
                Some(i) => split[i].push(value),
                None => {
                    names.push(label);
                    split.push(vec![value]);
                }
            }
        }
        debug!(groups = names.len(), dropped, "split outcome by group");
        Ok(Self {
            names,
            values: split,
        })
    }

    pub fn from_parts(names: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "{} group names for {} groups",
                names.len(),
                values.len()
            )));
        }
        Ok(Self { names, values })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn total(&self) -> usize {
        self.values.iter().map(Vec::len).sum()
    }

    pub fn slices(&self) -> Vec<&[f64]> {
        self.values.iter().map(Vec::as_slice).collect()
    }

    /// Require exactly two groups
    pub fn expect_two(&self, test: &str) -> Result<(&[f64], &[f64])> {
        match self.values.as_slice() {
            [a, b] => Ok((a, b)),
            _ => Err(Error::InvalidInput(format!(
                "{test} requires exactly 2 groups, found {}",
                self.len()
            ))),
        }
    }
}

/// A single-observation group has an undefined (NaN) SD and SE
pub(crate) fn group_statistics(name: &str, values: &[f64]) -> Result<GroupStatistics> {
    let sd = match values.len() {
        1 => f64::NAN,
        _ => std_dev(values)?,
    };
    Ok(GroupStatistics {
        group: name.to_string(),
        n: values.len(),
        mean: round4(mean(values)?),
        std: round4(sd),
        se: round4(sd / (values.len() as f64).sqrt()),
    })
}

pub(crate) fn rank_group_statistics(name: &str, values: &[f64]) -> Result<RankGroupStatistics> {
    Ok(RankGroupStatistics {
        group: name.to_string(),
        n: values.len(),
        median: round4(median(values)?),
        iqr: round4(iqr(values)?),
    })
}
