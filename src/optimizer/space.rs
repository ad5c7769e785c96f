//! Parameter space
//!
//! Named axes with finite candidate values. Points are produced lazily as
//! the cartesian product of the axes, first axis varying slowest.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// One named parameter and its candidate values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterAxis {
    pub name: String,
    pub values: Vec<f64>,
}

impl ParameterAxis {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Evenly spaced values from `start` to `end` inclusive
    pub fn range(name: impl Into<String>, start: f64, end: f64, steps: usize) -> Self {
        let values = match steps {
            0 => Vec::new(),
            1 => vec![start],
            n => (0..n)
                .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
                .collect(),
        };
        Self::new(name, values)
    }
}

/// Ordered (name, value) assignment for one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterPoint(pub Vec<(String, f64)>);

impl ParameterPoint {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|(n, _)| n == name).map(|&(_, v)| v)
    }

    pub fn overrides(&self) -> &[(String, f64)] {
        &self.0
    }

    /// Sum of absolute differences over `names`, or every parameter when empty
    pub fn distance(&self, other: &ParameterPoint, names: &[String]) -> f64 {
        if names.is_empty() {
            return self
                .0
                .iter()
                .map(|(name, v)| (v - other.get(name).unwrap_or(*v)).abs())
                .sum();
        }
        names
            .iter()
            .filter_map(|name| Some((self.get(name)? - other.get(name)?).abs()))
            .sum()
    }

    /// Compact `name=value` rendering
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .map(|(name, v)| format!("{}={}", name, v))
            .join(" ")
    }
}

/// Cartesian parameter space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpace {
    pub axes: Vec<ParameterAxis>,
}

impl ParameterSpace {
    pub fn new(axes: Vec<ParameterAxis>) -> Self {
        Self { axes }
    }

    pub fn with_axis(mut self, axis: ParameterAxis) -> Self {
        self.axes.push(axis);
        self
    }

    /// Number of points: product of the axis cardinalities
    pub fn size(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.axes.iter().map(|a| a.name.as_str())
    }

    /// Reject axes without values or with duplicate names
    pub fn validate(&self) -> Result<()> {
        for (i, axis) in self.axes.iter().enumerate() {
            if axis.values.is_empty() {
                return Err(EngineError::EmptySearchSpace(format!(
                    "axis '{}' has no values",
                    axis.name
                )));
            }
            if self.axes[..i].iter().any(|a| a.name == axis.name) {
                return Err(EngineError::EmptySearchSpace(format!(
                    "axis '{}' appears more than once",
                    axis.name
                )));
            }
        }
        Ok(())
    }

    /// Lazy iterator over every point
    ///
    /// A space without axes has exactly one empty point.
    pub fn points(&self) -> Box<dyn Iterator<Item = ParameterPoint> + Send + '_> {
        if self.axes.is_empty() {
            return Box::new(std::iter::once(ParameterPoint(Vec::new())));
        }
        let names: Vec<&str> = self.names().collect();
        Box::new(
            self.axes
                .iter()
                .map(|a| a.values.iter().copied())
                .multi_cartesian_product()
                .map(move |values| {
                    ParameterPoint(
                        names
                            .iter()
                            .zip(values)
                            .map(|(name, v)| (name.to_string(), v))
                            .collect(),
                    )
                }),
        )
    }
}
