//! Forward-scan accumulators
//!
//! Calculators walk a frame sequence once, in order. Extremum ties keep the
//! first occurrence.

use crate::RepresentativeFrame;

/// Direction of an extremum search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

/// Tracks the most extreme value seen and where it occurred
#[derive(Debug, Clone, Copy)]
pub struct Extremum {
    kind: Extreme,
    best: Option<(f64, usize, usize)>,
}

impl Extremum {
    pub fn min() -> Self {
        Self {
            kind: Extreme::Min,
            best: None,
        }
    }

    pub fn max() -> Self {
        Self {
            kind: Extreme::Max,
            best: None,
        }
    }

    /// Offer a value observed at sequence `position` / video `frame_index`
    pub fn observe(&mut self, value: f64, position: usize, frame_index: usize) {
        if !value.is_finite() {
            return;
        }
        let better = match self.best {
            None => true,
            Some((best, _, _)) => match self.kind {
                Extreme::Min => value < best,
                Extreme::Max => value > best,
            },
        };
        if better {
            self.best = Some((value, position, frame_index));
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.best.map(|(v, _, _)| v)
    }

    pub fn position(&self) -> Option<usize> {
        self.best.map(|(_, p, _)| p)
    }

    /// Representative frame for snapshotting
    pub fn frame(&self, label: &str) -> Option<RepresentativeFrame> {
        self.best.map(|(value, position, frame_index)| RepresentativeFrame {
            label: label.to_string(),
            position,
            frame_index,
            value,
        })
    }
}

/// Running mean of finite samples
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    pub fn push(&mut self, value: f64) {
        if value.is_finite() {
            self.sum += value;
            self.count += 1;
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Arithmetic mean of a slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population variance of a slice
pub fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64)
}

/// Population standard deviation of a slice
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}
