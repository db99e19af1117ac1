use serde::Serialize;

/// Descriptive statistics over a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub stddev: f64,
    /// `None` when any sample is zero or negative.
    pub geomean: Option<f64>,
    pub median: f64,
}

impl Summary {
    /// Returns `None` for fewer than two samples.
    pub fn from_samples(samples: &[f64]) -> Option<Summary> {
        let n = samples.len();
        if n < 2 {
            return None;
        }

        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;

        let geomean = samples
            .iter()
            .all(|x| *x > 0.0)
            .then(|| (samples.iter().map(|x| x.ln()).sum::<f64>() / n as f64).exp());

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Some(Summary {
            mean,
            stddev: var.sqrt(),
            geomean,
            median,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn too_few_samples() {
        assert_eq!(Summary::from_samples(&[]), None);
        assert_eq!(Summary::from_samples(&[3.0]), None);
    }

    #[test]
    fn basic_stats() {
        let s = Summary::from_samples(&[1.0, 2.0, 4.0, 8.0]).unwrap();
        assert!(close(s.mean, 3.75));
        assert!(close(s.median, 3.0));
        assert!(close(s.geomean.unwrap(), 64f64.powf(0.25)));
        // sample variance: (7.5625 + 3.0625 + 0.0625 + 18.0625) / 3
        assert!(close(s.stddev, (28.75f64 / 3.0).sqrt()));
    }

    #[test]
    fn odd_median_and_non_positive_geomean() {
        let s = Summary::from_samples(&[5.0, -1.0, 0.0]).unwrap();
        assert!(close(s.median, 0.0));
        assert_eq!(s.geomean, None);
    }
}
