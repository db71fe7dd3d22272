use crate::workflows::eligibility::features::{FeatureVector, FEATURE_COUNT};

/// Quantile bin edges for one feature column.
///
/// A value falls in bin `b` when it is greater than every edge before `b` and at most
/// edge `b`, so "bin <= b" and "value <= edge(b)" select the same rows.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FeatureBins {
    edges: Vec<f64>,
}

impl FeatureBins {
    pub(crate) fn fit(values: &[f64], max_bins: usize) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mut distinct: Vec<(f64, usize)> = Vec::new();
        for value in sorted {
            match distinct.last_mut() {
                Some((last, count)) if *last == value => *count += 1,
                _ => distinct.push((value, 1)),
            }
        }

        if distinct.len() < 2 || max_bins < 2 {
            return Self { edges: Vec::new() };
        }

        let mut edges = if distinct.len() <= max_bins {
            distinct
                .windows(2)
                .map(|pair| midpoint(pair[0].0, pair[1].0))
                .collect::<Vec<_>>()
        } else {
            let per_bin = values.len() as f64 / max_bins as f64;
            let mut edges = Vec::with_capacity(max_bins - 1);
            let mut seen = 0usize;
            let mut next_cut = per_bin;
            for pair in distinct.windows(2) {
                seen += pair[0].1;
                if seen as f64 >= next_cut {
                    edges.push(midpoint(pair[0].0, pair[1].0));
                    while next_cut <= seen as f64 {
                        next_cut += per_bin;
                    }
                }
            }
            edges
        };
        edges.dedup();

        Self { edges }
    }

    pub(crate) fn bin(&self, value: f64) -> usize {
        self.edges.partition_point(|&edge| edge < value)
    }

    pub(crate) fn bin_count(&self) -> usize {
        self.edges.len() + 1
    }

    /// Upper edge of `bin`; rows routed left by a split at `bin` satisfy `value <= edge`.
    pub(crate) fn edge(&self, bin: usize) -> f64 {
        self.edges[bin]
    }
}

fn midpoint(low: f64, high: f64) -> f64 {
    low / 2.0 + high / 2.0
}

/// Column-major binned copy of a training matrix.
pub(crate) struct BinnedMatrix {
    bins: Vec<FeatureBins>,
    columns: Vec<Vec<u16>>,
}

impl BinnedMatrix {
    pub(crate) fn build(rows: &[FeatureVector], max_bins: usize) -> Self {
        let mut bins = Vec::with_capacity(FEATURE_COUNT);
        let mut columns = Vec::with_capacity(FEATURE_COUNT);

        for feature in 0..FEATURE_COUNT {
            let raw: Vec<f64> = rows.iter().map(|row| row.values()[feature]).collect();
            let feature_bins = FeatureBins::fit(&raw, max_bins);
            let column = raw
                .iter()
                .map(|value| feature_bins.bin(*value) as u16)
                .collect();
            bins.push(feature_bins);
            columns.push(column);
        }

        Self { bins, columns }
    }

    pub(crate) fn bin_count(&self, feature: usize) -> usize {
        self.bins[feature].bin_count()
    }

    pub(crate) fn edge(&self, feature: usize, bin: usize) -> f64 {
        self.bins[feature].edge(bin)
    }

    pub(crate) fn column(&self, feature: usize) -> &[u16] {
        &self.columns[feature]
    }
}
