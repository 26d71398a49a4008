use std::collections::BTreeMap;

use crate::error::{Result, StatsError};
use crate::names::PlayerName;
use crate::season_data::{GameweekRow, Metric, MetricValues};

/// Upper bound of the radar axes.
pub const RADAR_SCALE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub id: u32,
    pub name: String,
    pub appearances: usize,
    pub values: MetricValues,
}

impl PlayerSummary {
    pub fn value(&self, metric: Metric) -> f64 {
        self.values.get(metric)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub player: String,
    pub scores: Vec<f64>,
}

/// One summary row per player id, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct SummaryTable {
    rows: Vec<PlayerSummary>,
}

/// Groups rows by player id. Counting metrics are summed over the group and
/// rate metrics averaged; summed values are not normalised by games played.
pub fn aggregate(rows: &[GameweekRow]) -> SummaryTable {
    let mut groups: BTreeMap<u32, Vec<&GameweekRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.id).or_default().push(row);
    }

    let summaries = groups
        .into_iter()
        .filter_map(|(id, group)| {
            let first = group.first()?;
            let count = group.len() as f64;
            let mut values = MetricValues::default();
            for metric in Metric::ALL {
                let total: f64 = group.iter().map(|row| row.metric(metric)).sum();
                let value = if metric.is_mean_aggregated() {
                    total / count
                } else {
                    total
                };
                values.set(metric, value);
            }
            Some(PlayerSummary {
                id,
                name: first.display_name(),
                appearances: group.len(),
                values,
            })
        })
        .collect();

    SummaryTable { rows: summaries }
}

impl SummaryTable {
    pub fn rows(&self) -> &[PlayerSummary] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn by_id(&self, id: u32) -> Option<&PlayerSummary> {
        self.rows
            .binary_search_by_key(&id, |row| row.id)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn by_name(&self, name: &PlayerName) -> Option<&PlayerSummary> {
        let wanted = format!("{} {}", name.first, name.last);
        self.rows.iter().find(|row| row.name == wanted)
    }

    pub fn column_max(&self, metric: Metric) -> Option<f64> {
        self.rows
            .iter()
            .map(|row| row.value(metric))
            .reduce(f64::max)
    }

    /// Scores each metric on a 0..=5 scale relative to the best player in the table.
    pub fn radar_scores(&self, name: &PlayerName, metrics: &[Metric]) -> Result<RadarSeries> {
        let Some(summary) = self.by_name(name) else {
            return Err(StatsError::NotFound {
                name: name.display(),
            });
        };
        let scores = metrics
            .iter()
            .map(|metric| {
                let max = self.column_max(*metric).unwrap_or_default();
                if max <= 0.0 {
                    0.0
                } else {
                    summary.value(*metric) * RADAR_SCALE / max
                }
            })
            .collect();
        Ok(RadarSeries {
            player: summary.name.clone(),
            scores,
        })
    }
}
