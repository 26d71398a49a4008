use std::collections::HashMap;

use crate::error::{Result, StatsError};
use crate::season_data::{ID_COLUMNS, Metric};

const SPECIAL_LABELS: &[(&str, &str)] = &[
    ("ict_index", "ICT Index"),
    ("ppm", "Points per Million"),
];

/// Column name <-> display label.
///
/// Identifier columns get a label but are not selectable as plot metrics.
#[derive(Debug, Clone)]
pub struct LabelTable {
    labels: HashMap<String, String>,
    selectable: Vec<(String, String)>,
    by_label: HashMap<String, String>,
}

impl LabelTable {
    pub fn build<S: AsRef<str>>(columns: &[S]) -> Result<Self> {
        let mut labels = HashMap::with_capacity(columns.len());
        let mut owners: HashMap<String, String> = HashMap::with_capacity(columns.len());
        let mut selectable = Vec::new();
        let mut by_label = HashMap::new();

        for column in columns {
            let column = column.as_ref();
            let label = label_for_column(column);
            if let Some(prev) = owners.insert(label.to_lowercase(), column.to_string()) {
                if prev != column {
                    return Err(StatsError::Config(format!(
                        "duplicate label {label:?} for columns {prev:?} and {column:?}"
                    )));
                }
                continue;
            }
            labels.insert(column.to_string(), label.clone());
            if !ID_COLUMNS.contains(&column) {
                by_label.insert(label.to_lowercase(), column.to_string());
                selectable.push((label, column.to_string()));
            }
        }

        Ok(Self {
            labels,
            selectable,
            by_label,
        })
    }

    pub fn label(&self, column: &str) -> Option<&str> {
        self.labels.get(column).map(String::as_str)
    }

    pub fn metric_label(&self, metric: Metric) -> &str {
        self.label(metric.column()).unwrap_or(metric.column())
    }

    /// Reverse lookup, limited to selectable columns.
    pub fn column(&self, label: &str) -> Option<&str> {
        self.by_label
            .get(&label.trim().to_lowercase())
            .map(String::as_str)
    }

    /// (label, column) pairs in column order; menu numbering starts at 1.
    pub fn selectable(&self) -> &[(String, String)] {
        &self.selectable
    }

    /// Accepts a 1-based menu index, a display label or a column name.
    pub fn resolve(&self, input: &str) -> Result<Metric> {
        let input = input.trim();
        let column = if let Ok(idx) = input.parse::<usize>() {
            idx.checked_sub(1)
                .and_then(|i| self.selectable.get(i))
                .map(|(_, column)| column.as_str())
        } else if let Some(column) = self.column(input) {
            Some(column)
        } else {
            self.selectable
                .iter()
                .find(|(_, column)| column == input)
                .map(|(_, column)| column.as_str())
        };
        column
            .and_then(Metric::from_column)
            .ok_or_else(|| StatsError::malformed(format!("unknown metric {input:?}")))
    }
}

pub fn label_for_column(column: &str) -> String {
    if let Some((_, label)) = SPECIAL_LABELS.iter().find(|(c, _)| *c == column) {
        return (*label).to_string();
    }
    if column.contains('_') {
        return column
            .split('_')
            .filter(|word| !word.is_empty())
            .map(title_case)
            .collect::<Vec<_>>()
            .join(" ");
    }
    title_case(column)
}

/// Upper-cases the first letter of each alphabetic run and lower-cases the rest.
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut prev_alpha = false;
    for ch in word.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season_data::season_columns;

    #[test]
    fn labels_follow_naming_rules() {
        assert_eq!(label_for_column("goals_scored"), "Goals Scored");
        assert_eq!(label_for_column("minutes"), "Minutes");
        assert_eq!(label_for_column("ict_index"), "ICT Index");
        assert_eq!(label_for_column("ppm"), "Points per Million");
        assert_eq!(label_for_column("opponent_team"), "Opponent Team");
    }

    #[test]
    fn identifier_columns_are_not_selectable() {
        let table = LabelTable::build(&season_columns()).unwrap();
        assert_eq!(table.selectable().len(), 18);
        assert_eq!(table.label("second_name"), Some("Second Name"));
        assert_eq!(table.column("Second Name"), None);
        assert_eq!(table.column("Round"), None);
        assert_eq!(table.selectable()[0].0, "Total Points");
    }

    #[test]
    fn collision_fails_fast() {
        let err = LabelTable::build(&["goals_scored", "goals__scored"]).unwrap_err();
        assert!(matches!(err, StatsError::Config(_)));
    }

    #[test]
    fn resolve_accepts_index_label_and_column() {
        let table = LabelTable::build(&season_columns()).unwrap();
        assert_eq!(table.resolve("3").unwrap(), Metric::GoalsScored);
        assert_eq!(table.resolve("ict index").unwrap(), Metric::IctIndex);
        assert_eq!(table.resolve("ppm").unwrap(), Metric::Ppm);
        assert!(table.resolve("0").is_err());
        assert!(table.resolve("19").is_err());
        assert!(table.resolve("team").is_err());
    }
}
