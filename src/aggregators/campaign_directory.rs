use std::collections::HashMap;

use super::Campaign;
use crate::metrics::MetricRow;

/// One entry per campaign id with its cost summed across all rows, most
/// expensive first. The first row seen for an id supplies the display name.
/// Zero-cost campaigns are kept. Equal costs keep first-seen order.
pub fn build_campaign_directory(rows: &[MetricRow]) -> Vec<Campaign> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut campaigns: Vec<Campaign> = Vec::new();

    for row in rows {
        let id = row.campaign_id();
        match positions.get(id) {
            Some(&idx) => campaigns[idx].total_cost += row.counters.cost,
            None => {
                positions.insert(id, campaigns.len());
                campaigns.push(Campaign {
                    id: id.to_string(),
                    name: row.identity.name.clone(),
                    total_cost: row.counters.cost,
                });
            }
        }
    }

    campaigns.sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));
    campaigns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{Counters, RowIdentity};

    fn row(id: &str, name: &str, date: &str, cost: f64) -> MetricRow {
        MetricRow::new(
            RowIdentity::campaign_day(name, id, date),
            Counters {
                cost,
                ..Default::default()
            },
        )
    }

    #[test]
    fn sums_cost_and_sorts_descending() {
        let directory = build_campaign_directory(&[
            row("A", "Alpha", "2024-05-01", 5.0),
            row("A", "Alpha", "2024-05-02", 3.0),
            row("B", "Beta", "2024-05-01", 10.0),
        ]);

        assert_eq!(
            directory,
            vec![
                Campaign { id: "B".into(), name: "Beta".into(), total_cost: 10.0 },
                Campaign { id: "A".into(), name: "Alpha".into(), total_cost: 8.0 },
            ]
        );
    }

    #[test]
    fn first_occurrence_names_the_campaign() {
        let directory = build_campaign_directory(&[
            row("A", "Old name", "2024-05-01", 1.0),
            row("A", "Renamed", "2024-05-02", 1.0),
        ]);
        assert_eq!(directory.len(), 1);
        assert_eq!(directory[0].name, "Old name");
    }

    #[test]
    fn zero_cost_campaigns_rank_last() {
        let directory = build_campaign_directory(&[
            row("Z", "Paused", "2024-05-01", 0.0),
            row("A", "Alpha", "2024-05-01", 0.01),
        ]);
        assert_eq!(directory.last().unwrap().id, "Z");
        assert_eq!(directory.len(), 2);
    }
}
