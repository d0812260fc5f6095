//! Pure builders turning aggregate rows into dashboard payloads.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::features::statistics::dtos::{
    ActionPeriod, ActiveUserDto, ChartDatasetDto, ChartDto, FlowGraphDto, FlowLinkDto,
    FlowNodeDto, FlowStatsDto, StorageBreakdownDto, UsersByServiceDto,
};
use crate::shared::mime::{storage_category, StorageCategory};

/// Months covered by the monthly charts, current month included
pub const CHART_MONTHS: u32 = 6;

/// (background, border) pairs cycled through by multi-series charts
const PALETTE: [(&str, &str); 5] = [
    ("#42A5F5", "#1E88E5"),
    ("#9CCC65", "#7CB342"),
    ("#FF7043", "#E64A19"),
    ("#7E57C2", "#5E35B1"),
    ("#EC407A", "#D81B60"),
];

const MONTHS_FR: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

pub type YearMonth = (i32, u32);

/// The last `count` calendar months, oldest first
pub fn last_months(now: DateTime<Utc>, count: u32) -> Vec<YearMonth> {
    let current = now.year() * 12 + now.month0() as i32;
    (0..count as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}

/// Midnight UTC on the first day of the oldest month in `months`
pub fn months_start(months: &[YearMonth]) -> Option<DateTime<Utc>> {
    let (year, month) = *months.first()?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

pub fn month_label(month: u32) -> &'static str {
    MONTHS_FR
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

pub fn month_labels(months: &[YearMonth]) -> Vec<String> {
    months.iter().map(|(_, m)| month_label(*m).to_string()).collect()
}

/// Counts aligned on `months`, zero where a month has no row
pub fn monthly_series(months: &[YearMonth], counts: &HashMap<YearMonth, i64>) -> Vec<i64> {
    months
        .iter()
        .map(|m| counts.get(m).copied().unwrap_or(0))
        .collect()
}

pub fn dataset(label: impl Into<String>, data: Vec<i64>, color: usize) -> ChartDatasetDto {
    let (background, border) = PALETTE[color % PALETTE.len()];
    ChartDatasetDto {
        label: label.into(),
        data,
        background_color: background.to_string(),
        border_color: border.to_string(),
        tension: 0.4,
    }
}

/// One series per action, in the order actions first appear in `rows`
pub fn actions_chart(months: &[YearMonth], rows: &[(i32, u32, String, i64)]) -> ChartDto {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, HashMap<YearMonth, i64>> = HashMap::new();
    for (year, month, action, count) in rows {
        if !counts.contains_key(action.as_str()) {
            order.push(action);
        }
        counts
            .entry(action)
            .or_default()
            .insert((*year, *month), *count);
    }

    let datasets = order
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let data = counts
                .get(action)
                .map(|c| monthly_series(months, c))
                .unwrap_or_else(|| vec![0; months.len()]);
            dataset(capitalize(action), data, i)
        })
        .collect();

    ChartDto {
        labels: month_labels(months),
        datasets,
    }
}

pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Sum stored bytes per family from `(mime type, bytes)` rows
pub fn storage_breakdown(rows: &[(String, i64)]) -> StorageBreakdownDto {
    let mut breakdown = StorageBreakdownDto::default();
    for (mime, bytes) in rows {
        let slot = match storage_category(mime) {
            StorageCategory::Images => &mut breakdown.images,
            StorageCategory::Videos => &mut breakdown.videos,
            StorageCategory::Audio => &mut breakdown.audio,
            StorageCategory::Documents => &mut breakdown.documents,
            StorageCategory::Archives => &mut breakdown.archives,
            StorageCategory::Autres => &mut breakdown.autres,
        };
        *slot += bytes;
    }
    breakdown
}

impl ActionPeriod {
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ActionPeriod::Day => now - Duration::days(1),
            ActionPeriod::Week => now - Duration::weeks(1),
            ActionPeriod::Month => now
                .checked_sub_months(chrono::Months::new(1))
                .unwrap_or(now - Duration::days(30)),
            ActionPeriod::Year => now
                .checked_sub_months(chrono::Months::new(12))
                .unwrap_or(now - Duration::days(365)),
        }
    }
}

/// Aggregated shares from one service to another for one mime type
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FlowRow {
    pub source_service_id: i64,
    pub source_service: String,
    pub dest_service_id: i64,
    pub dest_service: String,
    pub mime_type: String,
    pub total: i64,
    pub total_size: i64,
}

/// Service-to-service share graph: one node per service, one link per ordered pair
pub fn flow_graph(rows: &[FlowRow]) -> FlowGraphDto {
    let mut index_of: HashMap<i64, usize> = HashMap::new();
    let mut nodes: Vec<FlowNodeDto> = Vec::new();
    let mut node_for = |id: i64, label: &str, nodes: &mut Vec<FlowNodeDto>| -> usize {
        *index_of.entry(id).or_insert_with(|| {
            nodes.push(FlowNodeDto {
                id: nodes.len(),
                service_id: id,
                label: label.to_string(),
                node_type: "service".to_string(),
                size: 0,
                activity: 0,
            });
            nodes.len() - 1
        })
    };

    let mut links: Vec<FlowLinkDto> = Vec::new();
    let mut link_of: HashMap<(usize, usize), usize> = HashMap::new();

    for row in rows {
        let source = node_for(row.source_service_id, &row.source_service, &mut nodes);
        let target = node_for(row.dest_service_id, &row.dest_service, &mut nodes);

        nodes[source].activity += row.total;
        nodes[target].activity += row.total;

        let slot = *link_of.entry((source, target)).or_insert_with(|| {
            links.push(FlowLinkDto {
                source,
                target,
                value: 0,
                total_size: 0,
                types: Vec::new(),
                width: 0.0,
            });
            links.len() - 1
        });
        let link = &mut links[slot];
        link.value += row.total;
        link.total_size += row.total_size;
        if !link.types.contains(&row.mime_type) {
            link.types.push(row.mime_type.clone());
        }
    }

    for node in &mut nodes {
        node.size = 15 + node.activity * 2;
    }
    for link in &mut links {
        link.width = (1.0 + link.value as f64 * 0.5).min(10.0);
    }

    let stats = FlowStatsDto {
        total_flows: links.iter().map(|l| l.value).sum(),
        total_size: links.iter().map(|l| l.total_size).sum(),
        total_services: nodes.len(),
        total_connections: links.len(),
    };

    FlowGraphDto {
        nodes,
        links,
        stats,
    }
}

/// Group online users by service name, in order of first appearance
pub fn users_by_service(users: &[ActiveUserDto]) -> Vec<UsersByServiceDto> {
    let mut groups: Vec<UsersByServiceDto> = Vec::new();
    for user in users {
        match groups.iter_mut().find(|g| g.service == user.service_nom) {
            Some(group) => {
                group.count += 1;
                group.users.push(user.name.clone());
            }
            None => groups.push(UsersByServiceDto {
                service: user.service_nom.clone(),
                count: 1,
                users: vec![user.name.clone()],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_last_months_crosses_year() {
        let now = Utc.with_ymd_and_hms(2025, 2, 14, 10, 0, 0).unwrap();
        let months = last_months(now, CHART_MONTHS);
        assert_eq!(
            months,
            vec![(2024, 9), (2024, 10), (2024, 11), (2024, 12), (2025, 1), (2025, 2)]
        );
        assert_eq!(
            months_start(&months),
            Some(Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            month_labels(&months),
            vec!["Septembre", "Octobre", "Novembre", "Décembre", "Janvier", "Février"]
        );
    }

    #[test]
    fn test_monthly_series_fills_gaps() {
        let months = vec![(2025, 1), (2025, 2), (2025, 3)];
        let counts = HashMap::from([((2025, 1), 4), ((2025, 3), 7)]);
        assert_eq!(monthly_series(&months, &counts), vec![4, 0, 7]);
    }

    #[test]
    fn test_actions_chart_keeps_first_appearance_order() {
        let months = vec![(2025, 1), (2025, 2)];
        let rows = vec![
            (2025, 1, "shared".to_string(), 3),
            (2025, 1, "created".to_string(), 5),
            (2025, 2, "shared".to_string(), 1),
        ];
        let chart = actions_chart(&months, &rows);

        assert_eq!(chart.labels, vec!["Janvier", "Février"]);
        assert_eq!(chart.datasets.len(), 2);
        assert_eq!(chart.datasets[0].label, "Shared");
        assert_eq!(chart.datasets[0].data, vec![3, 1]);
        assert_eq!(chart.datasets[1].label, "Created");
        assert_eq!(chart.datasets[1].data, vec![5, 0]);
        assert_eq!(chart.datasets[1].background_color, "#9CCC65");
    }

    #[test]
    fn test_storage_breakdown() {
        let rows = vec![
            ("image/png".to_string(), 100),
            ("image/jpeg".to_string(), 50),
            ("application/pdf".to_string(), 30),
            ("application/zip".to_string(), 20),
            ("application/vnd.ms-powerpoint".to_string(), 5),
        ];
        let breakdown = storage_breakdown(&rows);
        assert_eq!(breakdown.images, 150);
        assert_eq!(breakdown.documents, 30);
        assert_eq!(breakdown.archives, 20);
        assert_eq!(breakdown.autres, 5);
        assert_eq!(breakdown.videos, 0);
    }

    #[test]
    fn test_action_period_start() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        assert_eq!(ActionPeriod::Day.start(now), now - Duration::days(1));
        assert_eq!(ActionPeriod::Week.start(now), now - Duration::days(7));
        assert_eq!(
            ActionPeriod::Month.start(now),
            Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap()
        );
        assert_eq!(
            ActionPeriod::Year.start(now),
            Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap()
        );
    }

    fn flow(source: i64, dest: i64, mime: &str, total: i64, size: i64) -> FlowRow {
        FlowRow {
            source_service_id: source,
            source_service: format!("S{}", source),
            dest_service_id: dest,
            dest_service: format!("S{}", dest),
            mime_type: mime.to_string(),
            total,
            total_size: size,
        }
    }

    #[test]
    fn test_flow_graph() {
        let rows = vec![
            flow(10, 20, "application/pdf", 2, 1000),
            flow(10, 20, "image/png", 1, 500),
            flow(20, 30, "application/pdf", 30, 9000),
        ];
        let graph = flow_graph(&rows);

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[0].service_id, 10);
        assert_eq!(graph.nodes[0].activity, 3);
        assert_eq!(graph.nodes[0].size, 21);
        assert_eq!(graph.nodes[1].activity, 33);

        assert_eq!(graph.links.len(), 2);
        assert_eq!(graph.links[0].value, 3);
        assert_eq!(graph.links[0].types, vec!["application/pdf", "image/png"]);
        assert_eq!(graph.links[0].width, 2.5);
        assert_eq!(graph.links[1].width, 10.0);

        assert_eq!(graph.stats.total_flows, 33);
        assert_eq!(graph.stats.total_size, 10500);
        assert_eq!(graph.stats.total_services, 3);
        assert_eq!(graph.stats.total_connections, 2);
    }

    #[test]
    fn test_users_by_service() {
        let user = |name: &str, service: &str| ActiveUserDto {
            id: 1,
            name: name.to_string(),
            email: format!("{}@example.com", name),
            service_id: None,
            service_nom: service.to_string(),
            last_activity: Utc::now(),
            status: "online".to_string(),
        };
        let groups = users_by_service(&[
            user("awa", "RH"),
            user("koffi", "Sans service"),
            user("yao", "RH"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].service, "RH");
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].users, vec!["awa", "yao"]);
    }
}
