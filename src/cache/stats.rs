//! Read-only introspection over the registry.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Point-in-time counters for one namespace.
///
/// Expired entries that have not been swept or read yet are still counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NamespaceStats {
    pub entries: usize,
    pub total_access_count: u64,
}

/// Namespace name → counters, ordered by name.
pub type CacheStats = BTreeMap<String, NamespaceStats>;

/// Diagnostics for a single entry. Produced without evicting or counting a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub age: Duration,
    pub ttl: Duration,
    pub access_count: u64,
    pub since_last_access: Duration,
    pub expired: bool,
}

/// Stats plus totals, stamped with wall-clock time for reports.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub generated_at: String,
    pub total_entries: usize,
    pub total_access_count: u64,
    pub namespaces: CacheStats,
}

impl StatsReport {
    pub fn from_stats(namespaces: CacheStats) -> Self {
        Self::at(namespaces, OffsetDateTime::now_utc())
    }

    pub fn at(namespaces: CacheStats, generated_at: OffsetDateTime) -> Self {
        let total_entries = namespaces.values().map(|stats| stats.entries).sum();
        let total_access_count = namespaces
            .values()
            .map(|stats| stats.total_access_count)
            .sum();

        Self {
            generated_at: generated_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| generated_at.unix_timestamp().to_string()),
            total_entries,
            total_access_count,
            namespaces,
        }
    }

    /// True when no namespace holds any entry.
    pub fn is_empty(&self) -> bool {
        self.total_entries == 0
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries across {} namespaces ({} reads)",
            self.total_entries,
            self.namespaces.len(),
            self.total_access_count
        )?;
        for (name, stats) in &self.namespaces {
            write!(
                f,
                "; {name}: {}/{}",
                stats.entries, stats.total_access_count
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn sample() -> CacheStats {
        let mut stats = CacheStats::new();
        stats.insert(
            "bounds".to_string(),
            NamespaceStats {
                entries: 2,
                total_access_count: 5,
            },
        );
        stats.insert(
            "materials".to_string(),
            NamespaceStats {
                entries: 1,
                total_access_count: 0,
            },
        );
        stats
    }

    #[test]
    fn report_sums_namespaces() {
        let report = StatsReport::at(sample(), datetime!(2024-05-01 12:00 UTC));

        assert_eq!(report.total_entries, 3);
        assert_eq!(report.total_access_count, 5);
        assert_eq!(report.generated_at, "2024-05-01T12:00:00Z");
        assert!(!report.is_empty());
    }

    #[test]
    fn report_serializes_namespaces_by_name() {
        let report = StatsReport::at(sample(), datetime!(2024-05-01 12:00 UTC));
        let json = serde_json::to_value(&report).expect("serializable report");

        assert_eq!(json["namespaces"]["bounds"]["entries"], 2);
        assert_eq!(json["namespaces"]["materials"]["total_access_count"], 0);
        assert_eq!(json["total_entries"], 3);
    }

    #[test]
    fn display_lists_each_namespace() {
        let report = StatsReport::at(sample(), datetime!(2024-05-01 12:00 UTC));
        assert_eq!(
            report.to_string(),
            "3 entries across 2 namespaces (5 reads); bounds: 2/5; materials: 1/0"
        );
    }

    #[test]
    fn empty_report() {
        let report = StatsReport::from_stats(CacheStats::new());
        assert!(report.is_empty());
        assert_eq!(report.total_access_count, 0);
    }
}
