//! Declarative column resolution rules per source kind
//!
//! Each canonical field carries a list of matchers in priority order. For
//! every matcher the columns are scanned in table order; the first hit wins.

use crate::models::SourceKind;

/// A single column-name predicate, always case-insensitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Exact(&'static str),
    Contains(&'static str),
}

impl Matcher {
    pub fn matches(&self, column: &str) -> bool {
        match self {
            Matcher::Exact(name) => column.trim().eq_ignore_ascii_case(name),
            Matcher::Contains(fragment) => column.to_lowercase().contains(fragment),
        }
    }
}

/// Canonical VM record fields resolved from source columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Name,
    Cpu,
    Memory,
    Power,
    Os,
}

/// Canonical column names, as written by `RawTable::from(&VmSet)`
pub mod canonical {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const CPU_COUNT: &str = "cpu_count";
    pub const MEMORY_MB: &str = "memory_mb";
    pub const POWER_STATE: &str = "power_state";
    pub const OS: &str = "os";
}

/// Matcher lists for every canonical field
#[derive(Debug)]
pub struct ColumnRules {
    pub id: &'static [Matcher],
    pub name: &'static [Matcher],
    pub cpu: &'static [Matcher],
    pub memory: &'static [Matcher],
    pub power: &'static [Matcher],
    pub os: &'static [Matcher],
}

use Matcher::{Contains, Exact};

static RVTOOLS_RULES: ColumnRules = ColumnRules {
    id: &[Exact(canonical::ID), Exact("VM UUID"), Exact("UUID")],
    name: &[Exact(canonical::NAME), Exact("VM"), Contains("name")],
    cpu: &[
        Exact(canonical::CPU_COUNT),
        Exact("CPUs"),
        Contains("cpu"),
        Contains("core"),
    ],
    memory: &[
        Exact(canonical::MEMORY_MB),
        Exact("Memory"),
        Contains("memory"),
        Contains("ram"),
    ],
    power: &[Exact(canonical::POWER_STATE), Exact("Powerstate"), Contains("power")],
    os: &[
        Exact(canonical::OS),
        Exact("OS according to the configuration file"),
        Exact("OS according to the VMware Tools"),
        Exact("OS"),
        Contains("operating system"),
    ],
};

static AZURE_MIGRATE_RULES: ColumnRules = ColumnRules {
    id: &[Exact(canonical::ID), Exact("Machine ID"), Exact("Server ID")],
    name: &[
        Exact(canonical::NAME),
        Exact("Server name"),
        Exact("Machine name"),
        Exact("Display name"),
        Exact("ServerName"),
        Exact("MachineName"),
        Contains("name"),
    ],
    cpu: &[
        Exact(canonical::CPU_COUNT),
        Exact("Cores"),
        Exact("CPU cores"),
        Exact("vCPUs"),
        Contains("core"),
        Contains("cpu"),
    ],
    memory: &[
        Exact(canonical::MEMORY_MB),
        Exact("Memory in MB"),
        Exact("RAM (MB)"),
        Exact("Memory"),
        Contains("memory"),
        Contains("ram"),
    ],
    power: &[
        Exact(canonical::POWER_STATE),
        Contains("power"),
        Contains("status"),
    ],
    os: &[
        Exact(canonical::OS),
        Exact("Operating system"),
        Exact("OS"),
        Contains("operating system"),
    ],
};

static GENERIC_RULES: ColumnRules = ColumnRules {
    id: &[
        Exact(canonical::ID),
        Exact("VM UUID"),
        Exact("UUID"),
        Exact("Machine ID"),
        Exact("Server ID"),
    ],
    name: &[
        Exact(canonical::NAME),
        Exact("VM"),
        Exact("Server name"),
        Exact("Machine name"),
        Exact("Display name"),
        Contains("name"),
    ],
    cpu: &[
        Exact(canonical::CPU_COUNT),
        Exact("CPUs"),
        Exact("Cores"),
        Exact("vCPUs"),
        Contains("cpu"),
        Contains("core"),
    ],
    memory: &[
        Exact(canonical::MEMORY_MB),
        Exact("Memory"),
        Exact("Memory in MB"),
        Exact("RAM (MB)"),
        Contains("memory"),
        Contains("ram"),
    ],
    power: &[
        Exact(canonical::POWER_STATE),
        Exact("Powerstate"),
        Contains("power"),
        Contains("status"),
    ],
    os: &[
        Exact(canonical::OS),
        Exact("OS according to the configuration file"),
        Exact("Operating system"),
        Exact("OS"),
        Contains("operating system"),
        Contains("guest os"),
    ],
};

impl ColumnRules {
    pub fn for_source(kind: SourceKind) -> &'static ColumnRules {
        match kind {
            SourceKind::Rvtools => &RVTOOLS_RULES,
            SourceKind::AzureMigrate => &AZURE_MIGRATE_RULES,
            SourceKind::Generic => &GENERIC_RULES,
        }
    }

    pub fn matchers(&self, field: Field) -> &'static [Matcher] {
        match field {
            Field::Id => self.id,
            Field::Name => self.name,
            Field::Cpu => self.cpu,
            Field::Memory => self.memory,
            Field::Power => self.power,
            Field::Os => self.os,
        }
    }

    /// Resolve the source column for a field
    pub fn resolve<'a>(&self, field: Field, columns: &'a [String]) -> Option<&'a str> {
        resolve_column(self.matchers(field), columns)
    }
}

/// First column hit by the highest-priority matcher
pub fn resolve_column<'a>(matchers: &[Matcher], columns: &'a [String]) -> Option<&'a str> {
    matchers.iter().find_map(|matcher| {
        columns
            .iter()
            .find(|column| matcher.matches(column))
            .map(String::as_str)
    })
}

/// Unit a memory column declares in its header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryUnit {
    Megabytes,
    Gigabytes,
    Undeclared,
}

impl MemoryUnit {
    pub fn from_column(column: &str) -> Self {
        let lower = column.to_lowercase();
        if lower.contains("gib") || lower.contains("gb") {
            MemoryUnit::Gigabytes
        } else if lower.contains("mib") || lower.contains("mb") {
            MemoryUnit::Megabytes
        } else {
            MemoryUnit::Undeclared
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let columns = cols(&["Overall Cpu Readiness", "CPUs", "Memory"]);
        let rules = ColumnRules::for_source(SourceKind::Rvtools);
        assert_eq!(rules.resolve(Field::Cpu, &columns), Some("CPUs"));
    }

    #[test]
    fn test_substring_fallback_in_column_order() {
        let columns = cols(&["Host", "Num cores", "vCPU count"]);
        let rules = ColumnRules::for_source(SourceKind::Rvtools);
        // "cpu" outranks "core" regardless of column position
        assert_eq!(rules.resolve(Field::Cpu, &columns), Some("vCPU count"));
    }

    #[test]
    fn test_host_column_is_not_mistaken_for_os() {
        let columns = cols(&["Host", "VM"]);
        let rules = ColumnRules::for_source(SourceKind::Generic);
        assert_eq!(rules.resolve(Field::Os, &columns), None);
    }

    #[test]
    fn test_azure_migrate_name_priority() {
        let columns = cols(&["Host name", "Display name", "Server name"]);
        let rules = ColumnRules::for_source(SourceKind::AzureMigrate);
        assert_eq!(rules.resolve(Field::Name, &columns), Some("Server name"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let columns = cols(&["powerstate", "MEMORY IN MB"]);
        let rules = ColumnRules::for_source(SourceKind::Generic);
        assert_eq!(rules.resolve(Field::Power, &columns), Some("powerstate"));
        assert_eq!(rules.resolve(Field::Memory, &columns), Some("MEMORY IN MB"));
    }

    #[test]
    fn test_memory_unit_from_header() {
        assert_eq!(MemoryUnit::from_column("Memory in MB"), MemoryUnit::Megabytes);
        assert_eq!(MemoryUnit::from_column("memory_mb"), MemoryUnit::Megabytes);
        assert_eq!(MemoryUnit::from_column("RAM (GiB)"), MemoryUnit::Gigabytes);
        assert_eq!(MemoryUnit::from_column("Memory"), MemoryUnit::Undeclared);
    }
}
