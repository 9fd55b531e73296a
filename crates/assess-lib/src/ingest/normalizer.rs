//! Schema normalization into canonical VM records
//!
//! Never fails: missing sheets, columns or unparseable cells fall back to
//! field defaults, so downstream analyses always see fully-populated records.

use super::rules::{canonical, ColumnRules, Field, MemoryUnit};
use super::workbook::{cell_number, cell_text, is_blank, RawTable, Workbook};
use crate::models::{PowerState, SourceKind, VmRecord, VmSet};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Default vCPU count when the source has no CPU column
pub const DEFAULT_CPU_COUNT: u32 = 2;

/// Default memory in MB when the source has no memory column
pub const DEFAULT_MEMORY_MB: u64 = 4096;

/// OS label used when the source has none
pub const UNKNOWN_OS: &str = "Unknown";

/// Power-state tokens read as powered on (after lower-casing and stripping separators)
const POWERED_ON_TOKENS: &[&str] = &["started", "running", "on", "poweredon"];

/// Values below this maximum are assumed to be gigabytes
const MEMORY_GB_HEURISTIC_LIMIT: f64 = 1000.0;

/// Sheet names identifying an RVTools export
const RVTOOLS_SHEETS: &[&str] = &["vinfo", "vcpu", "vmemory"];

/// Sheet-name fragments identifying an Azure Migrate export
const AZURE_MIGRATE_FRAGMENTS: &[&str] = &["server", "machine", "assessment"];

/// Defaults applied to fields the source does not provide
#[derive(Debug, Clone)]
pub struct FieldDefaults {
    pub cpu_count: u32,
    pub memory_mb: u64,
    pub os: String,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            cpu_count: DEFAULT_CPU_COUNT,
            memory_mb: DEFAULT_MEMORY_MB,
            os: UNKNOWN_OS.to_string(),
        }
    }
}

/// Maps source tables onto the canonical VM record schema
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    defaults: FieldDefaults,
}

/// Columns resolved for one table
#[derive(Debug, Default)]
struct ResolvedColumns<'a> {
    id: Option<&'a str>,
    name: Option<&'a str>,
    cpu: Option<&'a str>,
    memory: Option<&'a str>,
    power: Option<&'a str>,
    os: Option<&'a str>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: FieldDefaults) -> Self {
        Self { defaults }
    }

    /// Normalize the inventory sheet of a workbook
    pub fn normalize(&self, workbook: &Workbook, kind: SourceKind) -> VmSet {
        match inventory_sheet(workbook, kind) {
            Some((sheet_name, table)) => self.normalize_table(sheet_name, table, kind),
            None => VmSet::default(),
        }
    }

    /// Normalize a single table
    pub fn normalize_table(&self, sheet_name: &str, table: &RawTable, kind: SourceKind) -> VmSet {
        let rules = ColumnRules::for_source(kind);
        let columns = table.columns();
        let resolved = ResolvedColumns {
            id: rules.resolve(Field::Id, columns),
            name: rules.resolve(Field::Name, columns),
            cpu: rules.resolve(Field::Cpu, columns),
            memory: rules.resolve(Field::Memory, columns),
            power: rules.resolve(Field::Power, columns),
            os: rules.resolve(Field::Os, columns),
        };

        debug!(
            sheet = %sheet_name,
            source = %kind,
            id_column = ?resolved.id,
            name_column = ?resolved.name,
            cpu_column = ?resolved.cpu,
            memory_column = ?resolved.memory,
            power_column = ?resolved.power,
            os_column = ?resolved.os,
            "Resolved inventory columns"
        );

        let rows: Vec<(usize, &Map<String, Value>)> = table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.values().all(is_blank))
            .collect();

        let memory_scale = resolved
            .memory
            .map(|column| memory_scale(column, rows.iter().map(|(_, row)| row.get(column))))
            .unwrap_or(1.0);

        rows.into_iter()
            .map(|(index, row)| self.record(sheet_name, index, row, &resolved, memory_scale))
            .collect()
    }

    fn record(
        &self,
        sheet_name: &str,
        index: usize,
        row: &Map<String, Value>,
        columns: &ResolvedColumns<'_>,
        memory_scale: f64,
    ) -> VmRecord {
        let text = |column: Option<&str>| column.and_then(|c| row.get(c)).and_then(cell_text);
        let number = |column: Option<&str>| column.and_then(|c| row.get(c)).and_then(cell_number);

        let name = text(columns.name);
        let id = text(columns.id)
            .or_else(|| name.clone())
            .unwrap_or_else(|| generated_id(sheet_name, index));
        let name = name.unwrap_or_else(|| id.clone());

        let cpu_count = number(columns.cpu)
            .map(|v| v.max(0.0).min(u32::MAX as f64) as u32)
            .unwrap_or(self.defaults.cpu_count);

        let memory_mb = number(columns.memory)
            .map(|v| (v * memory_scale).max(0.0).round() as u64)
            .unwrap_or(self.defaults.memory_mb);

        let power_state = match columns.power {
            Some(column) => parse_power_state(row.get(column).and_then(cell_text).as_deref()),
            None => PowerState::On,
        };

        let os = text(columns.os).unwrap_or_else(|| self.defaults.os.clone());

        VmRecord {
            id,
            name,
            cpu_count,
            memory_mb,
            power_state,
            os,
        }
    }
}

/// Map a power-state cell onto the on/off vocabulary
pub fn parse_power_state(value: Option<&str>) -> PowerState {
    let token: String = value
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect::<String>()
        .to_lowercase();

    if POWERED_ON_TOKENS.contains(&token.as_str()) {
        PowerState::On
    } else {
        PowerState::Off
    }
}

/// Multiplier that brings a memory column to megabytes
fn memory_scale<'a>(column: &str, values: impl Iterator<Item = Option<&'a Value>>) -> f64 {
    match MemoryUnit::from_column(column) {
        MemoryUnit::Megabytes => 1.0,
        MemoryUnit::Gigabytes => 1024.0,
        MemoryUnit::Undeclared => {
            let max = values
                .flatten()
                .filter_map(cell_number)
                .fold(f64::NEG_INFINITY, f64::max);
            if max > 0.0 && max < MEMORY_GB_HEURISTIC_LIMIT {
                debug!(column = %column, max_value = max, "Memory column read as gigabytes");
                1024.0
            } else {
                1.0
            }
        }
    }
}

/// Deterministic identifier for a row without a name or id
fn generated_id(sheet_name: &str, index: usize) -> String {
    let digest = Sha256::digest(format!("{}:{}", sheet_name, index).as_bytes());
    format!("vm-{}", &hex::encode(digest)[..12])
}

/// Guess the source kind of a workbook from its sheet names
pub fn detect_source(workbook: &Workbook) -> SourceKind {
    let names: Vec<String> = workbook.sheet_names().map(str::to_lowercase).collect();

    if names.iter().any(|n| RVTOOLS_SHEETS.contains(&n.as_str())) {
        SourceKind::Rvtools
    } else if names
        .iter()
        .any(|n| AZURE_MIGRATE_FRAGMENTS.iter().any(|f| n.contains(f)))
    {
        SourceKind::AzureMigrate
    } else {
        SourceKind::Generic
    }
}

/// Sheet holding the VM inventory for a source kind
pub fn inventory_sheet(workbook: &Workbook, kind: SourceKind) -> Option<(&str, &RawTable)> {
    let preferred = match kind {
        SourceKind::Rvtools => workbook.sheet("vInfo"),
        SourceKind::AzureMigrate => workbook.sheet_containing(AZURE_MIGRATE_FRAGMENTS),
        SourceKind::Generic => None,
    };
    preferred.or_else(|| workbook.first_sheet())
}

/// Sheet holding per-disk capacity rows, if the export has one
pub fn disk_sheet(workbook: &Workbook, kind: SourceKind) -> Option<(&str, &RawTable)> {
    match kind {
        SourceKind::Rvtools => workbook.sheet("vDisk"),
        SourceKind::AzureMigrate | SourceKind::Generic => workbook.sheet_containing(&["disk"]),
    }
}

impl From<&VmSet> for RawTable {
    /// Render the canonical table; normalizing it again yields the same set
    fn from(vms: &VmSet) -> Self {
        let rows = vms
            .iter()
            .map(|vm| {
                let mut row = Map::new();
                row.insert(canonical::ID.to_string(), Value::from(vm.id.clone()));
                row.insert(canonical::NAME.to_string(), Value::from(vm.name.clone()));
                row.insert(canonical::CPU_COUNT.to_string(), Value::from(vm.cpu_count));
                row.insert(canonical::MEMORY_MB.to_string(), Value::from(vm.memory_mb));
                let power = if vm.is_on() { "on" } else { "off" };
                row.insert(canonical::POWER_STATE.to_string(), Value::from(power));
                row.insert(canonical::OS.to_string(), Value::from(vm.os.clone()));
                row
            })
            .collect();
        RawTable::from_rows(rows)
    }
}

impl VmSet {
    /// Canonical table form of the set
    pub fn to_table(&self) -> RawTable {
        RawTable::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workbook(value: serde_json::Value) -> Workbook {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_rvtools_vinfo_normalization() {
        let wb = workbook(json!({
            "vInfo": [
                {"VM": "web-01", "Powerstate": "poweredOn", "CPUs": 2, "Memory": 4096, "OS according to the configuration file": "Ubuntu Linux (64-bit)"},
                {"VM": "db-01", "Powerstate": "poweredOff", "CPUs": 8, "Memory": 32768, "OS according to the configuration file": "Microsoft Windows Server 2019"}
            ],
            "vDisk": [{"VM": "web-01", "Capacity MB": 40960}]
        }));

        let vms = Normalizer::new().normalize(&wb, SourceKind::Rvtools);
        assert_eq!(vms.len(), 2);

        let web = &vms.as_slice()[0];
        assert_eq!(web.id, "web-01");
        assert_eq!(web.cpu_count, 2);
        assert_eq!(web.memory_mb, 4096);
        assert_eq!(web.power_state, PowerState::On);
        assert_eq!(web.os, "Ubuntu Linux (64-bit)");

        let db = &vms.as_slice()[1];
        assert_eq!(db.power_state, PowerState::Off);
        assert_eq!(db.memory_mb, 32768);
    }

    #[test]
    fn test_missing_columns_use_defaults() {
        let wb = workbook(json!({"Sheet1": [{"Server name": "app-01"}]}));
        let vms = Normalizer::new().normalize(&wb, SourceKind::Generic);
        let vm = &vms.as_slice()[0];

        assert_eq!(vm.name, "app-01");
        assert_eq!(vm.cpu_count, DEFAULT_CPU_COUNT);
        assert_eq!(vm.memory_mb, DEFAULT_MEMORY_MB);
        assert_eq!(vm.os, UNKNOWN_OS);
        assert_eq!(vm.power_state, PowerState::On);
    }

    #[test]
    fn test_unparseable_cells_use_defaults() {
        let wb = workbook(json!({"vInfo": [{"VM": "x", "CPUs": "many", "Memory": null, "OS": "  "}]}));
        let vm = Normalizer::new().normalize(&wb, SourceKind::Rvtools).as_slice()[0].clone();
        assert_eq!(vm.cpu_count, 2);
        assert_eq!(vm.memory_mb, 4096);
        assert_eq!(vm.os, "Unknown");
    }

    #[test]
    fn test_memory_in_gigabytes_is_scaled() {
        let wb = workbook(json!({"Servers": [
            {"Server name": "a", "Cores": 2, "Memory": 8},
            {"Server name": "b", "Cores": 4, "Memory": 16}
        ]}));
        let vms = Normalizer::new().normalize(&wb, SourceKind::AzureMigrate);
        let memory: Vec<u64> = vms.iter().map(|vm| vm.memory_mb).collect();
        assert_eq!(memory, vec![8192, 16384]);
    }

    #[test]
    fn test_declared_megabytes_are_not_scaled() {
        let wb = workbook(json!({"Servers": [{"Server name": "tiny", "Memory in MB": 512}]}));
        let vms = Normalizer::new().normalize(&wb, SourceKind::AzureMigrate);
        assert_eq!(vms.as_slice()[0].memory_mb, 512);
    }

    #[test]
    fn test_power_state_vocabulary() {
        assert_eq!(parse_power_state(Some("poweredOn")), PowerState::On);
        assert_eq!(parse_power_state(Some("Powered On")), PowerState::On);
        assert_eq!(parse_power_state(Some("RUNNING")), PowerState::On);
        assert_eq!(parse_power_state(Some("Started")), PowerState::On);
        assert_eq!(parse_power_state(Some("on")), PowerState::On);
        assert_eq!(parse_power_state(Some("suspended")), PowerState::Off);
        assert_eq!(parse_power_state(Some("poweredOff")), PowerState::Off);
        assert_eq!(parse_power_state(None), PowerState::Off);
    }

    #[test]
    fn test_unnamed_rows_get_stable_ids() {
        let wb = workbook(json!({"Sheet1": [{"CPUs": 2}, {"CPUs": 4}]}));
        let first = Normalizer::new().normalize(&wb, SourceKind::Generic);
        let second = Normalizer::new().normalize(&wb, SourceKind::Generic);

        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|vm| vm.id.as_str()).collect();
        assert!(ids[0].starts_with("vm-"));
        assert_eq!(ids[0].len(), 15);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(first.as_slice()[0].name, ids[0]);
    }

    #[test]
    fn test_blank_rows_and_empty_tables() {
        let wb = workbook(json!({"vInfo": [{"VM": "", "CPUs": null}, {"VM": "a"}]}));
        assert_eq!(Normalizer::new().normalize(&wb, SourceKind::Rvtools).len(), 1);

        assert!(Normalizer::new().normalize(&Workbook::new(), SourceKind::Rvtools).is_empty());
        let empty = workbook(json!({"vInfo": []}));
        assert!(Normalizer::new().normalize(&empty, SourceKind::Rvtools).is_empty());
    }

    #[test]
    fn test_negative_values_clamp_to_zero() {
        let wb = workbook(json!({"vInfo": [{"VM": "a", "CPUs": -4, "Memory": -1}]}));
        let vm = Normalizer::new().normalize(&wb, SourceKind::Rvtools).as_slice()[0].clone();
        assert_eq!(vm.cpu_count, 0);
        assert_eq!(vm.memory_mb, 0);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let wb = workbook(json!({"vInfo": [
            {"VM": "small", "Powerstate": "poweredOn", "CPUs": 1, "Memory": 512, "OS": "Linux"},
            {"Powerstate": "poweredOff", "CPUs": 2, "Memory": 768},
            {"VM": "big", "Powerstate": "weird", "CPUs": 32, "Memory": 900}
        ]}));
        let normalizer = Normalizer::new();
        let once = normalizer.normalize(&wb, SourceKind::Rvtools);
        let table = once.to_table();
        let twice = normalizer.normalize_table("vInfo", &table, SourceKind::Rvtools);
        assert_eq!(once, twice);

        let generic = normalizer.normalize_table("canonical", &table, SourceKind::Generic);
        assert_eq!(once, generic);
    }

    #[test]
    fn test_detect_source() {
        assert_eq!(detect_source(&workbook(json!({"vInfo": [], "vDisk": []}))), SourceKind::Rvtools);
        assert_eq!(
            detect_source(&workbook(json!({"All_Assessed_Machines": []}))),
            SourceKind::AzureMigrate
        );
        assert_eq!(detect_source(&workbook(json!({"Sheet1": []}))), SourceKind::Generic);
    }

    #[test]
    fn test_sheet_selection() {
        let wb = workbook(json!({"Summary": [], "Servers": [{"Server name": "a"}], "Disks": []}));
        assert_eq!(inventory_sheet(&wb, SourceKind::AzureMigrate).unwrap().0, "Servers");
        assert_eq!(inventory_sheet(&wb, SourceKind::Generic).unwrap().0, "Summary");
        assert_eq!(disk_sheet(&wb, SourceKind::AzureMigrate).unwrap().0, "Disks");
        assert!(disk_sheet(&wb, SourceKind::Rvtools).is_none());
    }
}
