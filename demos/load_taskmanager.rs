//! Task manager loader
//!
//! Provisions a table and loads the task manager dataset into it: tasks,
//! then offices, then employees, three writes in flight per collection.
//!
//! ```text
//! cargo run --example load_taskmanager -- [dataset.json] [loader.json]
//! ```
//!
//! Defaults to `demos/data/taskmanager.json` and the built-in configuration.

use std::sync::Arc;

use anyhow::Context;
use bulkload::dataset::Dataset;
use bulkload::loader::{LoadCoordinator, LoadPlan};
use bulkload::record::Record;
use bulkload::store::MemoryTable;
use bulkload::{BatchWriter, LoadError, LoaderConfig};
use serde::{Deserialize, Serialize};

const DEFAULT_DATASET: &str = "demos/data/taskmanager.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskItem {
    task: String,
    project: String,
    employee: String,
    description: String,
    status: String,
    points: u32,
}

impl Record for TaskItem {
    const ENTITY: &'static str = "task";

    fn record_key(&self) -> String {
        format!("{}#{}", self.project, self.task)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfficeItem {
    office: String,
    country: String,
    state: String,
    city: String,
    zip: String,
    address: String,
}

impl Record for OfficeItem {
    const ENTITY: &'static str = "office";

    fn record_key(&self) -> String {
        format!("{}#{}#{}", self.country, self.state, self.office)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeItem {
    employee: String,
    first_name: String,
    last_name: String,
    office: String,
    title: String,
    team: String,
    salary: String,
    manager: String,
    date_hired: String,
    birthday: String,
}

impl Record for EmployeeItem {
    const ENTITY: &'static str = "employee";

    fn record_key(&self) -> String {
        self.employee.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("bulkload=info,load_taskmanager=info")
        .init();

    let mut args = std::env::args().skip(1);
    let dataset_path = args.next().unwrap_or_else(|| DEFAULT_DATASET.to_string());
    let config = match args.next() {
        Some(path) => LoaderConfig::from_path(&path)
            .with_context(|| format!("reading loader config {}", path))?,
        None => LoaderConfig::default(),
    };

    let dataset = Dataset::from_path(&dataset_path)
        .with_context(|| format!("reading dataset {}", dataset_path))?;
    let tasks: Vec<TaskItem> = dataset.records("tasks")?;
    let offices: Vec<OfficeItem> = dataset.records("offices")?;
    let employees: Vec<EmployeeItem> = dataset.records("employees")?;

    let table = Arc::new(MemoryTable::new(config.table_name.clone()));
    let plan = LoadPlan::new()
        .add_with_writer(
            tasks,
            BatchWriter::<TaskItem>::from_config(table.clone(), &config),
        )
        .add_with_writer(
            offices,
            BatchWriter::<OfficeItem>::from_config(table.clone(), &config),
        )
        .add_with_writer(
            employees,
            BatchWriter::<EmployeeItem>::from_config(table.clone(), &config),
        );

    let coordinator = LoadCoordinator::new(table.clone());
    match coordinator.load(plan).await {
        Ok(report) => {
            println!("{}", report.to_json_pretty()?);
            println!(
                "Loaded {} of {} items into table {}",
                report.total_succeeded(),
                report.total_records(),
                table.name()
            );
            Ok(())
        }
        Err(LoadError::Unrecoverable { error, report }) => {
            eprintln!("{}", report.to_json_pretty()?);
            Err(error).context("load aborted")
        }
        Err(e) => Err(e).context("load failed"),
    }
}
