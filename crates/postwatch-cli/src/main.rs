//! postwatch operator CLI
//!
//! Command-line interface for querying the collector's latest-state
//! endpoints; renders reports as an aligned table or CSV.

use clap::{Parser, Subcommand};
use color_eyre::Result;

use postwatch_api::{ReportFilter, ReportRecord};
use postwatch_client::{ClientError, CollectorClient};

#[derive(Parser)]
#[command(name = "postwatch-cli")]
#[command(about = "Query endpoint posture reports from the collector", long_about = None)]
struct Cli {
    /// Collector base URL
    #[arg(
        long,
        global = true,
        env = "POSTWATCH_COLLECTOR_URL",
        default_value = "http://127.0.0.1:5000"
    )]
    collector_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Latest report for every known device
    Reports {
        /// Emit CSV instead of a table
        #[arg(long)]
        csv: bool,
    },
    /// Latest report for one device
    Device {
        /// Device identifier
        device_id: String,
    },
    /// Latest reports filtered by posture values
    Filter {
        /// Exact-match filter on the OS update field
        #[arg(long)]
        os_update: Option<String>,
        /// Exact-match filter on the disk encryption field
        #[arg(long)]
        disk_encryption: Option<String>,
        /// Emit CSV instead of a table
        #[arg(long)]
        csv: bool,
    },
    /// Collector health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let client = CollectorClient::new(&cli.collector_url)?;

    match cli.command {
        Commands::Reports { csv } => {
            let records = client.latest_all().await?;
            print_records(&records, csv);
        }
        Commands::Device { device_id } => match client.latest(&device_id).await {
            Ok(record) => print_records(std::slice::from_ref(&record), false),
            Err(ClientError::NotFound(device_id)) => {
                eprintln!("no reports for device: {device_id}");
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Filter {
            os_update,
            disk_encryption,
            csv,
        } => {
            let filter = ReportFilter {
                os_update,
                disk_encryption,
            };
            let records = client.latest_filtered(&filter).await?;
            print_records(&records, csv);
        }
        Commands::Health => {
            let health = client.health().await?;
            println!("{} (collector v{})", health.status, health.version);
        }
    }

    Ok(())
}

fn print_records(records: &[ReportRecord], csv: bool) {
    if csv {
        print!("{}", render_csv(records));
    } else if records.is_empty() {
        println!("no reports found");
    } else {
        print!("{}", render_table(records));
    }
}

const HEADERS: [&str; 7] = [
    "ID",
    "DEVICE",
    "OBSERVED AT",
    "DISK ENCRYPTION",
    "OS UPDATE",
    "ANTIVIRUS",
    "SLEEP",
];

fn record_cells(record: &ReportRecord) -> [String; 7] {
    [
        record.id.to_string(),
        record.device_id.clone(),
        record.observed_at.to_rfc3339(),
        record.disk_encryption.clone(),
        record.os_update.clone(),
        record.antivirus.clone(),
        record.sleep_settings.clone(),
    ]
}

fn render_table(records: &[ReportRecord]) -> String {
    let rows: Vec<[String; 7]> = records.iter().map(record_cells).collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: &[String]| {
        let line: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_row(&HEADERS.map(String::from));
    for row in &rows {
        push_row(row);
    }
    out
}

fn render_csv(records: &[ReportRecord]) -> String {
    let mut out = String::from(
        "id,device_id,observed_at,disk_encryption,os_update,antivirus,sleep_settings\n",
    );
    for record in records {
        let cells = record_cells(record);
        let line: Vec<String> = cells.iter().map(|cell| csv_escape(cell)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
