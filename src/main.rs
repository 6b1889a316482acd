//! host_probe server binary.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use host_probe::{
    start_web_server, CollectorConfig, SystemCollector, SystemSnapshot, WebConfig,
    DEFAULT_COLLECTOR_TIMEOUT_MS, DEFAULT_CPU_SAMPLE_MS, DEFAULT_WEB_PORT,
};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "host_probe")]
#[command(about = "Read-only HTTP API reporting host resource snapshots")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Web server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,

    /// CPU utilization sampling window in milliseconds
    #[arg(long, default_value_t = DEFAULT_CPU_SAMPLE_MS)]
    cpu_sample_ms: u64,

    /// Upper bound for a single collector in milliseconds
    #[arg(long, default_value_t = DEFAULT_COLLECTOR_TIMEOUT_MS)]
    collector_timeout_ms: u64,

    /// Skip GPU library detection
    #[arg(long)]
    no_gpu: bool,

    /// Skip container runtime queries
    #[arg(long)]
    no_containers: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (default)
    Serve(ServeArgs),

    /// Collect a single snapshot and exit
    Snapshot(SnapshotArgs),

    /// Show detected hardware and compiled features
    Info,
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Serve(args)) => serve_command(&cli, args).await,
        Some(Commands::Snapshot(args)) => snapshot_command(&cli, args).await,
        Some(Commands::Info) => info_command(&cli).await,
        None => serve_command(&cli, &ServeArgs::default()).await,
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    // RUST_LOG, when set, overrides the flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level_filter(log_level(cli)));

    tracing::subscriber::set_global_default(build_subscriber(filter))
        .context("Failed to install log subscriber")?;

    Ok(())
}

fn log_level(cli: &Cli) -> Level {
    if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    }
}

fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
}

fn build_subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish()
}

fn collector_config(cli: &Cli) -> CollectorConfig {
    CollectorConfig::new()
        .with_cpu_sample_ms(cli.cpu_sample_ms)
        .with_collector_timeout_ms(cli.collector_timeout_ms)
        .with_gpu(!cli.no_gpu)
        .with_containers(!cli.no_containers)
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    let config = collector_config(cli);
    info!(
        cpu_sample_ms = config.cpu_sample_ms,
        collector_timeout_ms = config.collector_timeout_ms,
        "Starting host_probe"
    );

    let collector = Arc::new(SystemCollector::new(config));
    let (gpu_available, gpu_count) = collector.capability().status();
    info!(gpu_available, gpu_count, "GPU capability determined");

    let web_config = WebConfig::new(&cli.host, cli.port).with_cors(!args.no_cors);
    info!(
        bind = %web_config.bind_address(),
        cors = web_config.enable_cors,
        "Web server configuration"
    );

    start_web_server(web_config, collector).await?;
    Ok(())
}

async fn snapshot_command(cli: &Cli, args: &SnapshotArgs) -> anyhow::Result<()> {
    let collector = SystemCollector::new(collector_config(cli));
    let snapshot = collector.snapshot().await;
    collector.shutdown();

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        "pretty" => print_pretty_snapshot(&snapshot),
        other => bail!("Unsupported format: {}. Use 'json' or 'pretty'", other),
    }

    Ok(())
}

async fn info_command(cli: &Cli) -> anyhow::Result<()> {
    let collector = SystemCollector::new(collector_config(cli));
    let cpu = collector.cpu().await;
    let memory = collector.memory().await;
    let (gpu_available, gpu_count) = collector.capability().status();
    collector.shutdown();

    println!("host_probe {}", env!("CARGO_PKG_VERSION"));
    println!("================");
    println!();
    println!("Hardware:");
    println!(
        "  CPU: {} ({} physical / {} logical cores)",
        cpu.model, cpu.physical_cores, cpu.logical_cores
    );
    println!("  Architecture: {}", cpu.architecture);
    println!("  Memory: {} MB total", memory.total);
    if gpu_available {
        println!("  GPUs: {}", gpu_count);
    } else {
        println!("  GPUs: not available");
    }
    println!();

    println!("Features compiled:");
    #[cfg(feature = "nvml")]
    println!("  - NVML GPU support: ✓");
    #[cfg(not(feature = "nvml"))]
    println!("  - NVML GPU support: ✗");

    Ok(())
}

fn print_pretty_snapshot(snapshot: &SystemSnapshot) {
    println!(
        "System Snapshot ({})",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("==========================================");
    println!();

    let cpu = &snapshot.compute;
    println!("CPU:");
    println!("  Model: {}", cpu.model);
    println!("  Cores: {} physical, {} logical", cpu.physical_cores, cpu.logical_cores);
    println!("  Usage: {:.1}%", cpu.utilization);
    if let Some(temp) = cpu.temperature {
        println!("  Temperature: {:.1}°C", temp);
    }
    println!();

    println!("Memory:");
    println!(
        "  {} MB used / {} MB total ({:.1}%)",
        snapshot.memory.used, snapshot.memory.total, snapshot.memory.utilization
    );
    println!();

    if !snapshot.storage.is_empty() {
        println!("Disks:");
        for disk in &snapshot.storage {
            println!(
                "  {} on {}: {} GB total, {:.1}% used",
                disk.device, disk.mountpoint, disk.total, disk.utilization
            );
        }
        println!();
    }

    if !snapshot.interfaces.is_empty() {
        println!("Network:");
        for iface in &snapshot.interfaces {
            println!(
                "  {}: {} (TX: {:.1} MB, RX: {:.1} MB)",
                iface.name,
                iface.ipv4.as_deref().unwrap_or("-"),
                iface.bytes_sent as f64 / 1024.0 / 1024.0,
                iface.bytes_recv as f64 / 1024.0 / 1024.0
            );
        }
        println!();
    }

    if !snapshot.accelerators.is_empty() {
        println!("GPUs:");
        for gpu in &snapshot.accelerators {
            println!(
                "  [{}] {}: {}% busy, {} / {} MB, {}°C",
                gpu.id, gpu.name, gpu.utilization, gpu.memory_used, gpu.memory_total, gpu.temperature
            );
        }
        println!();
    }

    if !snapshot.containers.is_empty() {
        println!("Containers:");
        for container in &snapshot.containers {
            println!(
                "  {} {} ({}) {}",
                container.id, container.name, container.image, container.status
            );
        }
        println!();
    }

    println!("Sockets: {} open", snapshot.sockets.len());
    println!("Processes: {}", snapshot.processes.len());
    for process in snapshot.processes.iter().take(5) {
        println!(
            "  {:>7} {:<20} {:>5.1}% mem  {}",
            process.pid, process.name, process.memory_percent, process.username
        );
    }
}
