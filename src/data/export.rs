//! JSON export of a dashboard.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::SystemTime;

use anyhow::Result;
use chrono::{DateTime, Local};
use serde_json::{json, Value};

use super::monitor::Dashboard;

/// RFC 3339 timestamp in local time.
pub fn format_timestamp(t: SystemTime) -> String {
    DateTime::<Local>::from(t).to_rfc3339()
}

/// Build the export document for a dashboard.
pub fn export_json(dashboard: &Dashboard) -> Value {
    let sample = &dashboard.sample;
    let history = &dashboard.history;

    let processes: Vec<Value> = dashboard
        .top
        .iter()
        .map(|p| {
            json!({
                "pid": p.pid,
                "name": p.name,
                "cpu_percent": p.cpu_percent,
                "memory_percent": p.memory_percent,
                "status": p.status,
            })
        })
        .collect();

    let alerts: Vec<Value> = dashboard
        .recent_alerts
        .iter()
        .map(|a| {
            json!({
                "metric": a.metric,
                "value": a.value,
                "threshold": a.threshold,
                "timestamp": format_timestamp(a.timestamp),
                "message": a.message(),
            })
        })
        .collect();

    json!({
        "generated_at": format_timestamp(SystemTime::now()),
        "source": dashboard.source,
        "sample": {
            "timestamp": format_timestamp(sample.timestamp),
            "cpu_percent": sample.cpu_percent,
            "memory_percent": sample.memory_percent,
            "disk_percent": sample.disk_percent,
            "net_bytes_sent": sample.net_bytes_sent,
            "net_bytes_recv": sample.net_bytes_recv,
            "temperature_celsius": sample.temperature_celsius,
            "uptime_secs": sample.uptime().map(|d| d.as_secs()),
            "unavailable": sample.unavailable,
        },
        "rate": {
            "upload_bytes_per_sec": dashboard.rate.upload_rate,
            "download_bytes_per_sec": dashboard.rate.download_rate,
        },
        "history": {
            "cpu": history.cpu.to_vec(),
            "memory": history.memory.to_vec(),
            "upload": history.upload.to_vec(),
            "download": history.download.to_vec(),
            "timestamps": history.timestamps.iter().copied().map(format_timestamp).collect::<Vec<_>>(),
        },
        "rank_key": dashboard.rank_key,
        "processes": processes,
        "alerts": alerts,
    })
}

/// Write the export document to `path` as pretty-printed JSON.
pub fn write_export(dashboard: &Dashboard, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&export_json(dashboard))?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
