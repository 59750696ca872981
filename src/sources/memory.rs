use async_trait::async_trait;
use tracing::info;

use super::{MemoryLog, Result};
use crate::models::MemoryEntry;

/// Memory log that writes each visited stop as a structured log event
#[derive(Debug, Default, Clone)]
pub struct TracingMemoryLog;

#[async_trait]
impl MemoryLog for TracingMemoryLog {
    async fn record(&self, entry: MemoryEntry) -> Result<()> {
        info!(
            title = %entry.title,
            latitude = entry.location.latitude,
            longitude = entry.location.longitude,
            historical_context = entry.historical_context.as_deref().unwrap_or(""),
            "Visited stop"
        );
        Ok(())
    }
}
