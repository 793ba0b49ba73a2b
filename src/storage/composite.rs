use crate::config::SinkConfig;
use crate::data::Data;

use super::{InfluxSink, LocalStore, Sink, SinkError};

/// InfluxDB as primary store, local JSON spool as fallback.
///
/// Without an InfluxDB endpoint the probe always fails, so every batch is
/// spooled.
#[derive(Debug)]
pub struct FallbackSink {
    primary: Option<InfluxSink>,
    local: LocalStore,
}

impl FallbackSink {
    pub fn new(primary: Option<InfluxSink>, local: LocalStore) -> Self {
        Self { primary, local }
    }

    pub fn from_config(config: &SinkConfig) -> Result<Self, SinkError> {
        let primary = config.influx.as_ref().map(InfluxSink::new).transpose()?;
        if primary.is_none() {
            tracing::warn!(
                dir = %config.fallback_dir.display(),
                "No InfluxDB configured, batches are spooled locally"
            );
        }
        Ok(Self::new(primary, LocalStore::new(&config.fallback_dir)))
    }
}

#[async_trait::async_trait]
impl Sink for FallbackSink {
    async fn probe(&self) -> bool {
        match &self.primary {
            Some(influx) => influx.ping().await,
            None => false,
        }
    }

    async fn write(&self, batch: &[Data]) -> Result<(), SinkError> {
        match &self.primary {
            Some(influx) => influx.write(batch).await,
            None => Err(SinkError::Unreachable("no primary sink configured".to_string())),
        }
    }

    async fn persist(&self, batch: &[Data]) -> Result<(), SinkError> {
        let path = self.local.persist(batch).await?;
        tracing::info!(path = %path.display(), records = batch.len(), "Spooled batch");
        Ok(())
    }
}
