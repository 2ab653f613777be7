//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::load_config_file;
use crate::engine::{Message, MessageSink, SyncConfig, SyncEngine};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::registry::{SourceRegistry, BUILTIN_SOURCES};
use crate::source::{Source, SourceStream};
use crate::state::{StateManager, StreamState};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
    registry: SourceRegistry,
}

impl Runner {
    /// Create a new runner over the built-in sources
    pub fn new(cli: Cli) -> Self {
        Self::with_registry(cli, BUILTIN_SOURCES.clone())
    }

    /// Create a runner resolving `--source` against a custom registry
    pub fn with_registry(cli: Cli, registry: SourceRegistry) -> Self {
        Self { cli, registry }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check { config_json } => self.check(config_json.as_deref()).await,
            Commands::Discover { config_json } => self.discover(config_json.as_deref()),
            Commands::Streams { config_json } => self.streams(config_json.as_deref()),
            Commands::Read {
                streams,
                config_json,
                max_records,
                checkpoint_interval,
            } => {
                self.read(
                    streams.as_deref(),
                    config_json.as_deref(),
                    *max_records,
                    *checkpoint_interval,
                )
                .await
            }
            Commands::List => self.list_sources(),
        }
    }

    /// Instantiate the selected source
    fn source(&self) -> Result<Box<dyn Source>> {
        self.registry.create(&self.cli.source)
    }

    /// Load configuration
    fn load_config(&self, inline: Option<&str>) -> Result<Value> {
        // Inline config takes precedence
        if let Some(json_str) = inline {
            return serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        if let Some(path) = &self.cli.config {
            return load_config_file(path);
        }

        Err(Error::config(
            "Configuration not specified (use --config or --config-json)",
        ))
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        let spec = self.source()?.spec();

        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "name": spec.name,
                "title": spec.title,
                "description": spec.description,
                "connectionSpecification": spec.connection_specification
            }
        }));

        Ok(())
    }

    /// Check connection
    async fn check(&self, config_json: Option<&str>) -> Result<()> {
        let source = self.source()?;
        let config = self.load_config(config_json)?;

        let message = Message::info(format!("Checking connection to {}", self.cli.source));
        self.output_message(&message.to_json());

        let result = source.check_connection(&config).await?;
        let status = if result.success {
            json!({
                "status": "SUCCEEDED",
                "message": "Connection successful"
            })
        } else {
            json!({
                "status": "FAILED",
                "message": result.message.unwrap_or_default()
            })
        };

        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": status
        }));

        Ok(())
    }

    /// Discover streams
    fn discover(&self, config_json: Option<&str>) -> Result<()> {
        let source = self.source()?;
        let config = self.load_config(config_json)?;
        let catalog = source.discover(&config)?;

        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": catalog
        }));

        Ok(())
    }

    /// List stream names
    fn streams(&self, config_json: Option<&str>) -> Result<()> {
        let source = self.source()?;
        let config = self.load_config(config_json)?;
        let streams = source.streams(&config)?;
        let names: Vec<&str> = streams.iter().map(SourceStream::name).collect();

        self.output_message(&json!({
            "type": "STREAMS",
            "streams": names,
            "source": self.cli.source
        }));

        Ok(())
    }

    /// Read streams one after another, persisting each stream's final state
    async fn read(
        &self,
        streams: Option<&str>,
        config_json: Option<&str>,
        max_records: Option<usize>,
        checkpoint_interval: usize,
    ) -> Result<()> {
        let sync_start = Instant::now();
        let source = self.source()?;
        let config = self.load_config(config_json)?;
        let state = self.load_state()?;

        let selected = select_streams(source.streams(&config)?, streams)?;

        let client = HttpClient::with_config(source.client_config(&config)?)?;

        let mut sync_config = SyncConfig::new().with_checkpoint_interval(checkpoint_interval);
        if let Some(max) = max_records {
            sync_config = sync_config.with_max_records(max);
        }
        let mut engine = SyncEngine::new(client).with_config(sync_config);

        let mut stream_results: Vec<Value> = Vec::new();
        let mut total_records = 0usize;

        for stream in &selected {
            let name = stream.name();
            let stream_start = Instant::now();
            let records_before = engine.stats().records_synced;

            let initial = state.get_stream_state(name).await;
            let mut sink = StdoutSink::new(self.cli.format);
            let result = stream.sync(&mut engine, &initial, &mut sink).await;

            let stream_records = engine.stats().records_synced - records_before;
            let stream_duration_ms = stream_start.elapsed().as_millis() as u64;
            total_records += stream_records;

            match result {
                Ok(final_state) => {
                    state.set_stream_state(name, final_state).await?;
                    stream_results.push(json!({
                        "stream": name,
                        "status": "SUCCESS",
                        "records_synced": stream_records,
                        "duration_ms": stream_duration_ms
                    }));
                }
                Err(e) => {
                    error!("Error syncing stream {name}: {e}");
                    self.output_message(
                        &Message::error(format!("Error syncing stream {name}: {e}")).to_json(),
                    );

                    // Keep progress up to the last checkpoint the sink saw
                    if let Some(checkpoint) = sink.into_last_checkpoint() {
                        state.set_stream_state(name, checkpoint).await?;
                    }

                    stream_results.push(json!({
                        "stream": name,
                        "status": "FAILED",
                        "error": e.to_string(),
                        "records_synced": stream_records,
                        "duration_ms": stream_duration_ms
                    }));
                }
            }
        }

        state.save().await?;

        let failed_streams = stream_results
            .iter()
            .filter(|r| r["status"] == "FAILED")
            .count();
        let successful_streams = stream_results.len() - failed_streams;
        info!(
            "Sync finished: {total_records} records, {successful_streams} streams succeeded, {failed_streams} failed"
        );

        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": if failed_streams == 0 { "SUCCEEDED" } else if successful_streams == 0 { "FAILED" } else { "PARTIAL" },
                "source": self.cli.source,
                "total_records": total_records,
                "total_streams": stream_results.len(),
                "successful_streams": successful_streams,
                "failed_streams": failed_streams,
                "duration_ms": sync_start.elapsed().as_millis() as u64,
                "state": serde_json::to_value(state.snapshot().await)?,
                "streams": stream_results
            }
        }));

        if failed_streams > 0 {
            return Err(Error::Other(format!(
                "{failed_streams} of {} streams failed",
                selected.len()
            )));
        }

        Ok(())
    }

    /// List registered sources
    fn list_sources(&self) -> Result<()> {
        let sources: Vec<Value> = self
            .registry
            .info()
            .into_iter()
            .map(|info| {
                json!({
                    "name": info.name,
                    "description": info.description,
                    "category": info.category,
                    "streams": info.streams
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "SOURCES",
            "sources": sources
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        print_message(self.cli.format, msg);
    }
}

fn print_message(format: OutputFormat, msg: &Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
        OutputFormat::Pretty => {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        }
    }
}

/// Keep the streams named in a comma-separated filter, in source order
fn select_streams(streams: Vec<SourceStream>, filter: Option<&str>) -> Result<Vec<SourceStream>> {
    let Some(filter) = filter.filter(|f| !f.trim().is_empty()) else {
        return Ok(streams);
    };

    let wanted: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(missing) = wanted
        .iter()
        .find(|name| !streams.iter().any(|s| s.name() == **name))
    {
        return Err(Error::StreamNotFound {
            stream: (*missing).to_string(),
        });
    }

    Ok(streams
        .into_iter()
        .filter(|s| wanted.contains(&s.name()))
        .collect())
}

/// Sink writing engine messages to stdout as they are produced
struct StdoutSink {
    format: OutputFormat,
    last_checkpoint: Option<Value>,
}

impl StdoutSink {
    fn new(format: OutputFormat) -> Self {
        Self {
            format,
            last_checkpoint: None,
        }
    }

    fn into_last_checkpoint(self) -> Option<StreamState> {
        self.last_checkpoint
            .and_then(|value| serde_json::from_value(value).ok())
    }
}

impl MessageSink for StdoutSink {
    fn emit(&mut self, message: Message) -> Result<()> {
        if let Message::State { data, .. } = &message {
            self.last_checkpoint = Some(data.clone());
        }
        print_message(self.format, &message.to_json());
        Ok(())
    }
}
