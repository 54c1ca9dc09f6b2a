// src/main.rs
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use freshwatch::config::{RelayConfig, TransportKind};
use freshwatch::relay::{DeviceStateCache, JsonFileExporter, PersistenceQueue, Relay};
use freshwatch::util::database::Database;
use freshwatch::util::io::bus::LiveBus;
use freshwatch::util::io::mqtt::MqttTransport;
use freshwatch::util::io::serial::SerialTransport;
use freshwatch::util::io::transport::{self, run_ingest, MessageHandler};

fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FRESHWATCH_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./freshwatch.yml"))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    tracing_subscriber::fmt::init();
    color_eyre::install()?;

    let config = RelayConfig::load(Some(&config_path()))?;
    info!("🐟 freshwatch starting ({:?} transport)", config.transport);

    let database = Database::open(&config.database_path)?;
    info!("Database ready at {}", config.database_path.display());
    let (persistence, writer) = PersistenceQueue::spawn_writer(Arc::new(database));

    let cache = DeviceStateCache::new();
    let bus = Arc::new(LiveBus::new(cache.reader()));

    let mut live = bus.subscribe();
    tokio::spawn(async move {
        while let Some(event) = live.recv().await {
            debug!(event = %event.name, payload = %event.payload, "live event");
        }
    });

    let mut relay = Relay::new(config.topic_map(), cache, bus.clone(), persistence)
        .with_history_limit(config.history_limit)
        .reset_change_gate_on_session_end(config.reset_change_gate_on_session_end);
    if let Some(dir) = &config.export_dir {
        relay = relay.with_exporter(Arc::new(JsonFileExporter::new(dir)));
    }

    let (events, mut inbound) = transport::channel();
    let transport_task = match config.transport {
        TransportKind::Mqtt => {
            let mqtt = MqttTransport::from_config(&config.mqtt, config.subscribe_topics())?;
            info!("Subscribing to {:?}", mqtt.topics());
            tokio::spawn(async move {
                if let Err(e) = mqtt.run(events).await {
                    error!("❌ MQTT transport stopped: {}", e);
                }
            })
        }
        TransportKind::Serial => {
            let ports = SerialTransport::list_ports();
            if ports.is_empty() {
                warn!("⚠️ No serial ports detected");
            } else {
                info!("Available serial ports: {}", ports.join(", "));
            }

            let serial = SerialTransport::from_config(&config.serial);
            tokio::spawn(async move {
                if let Err(e) = serial.run(events).await {
                    error!("❌ Serial transport stopped: {}", e);
                }
            })
        }
    };

    tokio::select! {
        _ = run_ingest(&mut inbound, &mut relay) => {
            warn!("⚠️ Transport closed");
        }
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("❌ Failed to listen for shutdown signal: {}", e);
            }
            info!("🛑 Shutting down");
        }
    }

    transport_task.abort();
    relay.on_disconnect();
    drop(relay);

    let stats = writer.await?;
    info!(
        "Persistence drained: {} written, {} failed",
        stats.written, stats.failed
    );

    Ok(())
}
