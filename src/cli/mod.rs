use clap::Parser;

use crate::config::{AppConfig, StoreBackend};

#[derive(Debug, Parser)]
#[command(name = "grades-api")]
#[command(about = "HTTP CRUD service for grade records")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Address to bind (overrides API_HOST)")]
    pub host: Option<String>,

    #[arg(long, short, help = "Port to listen on (overrides API_PORT / PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "MongoDB connection string (overrides DATABASE_URL)")]
    pub database_url: Option<String>,

    #[arg(long, help = "Database name (overrides the one in the connection string)")]
    pub database_name: Option<String>,

    #[arg(long, help = "Collection holding the grade records")]
    pub collection: Option<String>,

    #[arg(long, help = "Serve from an in-memory store instead of MongoDB")]
    pub memory: bool,
}

impl Cli {
    /// Layer command-line flags over the environment-derived config
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.api.host = host;
        }
        if let Some(port) = self.port {
            config.api.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(name) = self.database_name {
            config.database.name = Some(name);
        }
        if let Some(collection) = self.collection {
            config.database.collection = collection;
        }
        if self.memory {
            config.database.store = StoreBackend::Memory;
        }
    }
}
