/// Public library interface for the Habit Tracker server
///
/// This module exports the habit model, its validation and services, and
/// the MCP server that exposes them over stdin/stdout.

use std::path::PathBuf;
use thiserror::Error;

pub mod domain;
pub mod validation;
pub mod storage;
pub mod services;
pub mod presentation;
pub mod mcp;

// Re-export public modules and types
pub use domain::*;
pub use services::{ErrorKind, ServiceError};
pub use storage::{DeletedHabit, HabitStorage, SqliteStorage, StorageError};
pub use validation::{FieldIssue, Problem, ValidationErrors};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main habit tracker server that implements the MCP protocol
///
/// This server owns the SQLite storage that every tool call runs against.
pub struct HabitTrackerServer {
    storage: SqliteStorage,
}

impl HabitTrackerServer {
    /// Create a new habit tracker server with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Tracker server with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;

        Ok(Self { storage })
    }

    /// Server whose data lives only as long as the process
    pub async fn in_memory() -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Tracker server with an in-memory database");

        let storage = SqliteStorage::in_memory()?;

        Ok(Self { storage })
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        // Test database connectivity
        let habits = self.storage.list_habits()?;
        tracing::info!("Server started successfully, found {} existing habits", habits.len());

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }
}
