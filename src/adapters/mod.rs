//! External system integrations for tabops.
//!
//! - [`tableau`] - Tableau REST API integration
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and enable testing with in-memory implementations. Everything above this
//! layer talks to the server through the [`tableau::BiServer`] trait:
//!
//! ```rust,no_run
//! use tabops::adapters::tableau::{BiServer, TableauServer};
//! use tabops::config::{secret_string, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig {
//!     base_url: "https://prod-useast-b.online.tableau.com".to_string(),
//!     site: "analytics".to_string(),
//!     token_name: "automation".to_string(),
//!     token_secret: secret_string("token-secret".to_string()),
//!     ..ServerConfig::default()
//! };
//!
//! let mut server = TableauServer::new(config)?;
//! server.sign_in("analytics").await?;
//! // Use server for listings and renders
//! server.sign_out().await?;
//! # Ok(())
//! # }
//! ```

pub mod tableau;
