//! Gateway Admin API interaction module
//!
//! Connection root, HTTP transport and address handling.
//!
//! # Module Structure
//!
//! - [`client`] - The [`Gateway`](client::Gateway) root of the resource tree
//! - [`http`] - HTTP transport for REST calls
//! - [`url`] - Composing and decomposing addresses
//!
//! # Example
//!
//! ```ignore
//! use inpanzee::Gateway;
//!
//! async fn example() -> inpanzee::Result<()> {
//!     let kong = Gateway::new("http", "localhost", 8001)?;
//!     let info = kong.info().await?;
//!     println!("{}", info["version"]);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod url;
