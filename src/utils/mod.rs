//! Shared helpers: HTTP access, time handling and XML reading

pub mod http_client;
pub mod time;
pub mod xml_tree;

pub use http_client::HttpClient;
pub use xml_tree::{XmlElement, parse_document};
