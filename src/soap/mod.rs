//! SOAP protocol client for the WANCommonInterfaceConfig UPnP service.

pub mod client;
pub mod envelope;
pub mod reader;

pub use client::{SoapClient, SoapSettings};
