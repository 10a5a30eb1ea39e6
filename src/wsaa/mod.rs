//! WSAA — AFIP's authentication web service.
//!
//! Issues time-limited login tickets (token + sign) for a target service
//! name. Tickets are requested by CMS-signing a login ticket request and
//! POSTing it to the `LoginCms` SOAP operation; the response is cached
//! per service name because AFIP rejects a new login while a valid ticket
//! exists (tickets typically live 12 hours).
//!
//! # Example
//!
//! ```no_run
//! use wsfe::core::Environment;
//! use wsfe::wsaa::WsaaClient;
//!
//! # fn main() -> Result<(), wsfe::core::AfipError> {
//! let wsaa = WsaaClient::new(Environment::Testing, "certs/cert.crt", "certs/cert.key");
//! let (token, sign, expiration) = wsaa.login("wsfe")?;
//! # Ok(())
//! # }
//! ```

mod client;
mod cms;
mod ticket;

pub use client::WsaaClient;
pub use cms::{KeyPair, load_key_pair};
pub use ticket::{LoginTicket, parse_login_ticket_response, ticket_request_xml};

/// WSAA homologación endpoint.
pub const URL_WSAA_TESTING: &str = "https://wsaahomo.afip.gov.ar/ws/services/LoginCms";

/// WSAA producción endpoint.
pub const URL_WSAA_PRODUCTION: &str = "https://wsaa.afip.gov.ar/ws/services/LoginCms";

/// Namespace of the `loginCms` operation.
pub(crate) const WSAA_NS: &str = "http://wsaa.view.sua.dvadac.desein.afip.gov";
