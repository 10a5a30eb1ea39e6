//! # wsfe
//!
//! Client for AFIP's electronic invoicing web services: WSAA (login-ticket
//! authentication) and WSFE v1 (CAE solicitation).
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Request/response field names follow the WSFE v1 schema.
//!
//! ## Quick Start
//!
//! ```no_run
//! use wsfe::core::{CabRequest, CaeRequest, Environment};
//! use wsfe::wsaa::WsaaClient;
//! use wsfe::wsfe::WsfeClient;
//!
//! # fn main() -> Result<(), wsfe::core::AfipError> {
//! let wsaa = WsaaClient::new(Environment::Testing, "certs/cert.crt", "certs/cert.key");
//! let (token, sign, _expiration) = wsaa.login("wsfe")?;
//!
//! let client = WsfeClient::new(Environment::Testing, token, sign);
//! let cab = CabRequest { cuit: 20285142084, pto_vta: 6, cbte_tipo: 1 };
//! let last = client.last_authorized_voucher(&cab)?;
//!
//! let det = CaeRequest {
//!     cbte_desde: last + 1,
//!     cbte_hasta: last + 1,
//!     ..Default::default()
//! };
//! let auth = client.request_cae(&cab, &det)?;
//! println!("CAE {} valid until {}", auth.cae, auth.cae_due_date);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ffi` | C-callable exports for consumption by external billing software |

pub mod core;

pub mod wsaa;

pub mod wsfe;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export core types at crate root for convenience
pub use crate::core::{AfipError, CabRequest, CaeRequest, Environment, KeyLoadError};
