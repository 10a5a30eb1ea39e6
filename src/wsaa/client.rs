//! Ticket cache and authenticator.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Local, Utc};

use crate::core::xml::first_text;
use crate::core::{AfipError, Environment, soap};

use super::cms::{load_key_pair, sign_ticket_request};
use super::ticket::{LoginTicket, parse_login_ticket_response, ticket_request_xml};
use super::{URL_WSAA_PRODUCTION, URL_WSAA_TESTING, WSAA_NS};

/// Per-service login ticket cache.
///
/// Holds one ticket per target service name for the life of the process;
/// entries are replaced in place when they expire. The decision logic is
/// kept free of I/O so it can be exercised without a peer.
pub(crate) struct TicketCache {
    tickets: HashMap<String, LoginTicket>,
}

impl TicketCache {
    pub(crate) fn new() -> Self {
        Self {
            tickets: HashMap::new(),
        }
    }

    /// The cached ticket for `service_name` if it is still valid at `now`.
    ///
    /// Absent and expired tickets both yield `Ok(None)` — the caller must
    /// refresh. A cached expiration that fails to parse is an error, not
    /// a refresh trigger.
    pub(crate) fn valid_at(
        &self,
        service_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<&LoginTicket>, AfipError> {
        let Some(ticket) = self.tickets.get(service_name) else {
            return Ok(None);
        };
        let expiration = DateTime::parse_from_rfc3339(&ticket.expiration)
            .map_err(|e| AfipError::TicketParse(format!("{}: {e}", ticket.expiration)))?;
        if now > expiration.with_timezone(&Utc) {
            return Ok(None);
        }
        Ok(Some(ticket))
    }

    pub(crate) fn store(&mut self, service_name: &str, ticket: LoginTicket) {
        self.tickets.insert(service_name.to_string(), ticket);
    }

    fn get(&self, service_name: &str) -> Option<&LoginTicket> {
        self.tickets.get(service_name)
    }
}

/// Client for WSAA, AFIP's login-ticket service.
///
/// Owns the per-service ticket cache. Certificate and key are loaded from
/// disk on each refresh, so a renewed certificate is picked up without
/// reconstructing the client.
pub struct WsaaClient {
    endpoint: &'static str,
    cert_path: PathBuf,
    key_path: PathBuf,
    tickets: Mutex<TicketCache>,
}

impl WsaaClient {
    /// Create a client bound to the environment's fixed WSAA endpoint.
    pub fn new(
        environment: Environment,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        let endpoint = match environment {
            Environment::Production => URL_WSAA_PRODUCTION,
            Environment::Testing => URL_WSAA_TESTING,
        };
        Self {
            endpoint,
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            tickets: Mutex::new(TicketCache::new()),
        }
    }

    /// Obtain `(token, sign, expiration)` for `service_name`.
    ///
    /// A cached ticket whose expiration is still in the future is reused:
    /// AFIP rejects a new login while a valid ticket exists, so caching is
    /// part of the protocol, not an optimization. The cache lock is held
    /// across the whole refresh — two callers observing the same expired
    /// ticket must not race two login requests.
    pub fn login(&self, service_name: &str) -> Result<(String, String, String), AfipError> {
        let mut cache = self.tickets.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(ticket) = cache.valid_at(service_name, Utc::now())? {
            return Ok((
                ticket.token.clone(),
                ticket.sign.clone(),
                ticket.expiration.clone(),
            ));
        }

        let ticket = self.request_ticket(service_name)?;
        cache.store(service_name, ticket);

        // Read back from the now-current cache entry.
        let ticket = cache
            .get(service_name)
            .ok_or_else(|| AfipError::response_parse("GetLoginTicket", "ticket not stored"))?;
        Ok((
            ticket.token.clone(),
            ticket.sign.clone(),
            ticket.expiration.clone(),
        ))
    }

    fn request_ticket(&self, service_name: &str) -> Result<LoginTicket, AfipError> {
        let tra = ticket_request_xml(service_name, Local::now())?;
        let pair = load_key_pair(&self.cert_path, &self.key_path)?;
        let cms = sign_ticket_request(tra.as_bytes(), &pair)?;
        let cms_b64 = BASE64.encode(&cms);

        let envelope = soap::envelope(WSAA_NS, "loginCms", |w| {
            w.text_element("in0", &cms_b64)?;
            Ok(())
        })?;

        log::debug!("loginCms request for {service_name}");
        let body = soap::post_envelope(self.endpoint, "", &envelope)
            .map_err(AfipError::AuthTransport)?;
        log::trace!("loginCms response: {body}");

        // loginCmsReturn carries the ticket response as an escaped XML
        // document; unescaping happens when the text event is read.
        let inner = first_text(&body, "loginCmsReturn").ok_or_else(|| {
            AfipError::response_parse("GetLoginTicket", "missing loginCmsReturn")
        })?;
        parse_login_ticket_response(&inner)
    }
}
