//! WSFE v1 — AFIP's electronic invoicing web service.
//!
//! Two operations are exposed: last-authorized-voucher lookup
//! (`FECompUltimoAutorizado`) and CAE solicitation (`FECAESolicitar`).
//! Both require a WSAA login ticket for the `"wsfe"` service.
//!
//! One request runs one synchronous call chain: build → submit →
//! interpret. Nothing is retried internally; transient transport errors
//! surface to the caller, which decides whether and when to retry.

mod request;
mod response;

pub use request::{
    AssociatedVoucher, FeAuth, FeCaeDetail, FeCaeRequest, build_cae_request,
    serialize_cae_request, serialize_last_voucher_request,
};
pub use response::{CaeAuthorization, parse_cae_response, parse_last_voucher_response};

use crate::core::{AfipError, CabRequest, CaeRequest, Environment, soap};

/// WSFE homologación endpoint.
pub const URL_WSFE_TESTING: &str = "https://wswhomo.afip.gov.ar/wsfev1/service.asmx";

/// WSFE producción endpoint.
pub const URL_WSFE_PRODUCTION: &str = "https://servicios1.afip.gov.ar/wsfev1/service.asmx";

/// WSFE v1 service namespace; also the `SOAPAction` prefix.
pub(crate) const WSFE_NS: &str = "http://ar.gov.afip.dif.FEV1/";

/// Client for WSFE, bound to one environment and one login ticket.
///
/// The token/sign pair comes from [`crate::wsaa::WsaaClient::login`];
/// the `Auth` block is rebuilt per call from it plus the caller's CUIT.
pub struct WsfeClient {
    endpoint: &'static str,
    token: String,
    sign: String,
}

impl WsfeClient {
    /// Create a client bound to the environment's fixed WSFE endpoint.
    pub fn new(environment: Environment, token: impl Into<String>, sign: impl Into<String>) -> Self {
        let endpoint = match environment {
            Environment::Production => URL_WSFE_PRODUCTION,
            Environment::Testing => URL_WSFE_TESTING,
        };
        Self {
            endpoint,
            token: token.into(),
            sign: sign.into(),
        }
    }

    fn auth(&self, cuit: i64) -> FeAuth {
        FeAuth {
            token: self.token.clone(),
            sign: self.sign.clone(),
            cuit,
        }
    }

    /// Last authorized voucher number for the header's point of sale and
    /// voucher type. Returns 0 when no voucher was ever issued there.
    pub fn last_authorized_voucher(&self, cab: &CabRequest) -> Result<i64, AfipError> {
        let envelope = serialize_last_voucher_request(&self.auth(cab.cuit), cab)?;
        log::debug!("FECompUltimoAutorizado pto_vta={} cbte_tipo={}", cab.pto_vta, cab.cbte_tipo);
        let body = soap::post_envelope(
            self.endpoint,
            "http://ar.gov.afip.dif.FEV1/FECompUltimoAutorizado",
            &envelope,
        )
        .map_err(|e| AfipError::remote("FECompUltimoAutorizado", e))?;
        parse_last_voucher_response(&body)
    }

    /// Request a CAE for one voucher.
    ///
    /// On success the returned [`CaeAuthorization`] may still carry an
    /// observation — AFIP issued the CAE but attached advisory text.
    pub fn request_cae(
        &self,
        cab: &CabRequest,
        det: &CaeRequest,
    ) -> Result<CaeAuthorization, AfipError> {
        let request = build_cae_request(cab, det);
        let envelope = serialize_cae_request(&self.auth(cab.cuit), &request)?;
        log::debug!(
            "FECAESolicitar pto_vta={} cbte_tipo={} cbte_desde={}",
            request.pto_vta,
            request.cbte_tipo,
            request.detail.cbte_desde
        );
        let body = soap::post_envelope(
            self.endpoint,
            "http://ar.gov.afip.dif.FEV1/FECAESolicitar",
            &envelope,
        )
        .map_err(|e| AfipError::remote("FECAESolicitar", e))?;
        parse_cae_response(&body)
    }
}
