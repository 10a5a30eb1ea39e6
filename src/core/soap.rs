//! SOAP 1.1 framing over blocking HTTP.
//!
//! WSAA and WSFE are classic SOAP endpoints; the envelope is built with
//! the event writer and POSTed with a `SOAPAction` header. Calls block
//! until the peer answers or the transport-level timeout fires — there
//! are no retries and no cancellation.

use std::time::Duration;

use super::AfipError;
use super::xml::{XmlWriter, first_text};

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Wrap `body` in a SOAP 1.1 envelope. `operation` is the body element
/// name, bound to `namespace`; `write_fields` fills in its children.
pub(crate) fn envelope<F>(
    namespace: &str,
    operation: &str,
    write_fields: F,
) -> Result<String, AfipError>
where
    F: FnOnce(&mut XmlWriter) -> Result<(), AfipError>,
{
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("soapenv:Envelope", &[("xmlns:soapenv", SOAP_ENV_NS)])?;
    w.start_element("soapenv:Body")?;
    w.start_element_with_attrs(operation, &[("xmlns", namespace)])?;
    write_fields(&mut w)?;
    w.end_element(operation)?;
    w.end_element("soapenv:Body")?;
    w.end_element("soapenv:Envelope")?;
    w.into_string()
}

/// POST a SOAP envelope and return the response body text.
///
/// Transport failures, non-success HTTP statuses, and `soap:Fault`
/// responses all come back as `Err(message)` for the caller to wrap into
/// the operation-specific error variant.
pub(crate) fn post_envelope(
    endpoint: &str,
    soap_action: &str,
    envelope: &str,
) -> Result<String, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| e.to_string())?;

    let resp = client
        .post(endpoint)
        .header("Content-Type", "text/xml; charset=utf-8")
        // SOAP 1.1 wants the action as a quoted string, empty for WSAA.
        .header("SOAPAction", format!("\"{soap_action}\""))
        .body(envelope.to_string())
        .send()
        .map_err(|e| e.to_string())?;

    let status = resp.status();
    let body = resp.text().map_err(|e| e.to_string())?;

    // Fault envelopes usually arrive as HTTP 500; read the fault text
    // before giving up on the status code.
    if let Some(fault) = fault_message(&body) {
        return Err(fault);
    }
    if !status.is_success() {
        return Err(format!("HTTP {status}: {body}"));
    }

    Ok(body)
}

/// The `faultstring` of a `soap:Fault` response, if this is one.
pub(crate) fn fault_message(body: &str) -> Option<String> {
    first_text(body, "faultstring")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wraps_operation_in_soap_body() {
        let xml = envelope("http://ar.gov.afip.dif.FEV1/", "FECompUltimoAutorizado", |w| {
            w.text_element("PtoVta", "6")?;
            Ok(())
        })
        .unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<soapenv:Envelope"));
        assert!(xml.contains("<FECompUltimoAutorizado xmlns=\"http://ar.gov.afip.dif.FEV1/\">"));
        assert!(xml.contains("<PtoVta>6</PtoVta>"));
    }

    #[test]
    fn fault_message_extracted_from_fault_envelope() {
        let body = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
            <soapenv:Body><soapenv:Fault>
                <faultcode>ns1:cms.cert.expired</faultcode>
                <faultstring>Certificado expirado</faultstring>
            </soapenv:Fault></soapenv:Body></soapenv:Envelope>"#;
        assert_eq!(fault_message(body).as_deref(), Some("Certificado expirado"));
    }

    #[test]
    fn regular_response_has_no_fault() {
        let body = "<Envelope><Body><FECAESolicitarResponse/></Body></Envelope>";
        assert!(fault_message(body).is_none());
    }
}
