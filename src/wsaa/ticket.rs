//! Login ticket request construction and response parsing.

use chrono::{DateTime, Duration, Local, SecondsFormat};

use crate::core::AfipError;
use crate::core::xml::{XmlWriter, first_text};

/// A login ticket issued by WSAA for one target service.
///
/// The expiration timestamp is kept verbatim as returned (RFC 3339); it
/// is parsed each time the cache checks validity.
#[derive(Debug, Clone)]
pub struct LoginTicket {
    /// Bearer token for the WSFE `Auth` block.
    pub token: String,
    /// Signature paired with the token.
    pub sign: String,
    /// Ticket expiration, RFC 3339.
    pub expiration: String,
}

/// Serialize a login ticket request (TRA) for `service_name` as of `now`.
///
/// The declared window is `now ± 10` minutes: AFIP rejects requests whose
/// generation/expiration window does not straddle its own clock, so both
/// bounds are pushed away from the local clock to tolerate skew.
pub fn ticket_request_xml(
    service_name: &str,
    now: DateTime<Local>,
) -> Result<String, AfipError> {
    let generation = (now - Duration::minutes(10)).to_rfc3339_opts(SecondsFormat::Secs, false);
    let expiration = (now + Duration::minutes(10)).to_rfc3339_opts(SecondsFormat::Secs, false);

    let mut w = XmlWriter::fragment();
    w.start_element_with_attrs("loginTicketRequest", &[("version", "1.0")])?;
    w.start_element("header")?;
    w.text_element("uniqueId", "1")?;
    w.text_element("generationTime", &generation)?;
    w.text_element("expirationTime", &expiration)?;
    w.end_element("header")?;
    w.text_element("service", service_name)?;
    w.end_element("loginTicketRequest")?;
    w.into_string()
}

/// Parse the `loginTicketResponse` document carried inside the
/// `loginCmsReturn` element of the SOAP response.
pub fn parse_login_ticket_response(xml: &str) -> Result<LoginTicket, AfipError> {
    let token = first_text(xml, "token")
        .ok_or_else(|| AfipError::response_parse("GetLoginTicket", "missing <token>"))?;
    let sign = first_text(xml, "sign")
        .ok_or_else(|| AfipError::response_parse("GetLoginTicket", "missing <sign>"))?;
    let expiration = first_text(xml, "expirationTime")
        .ok_or_else(|| AfipError::response_parse("GetLoginTicket", "missing <expirationTime>"))?;
    Ok(LoginTicket {
        token,
        sign,
        expiration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn request_declares_skewed_window() {
        let now = Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let xml = ticket_request_xml("wsfe", now).unwrap();
        assert!(xml.contains("<loginTicketRequest version=\"1.0\">"));
        assert!(xml.contains("<uniqueId>1</uniqueId>"));
        assert!(xml.contains("<service>wsfe</service>"));
        // 10 minutes either side of the clock
        assert!(xml.contains("11:50:00"));
        assert!(xml.contains("12:10:00"));
    }

    #[test]
    fn response_parses_credentials_and_expiration() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <loginTicketResponse version="1.0">
              <header>
                <source>CN=wsaahomo</source>
                <destination>CN=test</destination>
                <uniqueId>3275725228</uniqueId>
                <generationTime>2024-06-15T11:50:00-03:00</generationTime>
                <expirationTime>2024-06-15T23:50:00-03:00</expirationTime>
              </header>
              <credentials>
                <token>PD94bWwgdmVyc2lvbj0iMS4wIg==</token>
                <sign>i9xDN4Z0SLg=</sign>
              </credentials>
            </loginTicketResponse>"#;
        let ticket = parse_login_ticket_response(xml).unwrap();
        assert_eq!(ticket.token, "PD94bWwgdmVyc2lvbj0iMS4wIg==");
        assert_eq!(ticket.sign, "i9xDN4Z0SLg=");
        assert_eq!(ticket.expiration, "2024-06-15T23:50:00-03:00");
    }

    #[test]
    fn response_missing_credentials_is_an_error() {
        let err = parse_login_ticket_response("<loginTicketResponse/>").unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }
}
