//! Interpretation of WSFE responses.
//!
//! A response is inspected for the top-level `Errors` list first; only
//! when it is empty are the per-voucher fields read. Observations are
//! non-fatal: the CAE was issued, but AFIP attached advisory text that
//! must reach the caller.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::AfipError;
use crate::core::xml::local_name;

/// Outcome of an accepted CAE solicitation.
#[derive(Debug, Clone)]
pub struct CaeAuthorization {
    /// Electronic authorization code.
    pub cae: String,
    /// CAE expiration date, `yyyymmdd`.
    pub cae_due_date: String,
    /// First observation message, when AFIP issued the CAE but attached
    /// advisory text (e.g. rounding applied). `None` on a clean accept.
    pub observation: Option<String>,
}

#[derive(Default)]
struct ResponseScan {
    first_error: Option<String>,
    first_observation: Option<String>,
    cae: Option<String>,
    cae_due_date: Option<String>,
    cbte_nro: Option<String>,
}

/// Walk the response once, collecting the handful of fields the two
/// operations care about. Message elements are disambiguated by their
/// parent: `Errors > Err > Msg` vs `Observaciones > Obs > Msg`.
fn scan_response(xml: &str, op: &'static str) -> Result<ResponseScan, AfipError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut scan = ResponseScan::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(local_name(e.name().as_ref())).into_owned();
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if text.is_empty() {
                    continue;
                }
                match path.last().map(String::as_str) {
                    Some("Msg") if path_parent(&path) == Some("Err") => {
                        scan.first_error.get_or_insert(text);
                    }
                    Some("Msg") if path_parent(&path) == Some("Obs") => {
                        scan.first_observation.get_or_insert(text);
                    }
                    Some("CAE") => {
                        scan.cae.get_or_insert(text);
                    }
                    Some("CAEFchVto") => {
                        scan.cae_due_date.get_or_insert(text);
                    }
                    Some("CbteNro") => {
                        scan.cbte_nro.get_or_insert(text);
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AfipError::response_parse(op, e.to_string())),
            _ => {}
        }
    }
    Ok(scan)
}

fn path_parent(path: &[String]) -> Option<&str> {
    (path.len() >= 2).then(|| path[path.len() - 2].as_str())
}

/// Interpret a `FECAESolicitar` response.
///
/// A non-empty top-level error list rejects the request: the returned
/// [`AfipError::CaeRejected`] carries AFIP's first error message without
/// rewording — that text is the authoritative taxpayer-facing diagnostic.
/// Otherwise the CAE and its expiration come from the first (and only)
/// detail response, together with the first observation when present.
pub fn parse_cae_response(xml: &str) -> Result<CaeAuthorization, AfipError> {
    const OP: &str = "FECAESolicitar";
    let scan = scan_response(xml, OP)?;

    if let Some(msg) = scan.first_error {
        return Err(AfipError::CaeRejected(msg));
    }

    let cae = scan
        .cae
        .ok_or_else(|| AfipError::response_parse(OP, "missing CAE"))?;
    let cae_due_date = scan
        .cae_due_date
        .ok_or_else(|| AfipError::response_parse(OP, "missing CAEFchVto"))?;

    Ok(CaeAuthorization {
        cae,
        cae_due_date,
        observation: scan.first_observation,
    })
}

/// Interpret a `FECompUltimoAutorizado` response.
///
/// Returns the last authorized voucher number — 0 when no voucher was
/// ever issued for the point of sale. A peer-side `Errors` block (bad
/// token, wrong point of sale) surfaces as [`AfipError::Remote`] instead
/// of masquerading as "no prior voucher".
pub fn parse_last_voucher_response(xml: &str) -> Result<i64, AfipError> {
    const OP: &str = "FECompUltimoAutorizado";
    let scan = scan_response(xml, OP)?;

    if let Some(msg) = scan.first_error {
        return Err(AfipError::remote(OP, msg));
    }

    let nro = scan
        .cbte_nro
        .ok_or_else(|| AfipError::response_parse(OP, "missing CbteNro"))?;
    nro.parse::<i64>()
        .map_err(|e| AfipError::response_parse(OP, format!("CbteNro {nro:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_response_yields_cae_and_due_date() {
        let xml = r#"<FECAESolicitarResponse><FECAESolicitarResult>
            <FeDetResp><FECAEDetResponse>
                <CbteDesde>101</CbteDesde><Resultado>A</Resultado>
                <CAE>74213345734867</CAE><CAEFchVto>20240625</CAEFchVto>
            </FECAEDetResponse></FeDetResp>
        </FECAESolicitarResult></FECAESolicitarResponse>"#;
        let auth = parse_cae_response(xml).unwrap();
        assert_eq!(auth.cae, "74213345734867");
        assert_eq!(auth.cae_due_date, "20240625");
        assert!(auth.observation.is_none());
    }

    #[test]
    fn top_level_errors_reject_with_verbatim_message() {
        let xml = r#"<FECAESolicitarResult>
            <Errors><Err>
                <Code>10016</Code>
                <Msg>El numero de comprobante desde informado no es correlativo</Msg>
            </Err></Errors>
        </FECAESolicitarResult>"#;
        let err = parse_cae_response(xml).unwrap_err();
        assert!(matches!(err, AfipError::CaeRejected(_)));
        assert_eq!(
            err.to_string(),
            "El numero de comprobante desde informado no es correlativo"
        );
    }

    #[test]
    fn observation_is_surfaced_alongside_cae() {
        let xml = r#"<FECAESolicitarResult><FeDetResp><FECAEDetResponse>
            <Observaciones><Obs><Code>10217</Code><Msg>Se aplico redondeo</Msg></Obs></Observaciones>
            <CAE>74213345734867</CAE><CAEFchVto>20240625</CAEFchVto>
        </FECAEDetResponse></FeDetResp></FECAESolicitarResult>"#;
        let auth = parse_cae_response(xml).unwrap();
        assert_eq!(auth.cae, "74213345734867");
        assert_eq!(auth.observation.as_deref(), Some("Se aplico redondeo"));
    }

    #[test]
    fn last_voucher_zero_means_none_issued() {
        let xml = r#"<FECompUltimoAutorizadoResponse><FECompUltimoAutorizadoResult>
            <PtoVta>6</PtoVta><CbteTipo>1</CbteTipo><CbteNro>0</CbteNro>
        </FECompUltimoAutorizadoResult></FECompUltimoAutorizadoResponse>"#;
        assert_eq!(parse_last_voucher_response(xml).unwrap(), 0);
    }

    #[test]
    fn last_voucher_errors_block_is_not_a_sentinel() {
        let xml = r#"<FECompUltimoAutorizadoResult>
            <CbteNro>0</CbteNro>
            <Errors><Err><Code>600</Code><Msg>Token invalido</Msg></Err></Errors>
        </FECompUltimoAutorizadoResult>"#;
        let err = parse_last_voucher_response(xml).unwrap_err();
        assert!(matches!(err, AfipError::Remote { .. }));
        assert!(err.to_string().contains("Token invalido"));
    }

    #[test]
    fn missing_cae_in_clean_response_is_a_parse_error() {
        let err = parse_cae_response("<FECAESolicitarResult/>").unwrap_err();
        assert!(matches!(err, AfipError::ResponseParse { .. }));
    }
}
