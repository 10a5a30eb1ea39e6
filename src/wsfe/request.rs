//! CAE request construction and SOAP serialization.
//!
//! [`build_cae_request`] is a pure transformation from the caller-facing
//! header/detail pair to the full WSFE request structure; no I/O happens
//! here. Serialization emits elements in WSFE schema order — element
//! order is part of the wire contract for SOAP — and is deterministic.

use rust_decimal::Decimal;

use crate::core::xml::XmlWriter;
use crate::core::{
    AfipError, CabRequest, CaeRequest, TaxItem, VatRateItem, is_vat_exempt_voucher_type, soap,
};

use super::WSFE_NS;

/// The `Auth` block sent with every WSFE operation.
#[derive(Debug, Clone)]
pub struct FeAuth {
    pub token: String,
    pub sign: String,
    pub cuit: i64,
}

/// A fully built `FECAERequest`: header plus the single detail record.
#[derive(Debug, Clone)]
pub struct FeCaeRequest {
    /// Number of detail records; always 1 in this client.
    pub cant_reg: i32,
    pub pto_vta: i32,
    pub cbte_tipo: i32,
    pub detail: FeCaeDetail,
}

/// One `FECAEDetRequest` record with its conditional blocks resolved.
///
/// Block presence is explicit: `None`/absent means the element is not
/// serialized at all, which WSFE distinguishes from an empty element.
#[derive(Debug, Clone)]
pub struct FeCaeDetail {
    pub concepto: i32,
    pub doc_tipo: i32,
    pub doc_nro: i64,
    pub cbte_desde: i64,
    pub cbte_hasta: i64,
    pub cbte_fch: String,
    pub imp_total: Decimal,
    pub imp_tot_conc: Decimal,
    pub imp_neto: Decimal,
    pub imp_op_ex: Decimal,
    pub imp_trib: Decimal,
    pub imp_iva: Decimal,
    pub mon_id: String,
    pub mon_cotiz: Decimal,
    pub can_mis_mon_ext: String,
    pub condicion_iva_receptor_id: i32,
    pub cbtes_asoc: Option<Vec<AssociatedVoucher>>,
    pub tributos: Option<Vec<TaxItem>>,
    pub iva: Option<Vec<VatRateItem>>,
}

/// Reference to a prior voucher (`CbteAsoc`), used by credit/debit notes.
#[derive(Debug, Clone)]
pub struct AssociatedVoucher {
    pub tipo: i32,
    pub pto_vta: i32,
    pub nro: i64,
    /// Receiver CUIT, only when the receiver document number is a CUIT
    /// (exactly 11 decimal digits).
    pub cuit: Option<String>,
    pub cbte_fch: String,
}

/// Build the full WSFE request for one voucher.
///
/// Applies the conditional-inclusion rules:
/// - the VAT block is attached only for non-"C" voucher types with a
///   positive VAT or net amount ("C" vouchers are VAT-exempt by
///   regulation and must not carry the block);
/// - the associated-voucher block is attached only when both reference
///   type and number are positive;
/// - the levy block is attached only when at least one levy entry exists.
pub fn build_cae_request(cab: &CabRequest, det: &CaeRequest) -> FeCaeRequest {
    let iva = if !is_vat_exempt_voucher_type(cab.cbte_tipo)
        && (det.imp_iva > Decimal::ZERO || det.imp_neto > Decimal::ZERO)
    {
        Some(det.ivas.clone())
    } else {
        None
    };

    let cbtes_asoc = if det.cbte_nro_ref > 0 && det.cbte_tipo_ref > 0 {
        Some(vec![AssociatedVoucher {
            tipo: det.cbte_tipo_ref,
            pto_vta: cab.pto_vta,
            nro: det.cbte_nro_ref,
            cuit: receiver_cuit(det.doc_nro),
            cbte_fch: det.cbte_fch.clone(),
        }])
    } else {
        None
    };

    let tributos = if det.tributos.is_empty() {
        None
    } else {
        Some(det.tributos.clone())
    };

    FeCaeRequest {
        cant_reg: 1,
        pto_vta: cab.pto_vta,
        cbte_tipo: cab.cbte_tipo,
        detail: FeCaeDetail {
            concepto: 1,
            doc_tipo: det.doc_tipo,
            doc_nro: det.doc_nro,
            cbte_desde: det.cbte_desde,
            cbte_hasta: det.cbte_hasta,
            cbte_fch: det.cbte_fch.clone(),
            imp_total: det.imp_total,
            imp_tot_conc: det.imp_tot_conc,
            imp_neto: det.imp_neto,
            imp_op_ex: det.imp_op_ex,
            imp_trib: det.imp_trib,
            imp_iva: det.imp_iva,
            mon_id: "PES".into(),
            mon_cotiz: Decimal::ONE,
            // Must be "N" whenever MonId is PES.
            can_mis_mon_ext: "N".into(),
            condicion_iva_receptor_id: det.condicion_iva_receptor_id,
            cbtes_asoc,
            tributos,
            iva,
        },
    }
}

/// The associated voucher's CUIT field: populated only when the receiver
/// document number, rendered in decimal, is exactly 11 digits long (a
/// CUIT rather than a DNI or other identifier).
fn receiver_cuit(doc_nro: i64) -> Option<String> {
    if doc_nro <= 0 {
        return None;
    }
    let rendered = doc_nro.to_string();
    (rendered.len() == 11).then_some(rendered)
}

/// Serialize a `FECAESolicitar` call as a complete SOAP envelope.
pub fn serialize_cae_request(auth: &FeAuth, req: &FeCaeRequest) -> Result<String, AfipError> {
    soap::envelope(WSFE_NS, "FECAESolicitar", |w| {
        write_auth(w, auth)?;
        w.start_element("FeCAEReq")?;

        w.start_element("FeCabReq")?;
        w.text_element("CantReg", &req.cant_reg.to_string())?;
        w.text_element("PtoVta", &req.pto_vta.to_string())?;
        w.text_element("CbteTipo", &req.cbte_tipo.to_string())?;
        w.end_element("FeCabReq")?;

        w.start_element("FeDetReq")?;
        write_detail(w, &req.detail)?;
        w.end_element("FeDetReq")?;

        w.end_element("FeCAEReq")?;
        Ok(())
    })
}

/// Serialize a `FECompUltimoAutorizado` call as a complete SOAP envelope.
pub fn serialize_last_voucher_request(
    auth: &FeAuth,
    cab: &CabRequest,
) -> Result<String, AfipError> {
    soap::envelope(WSFE_NS, "FECompUltimoAutorizado", |w| {
        write_auth(w, auth)?;
        w.text_element("PtoVta", &cab.pto_vta.to_string())?;
        w.text_element("CbteTipo", &cab.cbte_tipo.to_string())?;
        Ok(())
    })
}

fn write_auth(w: &mut XmlWriter, auth: &FeAuth) -> Result<(), AfipError> {
    w.start_element("Auth")?;
    w.text_element("Token", &auth.token)?;
    w.text_element("Sign", &auth.sign)?;
    w.text_element("Cuit", &auth.cuit.to_string())?;
    w.end_element("Auth")?;
    Ok(())
}

// Element order follows the FECAEDetRequest schema sequence; the service
// validates order, not just presence. Concept 1 (products) carries no
// service-period or payment-due dates, so those elements are omitted.
fn write_detail(w: &mut XmlWriter, det: &FeCaeDetail) -> Result<(), AfipError> {
    w.start_element("FECAEDetRequest")?;
    w.text_element("Concepto", &det.concepto.to_string())?;
    w.text_element("DocTipo", &det.doc_tipo.to_string())?;
    w.text_element("DocNro", &det.doc_nro.to_string())?;
    w.text_element("CbteDesde", &det.cbte_desde.to_string())?;
    w.text_element("CbteHasta", &det.cbte_hasta.to_string())?;
    w.text_element("CbteFch", &det.cbte_fch)?;
    w.amount_element("ImpTotal", det.imp_total)?;
    w.amount_element("ImpTotConc", det.imp_tot_conc)?;
    w.amount_element("ImpNeto", det.imp_neto)?;
    w.amount_element("ImpOpEx", det.imp_op_ex)?;
    w.amount_element("ImpTrib", det.imp_trib)?;
    w.amount_element("ImpIVA", det.imp_iva)?;
    w.text_element("MonId", &det.mon_id)?;
    w.amount_element("MonCotiz", det.mon_cotiz)?;
    w.text_element("CanMisMonExt", &det.can_mis_mon_ext)?;
    w.text_element(
        "CondicionIVAReceptorId",
        &det.condicion_iva_receptor_id.to_string(),
    )?;

    if let Some(cbtes) = &det.cbtes_asoc {
        w.start_element("CbtesAsoc")?;
        for cbte in cbtes {
            w.start_element("CbteAsoc")?;
            w.text_element("Tipo", &cbte.tipo.to_string())?;
            w.text_element("PtoVta", &cbte.pto_vta.to_string())?;
            w.text_element("Nro", &cbte.nro.to_string())?;
            if let Some(cuit) = &cbte.cuit {
                w.text_element("Cuit", cuit)?;
            }
            w.text_element("CbteFch", &cbte.cbte_fch)?;
            w.end_element("CbteAsoc")?;
        }
        w.end_element("CbtesAsoc")?;
    }

    if let Some(tributos) = &det.tributos {
        w.start_element("Tributos")?;
        for tributo in tributos {
            w.start_element("Tributo")?;
            w.text_element("Id", &tributo.id.to_string())?;
            w.text_element("Desc", &tributo.desc)?;
            w.amount_element("BaseImp", tributo.base_imp)?;
            w.amount_element("Alic", tributo.alic)?;
            w.amount_element("Importe", tributo.importe)?;
            w.end_element("Tributo")?;
        }
        w.end_element("Tributos")?;
    }

    if let Some(ivas) = &det.iva {
        w.start_element("Iva")?;
        for iva in ivas {
            w.start_element("AlicIva")?;
            w.text_element("Id", &iva.id.to_string())?;
            w.amount_element("BaseImp", iva.base_imp)?;
            w.amount_element("Importe", iva.importe)?;
            w.end_element("AlicIva")?;
        }
        w.end_element("Iva")?;
    }

    w.end_element("FECAEDetRequest")?;
    Ok(())
}
