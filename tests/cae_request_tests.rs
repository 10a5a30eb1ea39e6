use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use wsfe::core::*;
use wsfe::wsfe::{FeAuth, build_cae_request, serialize_cae_request, serialize_last_voucher_request};

fn cab(cbte_tipo: i32) -> CabRequest {
    CabRequest {
        cuit: 20285142084,
        pto_vta: 6,
        cbte_tipo,
    }
}

fn det_with_vat() -> CaeRequest {
    CaeRequest {
        doc_tipo: 80,
        doc_nro: 20277342562,
        cbte_desde: 101,
        cbte_hasta: 101,
        cbte_fch: "20240615".into(),
        imp_neto: dec!(2.21),
        imp_total: dec!(2.67),
        imp_iva: dec!(0.46),
        ivas: vec![VatRateItem {
            id: 5,
            base_imp: dec!(2.21),
            importe: dec!(0.46),
        }],
        ..Default::default()
    }
}

fn auth() -> FeAuth {
    FeAuth {
        token: "tok".into(),
        sign: "sig".into(),
        cuit: 20285142084,
    }
}

// --- VAT breakdown inclusion ---

#[test]
fn vat_exempt_voucher_types_never_carry_vat_block() {
    for cbte_tipo in [FACTURA_C, NOTA_CREDITO_C] {
        let req = build_cae_request(&cab(cbte_tipo), &det_with_vat());
        assert!(req.detail.iva.is_none(), "cbte_tipo {cbte_tipo}");

        let xml = serialize_cae_request(&auth(), &req).unwrap();
        assert!(!xml.contains("<Iva>"), "cbte_tipo {cbte_tipo}");
        assert!(!xml.contains("<AlicIva>"), "cbte_tipo {cbte_tipo}");
    }
}

#[test]
fn non_exempt_voucher_includes_vat_block_when_amounts_positive() {
    for cbte_tipo in [FACTURA_A, NOTA_CREDITO_A, FACTURA_B, NOTA_CREDITO_B] {
        let req = build_cae_request(&cab(cbte_tipo), &det_with_vat());
        assert!(req.detail.iva.is_some(), "cbte_tipo {cbte_tipo}");
    }
}

#[test]
fn vat_block_requires_positive_vat_or_net_amount() {
    let mut det = det_with_vat();
    det.imp_neto = Decimal::ZERO;
    det.imp_iva = Decimal::ZERO;
    // Entries supplied, but neither amount positive
    let req = build_cae_request(&cab(FACTURA_A), &det);
    assert!(req.detail.iva.is_none());

    det.imp_iva = dec!(0.46);
    let req = build_cae_request(&cab(FACTURA_A), &det);
    assert!(req.detail.iva.is_some());

    det.imp_iva = Decimal::ZERO;
    det.imp_neto = dec!(2.21);
    let req = build_cae_request(&cab(FACTURA_A), &det);
    assert!(req.detail.iva.is_some());
}

// --- Associated voucher reference ---

#[test]
fn associated_block_requires_both_reference_fields_positive() {
    let mut det = det_with_vat();
    assert!(build_cae_request(&cab(NOTA_CREDITO_A), &det).detail.cbtes_asoc.is_none());

    det.cbte_tipo_ref = FACTURA_A;
    assert!(build_cae_request(&cab(NOTA_CREDITO_A), &det).detail.cbtes_asoc.is_none());

    det.cbte_tipo_ref = 0;
    det.cbte_nro_ref = 100;
    assert!(build_cae_request(&cab(NOTA_CREDITO_A), &det).detail.cbtes_asoc.is_none());

    det.cbte_tipo_ref = FACTURA_A;
    let req = build_cae_request(&cab(NOTA_CREDITO_A), &det);
    let cbtes = req.detail.cbtes_asoc.expect("block present");
    assert_eq!(cbtes.len(), 1);
    assert_eq!(cbtes[0].tipo, FACTURA_A);
    assert_eq!(cbtes[0].nro, 100);
    assert_eq!(cbtes[0].pto_vta, 6);
    assert_eq!(cbtes[0].cbte_fch, "20240615");
}

#[test]
fn associated_cuit_set_for_eleven_digit_document() {
    let mut det = det_with_vat();
    det.cbte_tipo_ref = FACTURA_A;
    det.cbte_nro_ref = 100;
    det.doc_nro = 20277342562; // 11 digits — a CUIT

    let req = build_cae_request(&cab(NOTA_CREDITO_A), &det);
    let cbtes = req.detail.cbtes_asoc.as_ref().expect("block present");
    assert_eq!(cbtes[0].cuit.as_deref(), Some("20277342562"));

    let xml = serialize_cae_request(&auth(), &req).unwrap();
    assert!(xml.contains("<Cuit>20277342562</Cuit>"));
}

#[test]
fn associated_cuit_absent_for_dni_sized_document() {
    let mut det = det_with_vat();
    det.cbte_tipo_ref = FACTURA_A;
    det.cbte_nro_ref = 100;
    det.doc_nro = 27342562; // DNI, not a CUIT

    let req = build_cae_request(&cab(NOTA_CREDITO_A), &det);
    assert!(req.detail.cbtes_asoc.expect("block present")[0].cuit.is_none());
}

// --- Levies ---

#[test]
fn levy_block_present_only_with_entries() {
    let mut det = det_with_vat();
    assert!(build_cae_request(&cab(FACTURA_A), &det).detail.tributos.is_none());

    det.tributos = vec![TaxItem {
        id: 2,
        base_imp: dec!(2.21),
        desc: "Ingresos Brutos".into(),
        alic: dec!(3.5),
        importe: dec!(0.08),
    }];
    let req = build_cae_request(&cab(FACTURA_A), &det);
    assert_eq!(req.detail.tributos.as_ref().map(Vec::len), Some(1));

    let xml = serialize_cae_request(&auth(), &req).unwrap();
    assert!(xml.contains("<Tributos>"));
    assert!(xml.contains("<Desc>Ingresos Brutos</Desc>"));
}

// --- Determinism ---

#[test]
fn building_twice_from_identical_input_is_byte_identical() {
    let cab = cab(NOTA_CREDITO_A);
    let mut det = det_with_vat();
    det.cbte_tipo_ref = FACTURA_A;
    det.cbte_nro_ref = 100;
    det.tributos = vec![TaxItem {
        id: 2,
        base_imp: dec!(2.21),
        desc: "IIBB".into(),
        alic: dec!(3.5),
        importe: dec!(0.08),
    }];

    let first = serialize_cae_request(&auth(), &build_cae_request(&cab, &det)).unwrap();
    let second = serialize_cae_request(&auth(), &build_cae_request(&cab, &det)).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn last_voucher_request_carries_header_fields() {
    let xml = serialize_last_voucher_request(&auth(), &cab(FACTURA_A)).unwrap();
    assert!(xml.contains("<Cuit>20285142084</Cuit>"));
    assert!(xml.contains("<PtoVta>6</PtoVta>"));
    assert!(xml.contains("<CbteTipo>1</CbteTipo>"));
    assert!(xml.contains("xmlns=\"http://ar.gov.afip.dif.FEV1/\""));
}
