use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// AFIP environment a service instance binds to at construction.
///
/// Selects which fixed pair of endpoint URLs (WSAA + WSFE) the clients
/// talk to. Immutable for the lifetime of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    /// Homologación (testing) endpoints.
    Testing,
    /// Producción endpoints.
    Production,
}

/// Comprobante type codes (WSFE `CbteTipo`).
pub const FACTURA_A: i32 = 1;
pub const NOTA_CREDITO_A: i32 = 3;
pub const FACTURA_B: i32 = 6;
pub const NOTA_CREDITO_B: i32 = 8;
pub const FACTURA_C: i32 = 11;
pub const NOTA_CREDITO_C: i32 = 13;

/// Whether a voucher type belongs to the "C" class, which is VAT-exempt by
/// regulation and must never carry a VAT breakdown block.
pub fn is_vat_exempt_voucher_type(cbte_tipo: i32) -> bool {
    cbte_tipo == FACTURA_C || cbte_tipo == NOTA_CREDITO_C
}

/// Invoice header supplied by the caller on every request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CabRequest {
    /// Issuer's CUIT (11-digit taxpayer id).
    pub cuit: i64,
    /// Point of sale number (`PtoVta`).
    pub pto_vta: i32,
    /// Voucher type code (`CbteTipo`).
    pub cbte_tipo: i32,
}

/// One VAT-rate breakdown entry (WSFE `AlicIva`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VatRateItem {
    /// VAT rate code (e.g. 5 = 21%).
    pub id: i32,
    /// Taxable base for this rate.
    #[serde(with = "rust_decimal::serde::float")]
    pub base_imp: Decimal,
    /// VAT amount for this rate.
    #[serde(with = "rust_decimal::serde::float")]
    pub importe: Decimal,
}

/// One levy/tribute entry (WSFE `Tributo`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxItem {
    /// Tribute code.
    pub id: i16,
    /// Taxable base.
    #[serde(with = "rust_decimal::serde::float")]
    pub base_imp: Decimal,
    /// Free-text description.
    pub desc: String,
    /// Rate percentage. The capitalized JSON key is part of the legacy
    /// caller contract.
    #[serde(rename = "Alic", with = "rust_decimal::serde::float")]
    pub alic: Decimal,
    /// Levy amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub importe: Decimal,
}

/// Invoice detail supplied by the caller for one CAE solicitation.
///
/// One voucher per request: `cbte_desde` and `cbte_hasta` are equal in
/// practice. Amounts arrive as JSON numbers and are held as [`Decimal`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaeRequest {
    /// Receiver document type (`DocTipo`, e.g. 80 = CUIT, 96 = DNI).
    pub doc_tipo: i32,
    /// Receiver document number.
    pub doc_nro: i64,
    /// First voucher number of the range.
    pub cbte_desde: i64,
    /// Last voucher number of the range.
    pub cbte_hasta: i64,
    /// Voucher date, `yyyymmdd`.
    pub cbte_fch: String,
    /// Net taxable amount (`ImpNeto`).
    #[serde(with = "rust_decimal::serde::float")]
    pub imp_neto: Decimal,
    /// Exempt amount (`ImpOpEx`).
    #[serde(with = "rust_decimal::serde::float")]
    pub imp_op_ex: Decimal,
    /// Untaxed-concepts amount (`ImpTotConc`).
    #[serde(with = "rust_decimal::serde::float")]
    pub imp_tot_conc: Decimal,
    /// Voucher total (`ImpTotal`).
    #[serde(with = "rust_decimal::serde::float")]
    pub imp_total: Decimal,
    /// Total levies (`ImpTrib`).
    #[serde(with = "rust_decimal::serde::float")]
    pub imp_trib: Decimal,
    /// Total VAT (`ImpIVA`).
    #[serde(rename = "impIVA", with = "rust_decimal::serde::float")]
    pub imp_iva: Decimal,
    /// VAT breakdown entries.
    #[serde(rename = "ivasArray")]
    pub ivas: Vec<VatRateItem>,
    /// Levy entries.
    #[serde(rename = "tributosArray")]
    pub tributos: Vec<TaxItem>,
    /// Associated-voucher type, for credit/debit notes referencing a prior
    /// voucher. Zero when there is no reference.
    pub cbte_tipo_ref: i32,
    /// Associated-voucher number. Zero when there is no reference.
    pub cbte_nro_ref: i64,
    /// Receiver's VAT condition code (`CondicionIVAReceptorId`).
    #[serde(rename = "condicionIVAReceptorId")]
    pub condicion_iva_receptor_id: i32,
}
