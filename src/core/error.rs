use thiserror::Error;

/// Errors surfaced by the WSAA and WSFE clients.
///
/// Every variant message names the operation it came from, so the text is
/// usable as-is across the C boundary where only a string survives.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AfipError {
    /// Certificate or private key could not be loaded.
    #[error("GetLoginTicket: {0}")]
    KeyLoad(#[from] KeyLoadError),

    /// CMS signing of the login ticket request failed.
    #[error("GetLoginTicket: CMS signing failed: {0}")]
    Signing(String),

    /// WSAA transport failure or SOAP fault.
    #[error("GetLoginTicket: {0}")]
    AuthTransport(String),

    /// WSFE transport failure or SOAP fault.
    #[error("{op}: {detail}")]
    Remote {
        /// Name of the WSFE operation that failed.
        op: &'static str,
        /// Transport diagnostic or the peer's fault/error message.
        detail: String,
    },

    /// Peer response XML could not be parsed.
    #[error("{op}: malformed response: {detail}")]
    ResponseParse {
        /// Name of the operation whose response was malformed.
        op: &'static str,
        /// Parse diagnostic.
        detail: String,
    },

    /// A cached ticket carries an unparseable expiration timestamp.
    #[error("GetLoginTicket: invalid ticket expiration: {0}")]
    TicketParse(String),

    /// XML construction error.
    #[error("XML error: {0}")]
    Xml(String),

    /// WSFE rejected the CAE request. The message is AFIP's own
    /// taxpayer-facing diagnostic, passed through verbatim.
    #[error("{0}")]
    CaeRejected(String),
}

impl AfipError {
    pub(crate) fn remote(op: &'static str, detail: impl Into<String>) -> Self {
        Self::Remote {
            op,
            detail: detail.into(),
        }
    }

    pub(crate) fn response_parse(op: &'static str, detail: impl Into<String>) -> Self {
        Self::ResponseParse {
            op,
            detail: detail.into(),
        }
    }
}

/// Certificate/private key loading failure.
///
/// The three failure classes are kept distinct per file so operators can
/// tell a misconfigured path from a corrupted PEM from a key in the wrong
/// format.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeyLoadError {
    /// The certificate file could not be read.
    #[error("certificate file not found: {path}: {source}")]
    CertificateRead {
        path: String,
        source: std::io::Error,
    },

    /// The private key file could not be read.
    #[error("key file not found: {path}: {source}")]
    KeyRead {
        path: String,
        source: std::io::Error,
    },

    /// The certificate file is not PEM-armored.
    #[error("could not decode certificate PEM: {path}")]
    CertificatePem { path: String },

    /// The key file is not PEM-armored.
    #[error("could not decode key PEM: {path}")]
    KeyPem { path: String },

    /// The PEM decoded but does not hold a valid X.509 certificate.
    #[error("could not parse certificate: {path}: {detail}")]
    CertificateParse { path: String, detail: String },

    /// The PEM decoded but does not hold a valid RSA private key.
    #[error("could not parse private key: {path}: {detail}")]
    KeyParse { path: String, detail: String },
}
