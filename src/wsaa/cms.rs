//! X.509 key pair loading and CMS signing of login ticket requests.

use std::path::Path;

use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, Private};
use openssl::stack::Stack;
use openssl::x509::X509;

use crate::core::{AfipError, KeyLoadError};

/// A loaded signing identity: the taxpayer's AFIP-issued certificate and
/// its RSA private key.
#[derive(Debug)]
pub struct KeyPair {
    certificate: X509,
    private_key: PKey<Private>,
}

fn has_pem_armor(data: &[u8]) -> bool {
    data.windows(10).any(|w| w == b"-----BEGIN")
}

/// Load certificate and private key from PEM files.
///
/// The failure classes stay distinct per file — a missing path, a file
/// that is not PEM at all, and PEM holding a structure OpenSSL cannot
/// parse each produce their own [`KeyLoadError`] variant naming the path.
pub fn load_key_pair(
    cert_path: impl AsRef<Path>,
    key_path: impl AsRef<Path>,
) -> Result<KeyPair, KeyLoadError> {
    let cert_path = cert_path.as_ref();
    let key_path = key_path.as_ref();

    let cert_data =
        std::fs::read(cert_path).map_err(|source| KeyLoadError::CertificateRead {
            path: cert_path.display().to_string(),
            source,
        })?;
    let key_data = std::fs::read(key_path).map_err(|source| KeyLoadError::KeyRead {
        path: key_path.display().to_string(),
        source,
    })?;

    if !has_pem_armor(&cert_data) {
        return Err(KeyLoadError::CertificatePem {
            path: cert_path.display().to_string(),
        });
    }
    if !has_pem_armor(&key_data) {
        return Err(KeyLoadError::KeyPem {
            path: key_path.display().to_string(),
        });
    }

    let certificate = X509::from_pem(&cert_data).map_err(|e| KeyLoadError::CertificateParse {
        path: cert_path.display().to_string(),
        detail: e.to_string(),
    })?;
    let private_key =
        PKey::private_key_from_pem(&key_data).map_err(|e| KeyLoadError::KeyParse {
            path: key_path.display().to_string(),
            detail: e.to_string(),
        })?;

    Ok(KeyPair {
        certificate,
        private_key,
    })
}

/// CMS-sign a serialized login ticket request.
///
/// Produces a PKCS#7 SignedData structure in DER with the content
/// embedded, which is what WSAA's `loginCms` operation expects (the
/// caller base64-encodes it for transport).
pub(crate) fn sign_ticket_request(content: &[u8], pair: &KeyPair) -> Result<Vec<u8>, AfipError> {
    let extra_certs =
        Stack::new().map_err(|e| AfipError::Signing(format!("cert stack: {e}")))?;
    let signed = Pkcs7::sign(
        &pair.certificate,
        &pair.private_key,
        &extra_certs,
        content,
        Pkcs7Flags::empty(),
    )
    .map_err(|e| AfipError::Signing(e.to_string()))?;
    signed
        .to_der()
        .map_err(|e| AfipError::Signing(format!("DER encoding: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_certificate_file_is_distinguishable() {
        let err = load_key_pair("/nonexistent/cert.crt", "/nonexistent/cert.key").unwrap_err();
        assert!(matches!(err, KeyLoadError::CertificateRead { .. }));
        assert!(err.to_string().contains("/nonexistent/cert.crt"));
    }

    #[test]
    fn non_pem_certificate_is_distinguishable() {
        let dir = std::env::temp_dir();
        let cert = dir.join("wsfe-test-not-pem.crt");
        let key = dir.join("wsfe-test-not-pem.key");
        std::fs::write(&cert, b"definitely not pem").unwrap();
        std::fs::write(&key, b"also not pem").unwrap();

        let err = load_key_pair(&cert, &key).unwrap_err();
        assert!(matches!(err, KeyLoadError::CertificatePem { .. }));
    }

    #[test]
    fn pem_armor_with_garbage_body_fails_parse() {
        let dir = std::env::temp_dir();
        let cert = dir.join("wsfe-test-bad-body.crt");
        let key = dir.join("wsfe-test-bad-body.key");
        let bogus = "-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";
        std::fs::write(&cert, bogus).unwrap();
        std::fs::write(&key, bogus).unwrap();

        let err = load_key_pair(&cert, &key).unwrap_err();
        assert!(matches!(err, KeyLoadError::CertificateParse { .. }));
    }
}
