//! Certificate material handed to deployers.

use ::pem::{EncodeConfig, LineEnding, Pem};
use sha2::{Digest, Sha256};
use std::fmt;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::*;

use crate::{Error, Result};

/// A PEM certificate chain and its private key.
#[derive(Clone, PartialEq, Eq)]
pub struct CertificateMaterial {
    certificate: String,
    private_key: String,
}

impl CertificateMaterial {
    pub fn new(certificate: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            certificate: certificate.into(),
            private_key: private_key.into(),
        }
    }

    /// Full certificate chain, leaf first.
    pub fn certificate_pem(&self) -> &str {
        &self.certificate
    }

    pub fn private_key_pem(&self) -> &str {
        &self.private_key
    }

    /// Check both PEM documents before anything leaves the process.
    pub fn validate(&self) -> Result<()> {
        self.chain()?;
        parse_private_key(&self.private_key)?;
        Ok(())
    }

    /// Decode every `CERTIFICATE` block of the chain.
    pub fn chain(&self) -> Result<Vec<Pem>> {
        if self.certificate.trim().is_empty() {
            return Err(Error::MalformedCertificate(
                "certificate PEM is empty".to_string(),
            ));
        }

        let blocks = ::pem::parse_many(self.certificate.as_bytes())
            .map_err(|e| Error::MalformedCertificate(format!("failed to parse PEM: {}", e)))?;
        let certs: Vec<Pem> = blocks
            .into_iter()
            .filter(|p| p.tag() == "CERTIFICATE")
            .collect();
        if certs.is_empty() {
            return Err(Error::MalformedCertificate(
                "no CERTIFICATE block found".to_string(),
            ));
        }

        for cert in &certs {
            X509Certificate::from_der(cert.contents()).map_err(|e| {
                Error::MalformedCertificate(format!("invalid X509 certificate: {}", e))
            })?;
        }

        Ok(certs)
    }

    /// Parse the leaf certificate.
    pub fn leaf(&self) -> Result<LeafCertificate> {
        let chain = self.chain()?;
        let leaf = &chain[0];
        let (_, cert) = X509Certificate::from_der(leaf.contents()).map_err(|e| {
            Error::MalformedCertificate(format!("invalid X509 certificate: {}", e))
        })?;

        let mut dns_names = Vec::new();
        if let Ok(Some(san)) = cert.subject_alternative_name() {
            for name in &san.value.general_names {
                if let GeneralName::DNSName(dns) = name {
                    dns_names.push(dns.to_string());
                }
            }
        }

        let common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(|s| s.to_string());

        Ok(LeafCertificate {
            common_name,
            dns_names,
            serial: cert.raw_serial_as_string(),
            not_after: cert.validity().not_after.timestamp(),
        })
    }

    /// Split the chain into the leaf PEM and the remaining intermediates.
    pub fn split_chain(&self) -> Result<(String, String)> {
        let chain = self.chain()?;
        let leaf = encode_lf(&chain[0]);
        let intermediates = chain[1..]
            .iter()
            .map(encode_lf)
            .collect::<Vec<_>>()
            .join("");
        Ok((leaf, intermediates))
    }

    /// Hex SHA-256 over the DER of the leaf certificate.
    pub fn fingerprint(&self) -> Result<String> {
        let chain = self.chain()?;
        Ok(hex::encode(Sha256::digest(chain[0].contents())))
    }
}

impl fmt::Debug for CertificateMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateMaterial")
            .field("certificate_len", &self.certificate.len())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Fields of the leaf certificate that deployers care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafCertificate {
    pub common_name: Option<String>,
    pub dns_names: Vec<String>,
    pub serial: String,
    /// Unix timestamp.
    pub not_after: i64,
}

fn encode_lf(block: &Pem) -> String {
    ::pem::encode_config(block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

fn parse_private_key(key: &str) -> Result<Pem> {
    if key.trim().is_empty() {
        return Err(Error::MalformedCertificate(
            "private key PEM is empty".to_string(),
        ));
    }

    let block = ::pem::parse(key.as_bytes())
        .map_err(|e| Error::MalformedCertificate(format!("failed to parse private key: {}", e)))?;
    if !block.tag().ends_with("PRIVATE KEY") {
        return Err(Error::MalformedCertificate(format!(
            "expected a private key, found '{}'",
            block.tag()
        )));
    }
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN: &str = include_str!("../../../testdata/chain.pem");
    const LEAF: &str = include_str!("../../../testdata/leaf.pem");
    const KEY: &str = include_str!("../../../testdata/privkey.pem");

    #[test]
    fn test_validate_accepts_chain_and_key() {
        let material = CertificateMaterial::new(CHAIN, KEY);
        assert!(material.validate().is_ok());
        assert_eq!(material.chain().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_certificate_is_malformed() {
        let err = CertificateMaterial::new("", KEY).validate().unwrap_err();
        assert!(matches!(err, Error::MalformedCertificate(_)));
    }

    #[test]
    fn test_garbage_key_is_malformed() {
        let err = CertificateMaterial::new(CHAIN, "not a key")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::MalformedCertificate(_)));
    }

    #[test]
    fn test_certificate_in_key_slot_is_rejected() {
        let err = CertificateMaterial::new(CHAIN, LEAF).validate().unwrap_err();
        assert!(err.to_string().contains("expected a private key"));
    }

    #[test]
    fn test_leaf_dns_names() {
        let leaf = CertificateMaterial::new(CHAIN, KEY).leaf().unwrap();
        assert_eq!(leaf.common_name.as_deref(), Some("example.com"));
        assert_eq!(leaf.dns_names, vec!["example.com", "*.example.com"]);
        assert_eq!(
            leaf.serial,
            "10:29:2b:5d:e6:ff:59:1b:31:83:a8:45:52:bd:35:80:30:fc:02:c7"
        );
        assert_eq!(leaf.not_after, 2107563260);
    }

    #[test]
    fn test_split_chain() {
        let material = CertificateMaterial::new(CHAIN, KEY);
        let (leaf, intermediates) = material.split_chain().unwrap();
        assert_eq!(::pem::parse_many(&leaf).unwrap().len(), 1);
        assert_eq!(::pem::parse_many(&intermediates).unwrap().len(), 1);

        let single = CertificateMaterial::new(LEAF, KEY);
        let (_, intermediates) = single.split_chain().unwrap();
        assert!(intermediates.is_empty());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = CertificateMaterial::new(CHAIN, KEY).fingerprint().unwrap();
        let b = CertificateMaterial::new(LEAF, KEY).fingerprint().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let debug = format!("{:?}", CertificateMaterial::new(CHAIN, KEY));
        assert!(!debug.contains("PRIVATE KEY"));
    }
}
