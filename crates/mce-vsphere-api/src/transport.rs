// Shared transport settings handed to a connector.
//
// The session layer decides the protocol, TLS policy, and pool tuning; the
// connector only consumes the finished `TransportConfig`. A TLS context is
// built only for `https` so plain-http endpoints never touch rustls.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::debug;

use crate::fault::Fault;

/// Scheme used to reach the SDK endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

/// Certificate verification policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Verify against the bundled web PKI roots.
    System,
    /// Verify against the certificates in a PEM bundle.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed vCenter appliances).
    DangerAcceptInvalid,
}

/// A ready-to-use TLS client context.
#[derive(Debug, Clone)]
pub struct TlsContext {
    config: Arc<ClientConfig>,
    verifies_certificates: bool,
}

impl TlsContext {
    /// Build a rustls client configuration for `mode`.
    pub fn build(mode: &TlsMode) -> Result<Self, Fault> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_safe_default_protocol_versions()
            .map_err(|e| Fault::Tls(format!("unsupported protocol versions: {e}")))?;

        let (config, verifies_certificates) = match mode {
            TlsMode::System => {
                let mut roots = RootCertStore::empty();
                roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
                (builder.with_root_certificates(roots).with_no_client_auth(), true)
            }
            TlsMode::CustomCa(path) => {
                let roots = load_ca_bundle(path)?;
                (builder.with_root_certificates(roots).with_no_client_auth(), true)
            }
            TlsMode::DangerAcceptInvalid => {
                debug!("certificate verification disabled");
                let verifier = AcceptAnyCertificate(provider);
                (
                    builder
                        .dangerous()
                        .with_custom_certificate_verifier(Arc::new(verifier))
                        .with_no_client_auth(),
                    false,
                )
            }
        };

        Ok(Self {
            config: Arc::new(config),
            verifies_certificates,
        })
    }

    /// The rustls configuration to hand to a TLS stream.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config)
    }

    /// Whether server certificates are validated.
    pub fn verifies_certificates(&self) -> bool {
        self.verifies_certificates
    }
}

fn load_ca_bundle(path: &Path) -> Result<RootCertStore, Fault> {
    let certs = CertificateDer::pem_file_iter(path)
        .map_err(|e| Fault::Tls(format!("failed to read CA bundle {}: {e}", path.display())))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Fault::Tls(format!("invalid CA bundle {}: {e}", path.display())))?;

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs);
    debug!(added, ignored, path = %path.display(), "loaded CA bundle");
    if added == 0 {
        return Err(Fault::Tls(format!(
            "no usable certificates in CA bundle {}",
            path.display()
        )));
    }
    Ok(roots)
}

/// Verifier that trusts every server certificate but still checks that
/// handshake signatures are well-formed.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

/// Transport settings for one session.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub protocol: Protocol,
    /// `None` for plain http.
    pub tls: Option<TlsContext>,
    /// Idle timeout for pooled connections; also bounds connect attempts.
    pub pool_timeout: Duration,
    /// Advisory connection pool size.
    pub pool_size: usize,
}

impl TransportConfig {
    /// Plain-http transport with no TLS context.
    pub fn plain(pool_timeout: Duration, pool_size: usize) -> Self {
        Self {
            protocol: Protocol::Http,
            tls: None,
            pool_timeout,
            pool_size,
        }
    }

    /// `https` transport with a context built for `mode`.
    pub fn secure(mode: &TlsMode, pool_timeout: Duration, pool_size: usize) -> Result<Self, Fault> {
        Ok(Self {
            protocol: Protocol::Https,
            tls: Some(TlsContext::build(mode)?),
            pool_timeout,
            pool_size,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn protocol_display_is_lowercase() {
        assert_eq!(Protocol::Https.to_string(), "https");
        assert_eq!("http".parse::<Protocol>().unwrap(), Protocol::Http);
    }

    #[test]
    fn plain_transport_has_no_tls() {
        let transport = TransportConfig::plain(Duration::from_secs(60), 5);
        assert_eq!(transport.protocol, Protocol::Http);
        assert!(transport.tls.is_none());
    }

    #[test]
    fn system_roots_verify() {
        let transport =
            TransportConfig::secure(&TlsMode::System, Duration::from_secs(60), 5).unwrap();
        assert_eq!(transport.protocol, Protocol::Https);
        assert!(transport.tls.unwrap().verifies_certificates());
    }

    #[test]
    fn insecure_mode_skips_verification() {
        let ctx = TlsContext::build(&TlsMode::DangerAcceptInvalid).unwrap();
        assert!(!ctx.verifies_certificates());
    }

    #[test]
    fn missing_ca_bundle_is_a_tls_fault() {
        let err = TlsContext::build(&TlsMode::CustomCa("/nonexistent/ca.pem".into())).unwrap_err();
        assert!(matches!(err, Fault::Tls(_)), "got {err:?}");
    }

    #[test]
    fn empty_ca_bundle_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a certificate").unwrap();
        let err = TlsContext::build(&TlsMode::CustomCa(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("no usable certificates"), "got {err}");
    }
}
