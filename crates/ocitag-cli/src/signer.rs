//! OCI API-key request signing (draft-cavage HTTP signatures, rsa-sha256).

use std::fs;

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE, HeaderMap, HeaderValue};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::OciProfile;

const X_CONTENT_SHA256: &str = "x-content-sha256";
const JSON: &str = "application/json";

pub struct RequestSigner {
    key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    pub fn from_profile(profile: &OciProfile) -> Result<Self> {
        if profile.pass_phrase.is_some() {
            anyhow::bail!(
                "Encrypted private keys (pass_phrase) are not supported; decrypt {} first",
                profile.key_file.display()
            );
        }
        let pem = fs::read_to_string(&profile.key_file).with_context(|| {
            format!("Failed to read private key {}", profile.key_file.display())
        })?;
        Self::from_pem(profile.key_id(), &pem)
            .with_context(|| format!("Invalid private key {}", profile.key_file.display()))
    }

    /// Accepts PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`).
    pub fn from_pem(key_id: impl Into<String>, pem: &str) -> Result<Self> {
        let key = if pem.contains("BEGIN RSA PRIVATE KEY") {
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| anyhow::anyhow!("PKCS#1 key: {e}"))?
        } else {
            RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| anyhow::anyhow!("PKCS#8 key: {e}"))?
        };
        Ok(Self {
            key_id: key_id.into(),
            signing_key: SigningKey::<Sha256>::new(key),
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Headers to add to the request: `date`, `authorization`, and for
    /// requests with a body `content-type`, `content-length` and
    /// `x-content-sha256`.
    pub fn sign(&self, method: &Method, url: &Url, body: Option<&[u8]>, date: &str) -> Result<HeaderMap> {
        let mut signed: Vec<(&str, String)> = vec![
            ("date", date.to_string()),
            ("(request-target)", request_target(method, url)),
            ("host", host(url)?),
        ];
        if let Some(body) = body {
            signed.push(("content-length", body.len().to_string()));
            signed.push(("content-type", JSON.to_string()));
            signed.push((X_CONTENT_SHA256, STANDARD.encode(Sha256::digest(body))));
        }

        let signature = self
            .signing_key
            .try_sign(signing_string(&signed).as_bytes())
            .map_err(|e| anyhow::anyhow!("Failed to sign request: {e}"))?;
        let header_names: Vec<&str> = signed.iter().map(|(name, _)| *name).collect();
        let authorization = format!(
            "Signature version=\"1\",keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
            self.key_id,
            header_names.join(" "),
            STANDARD.encode(signature.to_bytes())
        );

        let mut headers = HeaderMap::new();
        headers.insert(DATE, HeaderValue::from_str(date)?);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);
        if let Some(body) = body {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
            headers.insert(
                X_CONTENT_SHA256,
                HeaderValue::from_str(&STANDARD.encode(Sha256::digest(body)))?,
            );
        }
        Ok(headers)
    }
}

fn request_target(method: &Method, url: &Url) -> String {
    let method = method.as_str().to_ascii_lowercase();
    match url.query() {
        Some(query) => format!("{method} {}?{query}", url.path()),
        None => format!("{method} {}", url.path()),
    }
}

fn host(url: &Url) -> Result<String> {
    let host = url.host_str().context("Request URL has no host")?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn signing_string(signed: &[(&str, String)]) -> String {
    signed
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
