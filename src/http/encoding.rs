//! Content codings for message bodies.
//!
//! Codings are looked up by name and handed out as trait objects, so adding
//! a scheme means adding an entry to [`lookup`] and nothing else.

use crate::http::error::HttpError;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};
use tracing::trace;

pub const IDENTITY: &str = "identity";
pub const GZIP: &str = "gzip";

/// Schemes the server is willing to produce, in no particular order.
const SUPPORTED: &[&str] = &[GZIP];

pub trait Encoder: Send + Sync {
    fn name(&self) -> &'static str;
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, HttpError>;
}

pub trait Decoder: Send + Sync {
    fn name(&self) -> &'static str;
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, HttpError>;
}

/// Passes bytes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Encoder for Identity {
    fn name(&self) -> &'static str {
        IDENTITY
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, HttpError> {
        Ok(input.to_vec())
    }
}

impl Decoder for Identity {
    fn name(&self) -> &'static str {
        IDENTITY
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, HttpError> {
        Ok(input.to_vec())
    }
}

/// gzip framing with default compression.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gzip;

impl Encoder for Gzip {
    fn name(&self) -> &'static str {
        GZIP
    }

    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, HttpError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(input).map_err(|e| {
            trace!("Error encoding gzip body: {}", e);
            HttpError::EncodeFailure(e)
        })?;
        encoder.finish().map_err(HttpError::EncodeFailure)
    }
}

impl Decoder for Gzip {
    fn name(&self) -> &'static str {
        GZIP
    }

    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, HttpError> {
        let mut decoded = Vec::new();
        GzDecoder::new(input)
            .read_to_end(&mut decoded)
            .map_err(HttpError::Decode)?;
        Ok(decoded)
    }
}

static IDENTITY_CODING: Identity = Identity;
static GZIP_CODING: Gzip = Gzip;

enum Coding {
    Identity,
    Gzip,
}

fn lookup(name: &str) -> Option<Coding> {
    if name.eq_ignore_ascii_case(IDENTITY) {
        Some(Coding::Identity)
    } else if name.eq_ignore_ascii_case(GZIP) {
        Some(Coding::Gzip)
    } else {
        None
    }
}

pub fn encoder(name: &str) -> Option<&'static dyn Encoder> {
    lookup(name.trim()).map(|coding| match coding {
        Coding::Identity => &IDENTITY_CODING as &'static dyn Encoder,
        Coding::Gzip => &GZIP_CODING as &'static dyn Encoder,
    })
}

pub fn decoder(name: &str) -> Option<&'static dyn Decoder> {
    lookup(name.trim()).map(|coding| match coding {
        Coding::Identity => &IDENTITY_CODING as &'static dyn Decoder,
        Coding::Gzip => &GZIP_CODING as &'static dyn Decoder,
    })
}

/// Picks the response coding for an `Accept-Encoding` value.
///
/// The first advertised entry the server supports wins. Parameters such as
/// `;q=0.5` are ignored. Falls back to identity.
pub fn negotiate(accept_encoding: Option<&str>) -> &'static dyn Encoder {
    accept_encoding
        .into_iter()
        .flat_map(|list| list.split(','))
        .map(|entry| entry.split(';').next().unwrap_or_default().trim())
        .find(|entry| SUPPORTED.iter().any(|s| s.eq_ignore_ascii_case(entry)))
        .and_then(encoder)
        .unwrap_or(&IDENTITY_CODING)
}

/// Decoder for a request body labelled with `content_encoding`.
///
/// No label means identity. An unknown label is an error.
pub fn request_decoder(content_encoding: Option<&str>) -> Result<&'static dyn Decoder, HttpError> {
    match content_encoding {
        None => Ok(&IDENTITY_CODING),
        Some(name) => decoder(name).ok_or_else(|| HttpError::UnsupportedEncoding(name.to_string())),
    }
}
