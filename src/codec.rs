//! Reversible transform between plan text and a compact, URL-safe token.
//!
//! Tokens are gzip-compressed UTF-8, base64-encoded, with `+`/`/` swapped for `-`/`_` and the
//! `=` padding stripped, so they survive URL fragments and path segments without
//! percent-encoding.

// std
use std::io::{Read, Write};
// crates.io
use base64::{
	Engine as _,
	engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
// self
use crate::{
	_prelude::*,
	obs::{OpKind, OpOutcome, OpSpan},
};

/// Failure raised when a token cannot be turned back into plan text.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum DecodeError {
	/// The token is not valid base64 once the URL-safe substitution is reversed.
	#[error("Token is not valid base64: {message}.")]
	InvalidBase64 {
		/// Decoder diagnostic.
		message: String,
	},
	/// The decoded bytes are not a complete gzip stream.
	#[error("Token payload could not be decompressed: {message}.")]
	Decompress {
		/// Decompressor diagnostic.
		message: String,
	},
	/// The decompressed payload is not UTF-8 text.
	#[error("Token payload is not valid UTF-8.")]
	InvalidUtf8,
	/// The decompressed payload exceeds the caller-supplied bound.
	#[error("Token payload exceeds {limit} bytes.")]
	TooLarge {
		/// Maximum permitted payload size in bytes.
		limit: usize,
	},
}

/// Encodes plan text into a token drawn from `[A-Za-z0-9_-]`.
pub fn encode(text: &str) -> String {
	let op = OpSpan::new(OpKind::Encode, "encode").entered();
	let mut encoder = GzEncoder::new(Vec::with_capacity(text.len() / 2), Compression::default());

	// Writing into a `Vec` cannot fail.
	let compressed = match encoder.write_all(text.as_bytes()).and_then(|_| encoder.finish()) {
		Ok(bytes) => bytes,
		Err(_) => unreachable!("in-memory gzip encoding is infallible"),
	};
	// The URL-safe alphabet is the standard one with `+`/`/` swapped for `-`/`_`.
	let token = URL_SAFE_NO_PAD.encode(compressed);

	op.finish(OpOutcome::Success);

	token
}

/// Decodes a token produced by [`encode`].
pub fn decode(token: &str) -> Result<String, DecodeError> {
	decode_inner(token, None)
}

/// Decodes a token, rejecting payloads that inflate beyond `max_bytes`.
pub fn decode_with_limit(token: &str, max_bytes: usize) -> Result<String, DecodeError> {
	decode_inner(token, Some(max_bytes))
}

fn decode_inner(token: &str, limit: Option<usize>) -> Result<String, DecodeError> {
	let op = OpSpan::new(OpKind::Decode, "decode").entered();
	let result = restore_base64(token)
		.and_then(|compressed| inflate(&compressed, limit))
		.and_then(|bytes| String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8));

	match &result {
		Ok(_) => op.finish(OpOutcome::Success),
		Err(_e) => {
			op.finish(OpOutcome::Failure);

			#[cfg(feature = "tracing")]
			tracing::debug!(error = %_e, token_len = token.len(), "rejected plan token");
		},
	}

	result
}

fn restore_base64(token: &str) -> Result<Vec<u8>, DecodeError> {
	let mut standard: String = token
		.chars()
		.map(|c| match c {
			'-' => '+',
			'_' => '/',
			other => other,
		})
		.collect();

	let padding = (4 - standard.len() % 4) % 4;

	standard.extend(std::iter::repeat_n('=', padding));

	STANDARD
		.decode(standard.as_bytes())
		.map_err(|e| DecodeError::InvalidBase64 { message: e.to_string() })
}

fn inflate(compressed: &[u8], limit: Option<usize>) -> Result<Vec<u8>, DecodeError> {
	let mut out = Vec::new();
	let mut decoder = GzDecoder::new(compressed);
	let read = match limit {
		// One byte past the limit is enough to detect an oversized payload.
		Some(max) => decoder.by_ref().take((max as u64).saturating_add(1)).read_to_end(&mut out),
		None => decoder.read_to_end(&mut out),
	};

	read.map_err(|e| DecodeError::Decompress { message: e.to_string() })?;

	match limit {
		Some(max) if out.len() > max => Err(DecodeError::TooLarge { limit: max }),
		_ => Ok(out),
	}
}
