// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executable signature verification.
//!
//! The chain is MD5(executable) → SHA-256 → RSA-PKCS1-v1.5 against the
//! compiled-in 1024-bit public key. The MD5-then-SHA-256 construction is
//! the contract with the external package builder and existing signed
//! packages depend on it byte-for-byte.

use appctl_core::AppError;
use md5::Md5;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

/// Public half of the package-builder signing key.
pub const RSA_PUBLIC_KEY_PEM: &str = "\
-----BEGIN RSA PUBLIC KEY-----
MIGJAoGBAMR1cPbxGZajytYm7YWV6IAbrBUbLo7QkfRpyE2IW4XKF/7kBBwDgpVd
ok/lSZ4ulihEhH8CmbXQegTXWY9Kj98hoUVuIlzUV+SwUG/dCYTh5xtO2nC/vQ/2
XKvakFVPif5Mv1XG76ot9utpQcD8wuH5ywksgvKqQwY/YoBAmFWBAgMBAAE=
-----END RSA PUBLIC KEY-----
";

/// Signature check outcome; I/O problems surface as `Err` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    Mismatch,
}

/// Streamed MD5 of a file.
fn md5_digest(path: &Path) -> Result<[u8; 16], AppError> {
    if !path.exists() {
        return Err(AppError::MissingFile(path.to_path_buf()));
    }
    let mut file = File::open(path).map_err(AppError::Read)?;
    let mut hasher = Md5::new();
    std::io::copy(&mut file, &mut hasher).map_err(AppError::Read)?;
    Ok(hasher.finalize().into())
}

/// Hex MD5 of an executable, as recorded in the task table.
pub fn md5_hex(path: &Path) -> Result<String, AppError> {
    let digest = md5_digest(path)?;
    let mut out = String::with_capacity(32);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    Ok(out)
}

/// Verify `signature` over the executable at `bin`.
pub fn verify_executable(bin: &Path, signature: &[u8]) -> Result<Verdict, AppError> {
    let digest = md5_digest(bin)?;
    let hashed = Sha256::digest(digest);

    let key = RsaPublicKey::from_pkcs1_pem(RSA_PUBLIC_KEY_PEM)
        .map_err(|e| AppError::Decode(e.to_string()))?;

    match key.verify(Pkcs1v15Sign::new::<Sha256>(), hashed.as_slice(), signature) {
        Ok(()) => Ok(Verdict::Verified),
        Err(_) => Ok(Verdict::Mismatch),
    }
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
