// 🔐 Holder-Name Cipher - AES-256-CBC tokens
// Reversible encryption of the sensitive holder name, stored as hex(iv):hex(ct)

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use anyhow::{anyhow, Context, Result};
use rand::{rngs::OsRng, RngCore};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256 key size in bytes
const KEY_LEN: usize = 32;

/// AES block / CBC IV size in bytes
const IV_LEN: usize = 16;

/// Byte used to right-pad secrets shorter than [`KEY_LEN`]
const KEY_FILLER: u8 = b'0';

/// Served in place of a holder name that cannot be decrypted.
/// A fixed marker, not a fabricated name: corrupted records stay visible
/// as corrupted instead of blending in with real data.
pub const UNDECRYPTABLE_HOLDER: &str = "[nombre no disponible]";

/// Symmetric cipher for holder names.
///
/// Tokens have the shape `hex(iv):hex(ciphertext)` with a fresh random IV
/// per encryption. Inputs that do not have that shape are treated as legacy
/// plain text and pass through `decrypt` unchanged.
pub struct EncryptionService {
    key: [u8; KEY_LEN],
}

impl EncryptionService {
    /// Build a cipher from a configured secret.
    ///
    /// The secret is normalized to exactly 32 bytes: truncated if longer,
    /// right-padded with `'0'` if shorter. Two secrets that agree on their
    /// first 32 normalized bytes produce the same key.
    pub fn new(secret: &str) -> Self {
        Self {
            key: normalize_key(secret),
        }
    }

    /// Encrypt a plain-text holder name into a storable token.
    ///
    /// Every call draws a fresh IV from the OS RNG. Reusing an IV would leak
    /// equality of repeated plaintexts, so the IV is never cached or derived.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
    }

    /// Decrypt a token back into the holder name.
    ///
    /// Never fails the caller: inputs without the two-part `iv:ct` shape are
    /// returned unchanged (legacy plain-text fixtures), and tokens that fail
    /// to decode or decrypt degrade to [`UNDECRYPTABLE_HOLDER`].
    pub fn decrypt(&self, token: &str) -> String {
        let parts: Vec<&str> = token.split(':').collect();
        if parts.len() != 2 {
            // Legacy fixtures store the name unencrypted
            return token.to_string();
        }

        match self.try_decrypt(parts[0], parts[1]) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                eprintln!("⚠️  Failed to decrypt holder name: {err}");
                UNDECRYPTABLE_HOLDER.to_string()
            }
        }
    }

    fn try_decrypt(&self, iv_hex: &str, data_hex: &str) -> Result<String> {
        let iv_bytes = hex::decode(iv_hex).context("IV is not valid hex")?;
        let iv: [u8; IV_LEN] = iv_bytes
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("IV must be {} bytes, got {}", IV_LEN, iv_bytes.len()))?;

        let ciphertext = hex::decode(data_hex).context("ciphertext is not valid hex")?;

        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| anyhow!("cipher rejected the token"))?;

        String::from_utf8(plaintext).context("decrypted bytes are not valid UTF-8")
    }
}

/// Normalize a secret to exactly [`KEY_LEN`] bytes.
fn normalize_key(secret: &str) -> [u8; KEY_LEN] {
    let mut key = [KEY_FILLER; KEY_LEN];
    let bytes = secret.as_bytes();
    let len = bytes.len().min(KEY_LEN);
    key[..len].copy_from_slice(&bytes[..len]);
    key
}

// ============================================================================
// TESTS
// ============================================================================
