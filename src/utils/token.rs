use rand::{RngCore, rngs::OsRng};

const TOKEN_BYTES: usize = 32;

/// Token opaque pour les liens d'invitation: 32 octets du générateur
/// du système, encodés en hex (64 caractères, 256 bits d'entropie)
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
