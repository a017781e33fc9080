use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::Hmac;
use pbkdf2::pbkdf2;
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore, rngs::OsRng};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[cfg(not(test))]
const ITERATIONS: u32 = 260000;
// Les tests hashent beaucoup, on réduit le coût
#[cfg(test)]
const ITERATIONS: u32 = 1000;

const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const TEMPORARY_PASSWORD_LENGTH: usize = 16;

/// Politique des mots de passe: 8 caractères minimum, au moins une
/// majuscule, une minuscule et un chiffre
pub fn check_policy(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain a digit");
    }
    Ok(())
}

/// Hash un mot de passe avec PBKDF2-HMAC-SHA256 et un salt de 16 bytes
/// Format: pbkdf2:sha256:iterations$salt$hash (base64 URL-safe sans padding)
pub fn hash_password(password: &str) -> Result<String, String> {
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, ITERATIONS, &mut key)
        .map_err(|e| format!("PBKDF2 hash generation failed: {}", e))?;

    let salt_b64 = URL_SAFE_NO_PAD.encode(salt);
    let hash_b64 = URL_SAFE_NO_PAD.encode(key);

    Ok(format!("pbkdf2:sha256:{}${}${}", ITERATIONS, salt_b64, hash_b64))
}

/// Hash "inutilisable" pour un compte en attente de son mot de passe:
/// c'est le hash d'octets aléatoires qui sont ensuite jetés, donc aucun
/// mot de passe saisi ne peut le vérifier
pub fn unusable_hash() -> Result<String, String> {
    let mut secret = [0u8; KEY_LENGTH];
    OsRng.fill_bytes(&mut secret);
    hash_password(&hex::encode(secret))
}

/// Mot de passe temporaire pour les agents (respecte la politique)
pub fn generate_temporary_password() -> String {
    loop {
        let candidate: String = OsRng
            .sample_iter(&Alphanumeric)
            .take(TEMPORARY_PASSWORD_LENGTH)
            .map(char::from)
            .collect();
        if check_policy(&candidate).is_ok() {
            return candidate;
        }
    }
}

/// Vérifie un mot de passe contre un hash stocké
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    // Parser le format: pbkdf2:sha256:iterations$salt$hash
    let parts: Vec<&str> = stored_hash.split('$').collect();
    if parts.len() != 3 {
        return Err("Invalid hash format".to_string());
    }

    let header_parts: Vec<&str> = parts[0].split(':').collect();
    if header_parts.len() != 3 || header_parts[0] != "pbkdf2" || header_parts[1] != "sha256" {
        return Err("Invalid header".to_string());
    }

    let iterations = header_parts[2]
        .parse::<u32>()
        .map_err(|_| "Invalid iterations".to_string())?;

    let salt = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|e| format!("Invalid salt: {}", e))?;
    let expected_hash = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|e| format!("Invalid hash: {}", e))?;

    let mut computed = vec![0u8; expected_hash.len()];
    pbkdf2::<HmacSha256>(password.as_bytes(), &salt, iterations, &mut computed)
        .map_err(|e| format!("PBKDF2 hash verification failed: {}", e))?;

    Ok(constant_time_eq(&computed, &expected_hash))
}

// Comparaison sans sortie anticipée (timing attacks)
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Abcdefg1").unwrap();

        assert!(hash.starts_with("pbkdf2:sha256:"));
        assert!(verify_password("Abcdefg1", &hash).unwrap());
        assert!(!verify_password("Abcdefg2", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let first = hash_password("Abcdefg1").unwrap();
        let second = hash_password("Abcdefg1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(verify_password("Abcdefg1", "not-a-hash").is_err());
        assert!(verify_password("Abcdefg1", "md5:x:1$a$b").is_err());
    }

    #[test]
    fn test_unusable_hash_never_verifies() {
        let hash = unusable_hash().unwrap();
        for attempt in ["", "Abcdefg1", "password", "!"] {
            assert!(!verify_password(attempt, &hash).unwrap());
        }
    }

    #[test]
    fn test_password_policy() {
        assert!(check_policy("abc").is_err());
        assert!(check_policy("abcdefg1").is_err()); // pas de majuscule
        assert!(check_policy("ABCDEFG1").is_err()); // pas de minuscule
        assert!(check_policy("Abcdefgh").is_err()); // pas de chiffre
        assert!(check_policy("Abc1").is_err());
        assert!(check_policy("Abcdefg1").is_ok());
        assert!(check_policy("Abcdef12").is_ok());
    }

    #[test]
    fn test_temporary_password_respects_policy() {
        for _ in 0..20 {
            let password = generate_temporary_password();
            assert_eq!(password.len(), 16);
            assert!(check_policy(&password).is_ok());
        }
    }
}
