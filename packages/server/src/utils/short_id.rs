use rand::Rng;

/// Length of generated short ids.
const GENERATED_LEN: usize = 10;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LETTERS_AND_DIGITS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random URL-safe short id.
///
/// The first character is always a letter: an all-digit short id would be
/// ambiguous with a numeric competition id in lookups.
pub fn generate() -> String {
    let mut rng = rand::rng();
    let mut id = String::with_capacity(GENERATED_LEN);
    id.push(LETTERS[rng.random_range(0..LETTERS.len())] as char);
    for _ in 1..GENERATED_LEN {
        id.push(LETTERS_AND_DIGITS[rng.random_range(0..LETTERS_AND_DIGITS.len())] as char);
    }
    id
}

/// Validate a user-supplied short id, returning the trimmed slug.
pub fn validate(short_id: &str) -> Result<&str, &'static str> {
    let trimmed = short_id.trim();

    if trimmed.len() < 3 || trimmed.len() > 64 {
        return Err("Short id must be 3-64 characters");
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_'))
    {
        return Err("Short id may only contain a-z, 0-9, '-' and '_'");
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err("Short id must contain at least one letter");
    }

    Ok(trimmed)
}
