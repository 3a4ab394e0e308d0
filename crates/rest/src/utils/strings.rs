//! String helpers.

use rand::Rng;

const UNIQID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a short random identifier like `h7Uiq2-cPm91x`, twelve
/// alphanumeric characters with a dash in the middle. Used to tag requests
/// in log output.
pub fn uniqid() -> String {
    let mut rng = rand::thread_rng();
    let mut uniqid = String::with_capacity(13);
    for i in 0..12 {
        if i == 6 {
            uniqid.push('-');
        }
        let idx = rng.gen_range(0..UNIQID_CHARS.len());
        uniqid.push(char::from(UNIQID_CHARS[idx]));
    }
    uniqid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniqid_has_fixed_shape() {
        let id = uniqid();
        assert_eq!(id.len(), 13);
        assert_eq!(id.as_bytes()[6], b'-');
        for (i, c) in id.chars().enumerate() {
            if i == 6 {
                continue;
            }
            assert!(c.is_ascii_alphanumeric(), "unexpected char {c:?} in {id}");
        }
    }

    #[test]
    fn uniqid_is_not_constant() {
        let ids: std::collections::HashSet<String> = (0..32).map(|_| uniqid()).collect();
        assert!(ids.len() > 1);
    }
}
