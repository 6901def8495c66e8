//! Integration tests for wallet address validation and text scanning.

use walletscope::security::{extract_wallet_address, is_valid_wallet_address};

#[test]
fn test_full_base58_alphabet_is_accepted() {
    // Every character of the base-58 alphabet, split into in-range chunks.
    let alphabet = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
    let (first, second) = alphabet.split_at(alphabet.len() / 2);
    let first = format!("{first}{first}");
    assert!(is_valid_wallet_address(&first[..40]));
    let second = format!("{second}{second}");
    assert!(is_valid_wallet_address(&second[..40]));
}

#[test]
fn test_excluded_characters_rejected_anywhere() {
    let valid = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";
    for bad in ['0', 'I', 'O', 'l', ' ', '!', '$'] {
        let mut s: Vec<char> = valid.chars().collect();
        s[10] = bad;
        let s: String = s.into_iter().collect();
        assert!(!is_valid_wallet_address(&s), "accepted {s:?}");
    }
}

#[test]
fn test_length_boundaries() {
    let c = "A";
    assert!(!is_valid_wallet_address(&c.repeat(31)));
    assert!(is_valid_wallet_address(&c.repeat(32)));
    assert!(is_valid_wallet_address(&c.repeat(44)));
    assert!(!is_valid_wallet_address(&c.repeat(45)));
}

#[test]
fn test_scanner_picks_first_valid_token() {
    let text = "two wallets: 9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM \
                and TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
    assert_eq!(
        extract_wallet_address(text),
        Some("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM")
    );
}

#[test]
fn test_scanner_ignores_invalid_lookalikes() {
    // Contains 'l' and 'O', not in the alphabet.
    let text = "look at llllllllllllllllllllllllllllllllll and OOOOOOOOOOOOOOOOOOOOOOOOOOOOOOOOOO";
    assert_eq!(extract_wallet_address(text), None);
}
