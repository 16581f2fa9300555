const HALF_LEN: usize = 12;

/// senseBox ids are 12 hex characters, or two such halves back to back.
pub fn is_valid_box_id(box_id: &str) -> bool {
    let len = box_id.len();
    if len != HALF_LEN && len != HALF_LEN * 2 {
        return false;
    }
    box_id.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::is_valid_box_id;

    #[test]
    fn accepts_full_and_half_length_ids() {
        assert!(is_valid_box_id("5eba5fbad46fb8001b799786"));
        assert!(is_valid_box_id("5eba5fbad46f"));
    }

    #[test]
    fn accepts_upper_case_hex() {
        assert!(is_valid_box_id("5EBA5FBAD46FB8001B799786"));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!is_valid_box_id("invalid_box_id_12345"));
        assert!(!is_valid_box_id(""));
        assert!(!is_valid_box_id("5eba5fbad46fb8001b79978"));
        assert!(!is_valid_box_id("5eba5fbad46fb8001b7997860"));
        assert!(!is_valid_box_id("5eba5fbad46g"));
        assert!(!is_valid_box_id(" 5eba5fbad46f"));
    }

    #[test]
    fn rejects_multibyte_input_of_matching_byte_length() {
        // "é" is two bytes, so this is 12 bytes but not 12 hex characters.
        assert!(!is_valid_box_id("5eba5fbad4é"));
    }
}
