/// Strip everything but digits; phones are stored normalized and masked
/// only for display.
pub fn normalize_phone(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Display mask for Brazilian landline (10 digits) and mobile (11 digits)
/// numbers. Anything else is returned as the bare digit string.
pub fn mask_phone(input: &str) -> String {
    let digits = normalize_phone(input);
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        _ => digits,
    }
}
