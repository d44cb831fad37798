/// Format a Brazilian phone number for display.
/// Normalizes to `(XX) XXXX-XXXX` (landline) or `(XX) XXXXX-XXXX` (mobile);
/// partial input is masked progressively, extra digits are dropped.
pub fn format_telefone(telefone: &str) -> String {
    // Extract just the digits
    let digits: String = telefone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return String::new();
    }
    if digits.len() <= 2 {
        return format!("({}", digits);
    }
    if digits.len() <= 6 {
        return format!("({}) {}", &digits[0..2], &digits[2..]);
    }
    if digits.len() <= 10 {
        return format!("({}) {}-{}", &digits[0..2], &digits[2..6], &digits[6..]);
    }
    format!("({}) {}-{}", &digits[0..2], &digits[2..7], &digits[7..11])
}

/// Format a numeric CPF for display as `XXX.XXX.XXX-XX`.
/// The API stores CPFs as bare numbers, so leading zeros are restored here.
pub fn format_cpf(cpf: i64) -> String {
    if cpf < 0 {
        // Not a CPF; show it unmasked
        return cpf.to_string();
    }
    let digits = format!("{:011}", cpf);
    if digits.len() != 11 {
        // More than 11 digits is not a CPF; show it unmasked
        return digits;
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
