/// Bank codes offered by the payout form and their display names.
pub const BANKS: &[(&str, &str)] = &[
    ("sber", "Сбербанк"),
    ("tinkoff", "Тинькофф"),
    ("alpha", "Альфа-Банк"),
    ("vtb", "ВТБ"),
    ("raiff", "Райффайзен"),
];

/// Resolves a bank code to its display name. Unknown codes are returned as-is.
pub fn resolve_bank_name(code: &str) -> &str {
    BANKS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}
