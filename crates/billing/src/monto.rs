//! Parsing and display of operator-typed amounts.
//!
//! Parsing is the explicit pre-step owned by callers of the arithmetic in
//! this crate: the converters and breakdowns receive already-validated
//! numbers and never coerce bad input to a silent zero.

use facturador_core::{DomainError, DomainResult};

/// Parse a monetary amount typed into a form field.
///
/// Accepts plain decimal notation (`"12.50"`), trims surrounding
/// whitespace, and rejects empty, non-numeric, non-finite or negative input.
pub fn parse_monto(texto: &str) -> DomainResult<f64> {
    let texto = texto.trim();
    if texto.is_empty() {
        return Err(DomainError::validation("amount is empty"));
    }
    let valor: f64 = texto
        .parse()
        .map_err(|_| DomainError::validation(format!("not a decimal amount: {texto:?}")))?;
    if !valor.is_finite() {
        return Err(DomainError::validation("amount must be finite"));
    }
    if valor < 0.0 {
        return Err(DomainError::validation("amount must not be negative"));
    }
    Ok(valor)
}

/// Currency display form used on screens and printed documents.
pub fn formato_soles(valor: f64) -> String {
    format!("S/ {valor:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsea_montos_decimales() {
        assert_eq!(parse_monto("12.50").unwrap(), 12.50);
        assert_eq!(parse_monto(" 8 ").unwrap(), 8.0);
        assert_eq!(parse_monto("0").unwrap(), 0.0);
    }

    #[test]
    fn rechaza_entradas_invalidas() {
        assert!(parse_monto("").is_err());
        assert!(parse_monto("   ").is_err());
        assert!(parse_monto("abc").is_err());
        assert!(parse_monto("-1").is_err());
        // Rust parses "NaN" into a float; it must still be rejected.
        assert!(parse_monto("NaN").is_err());
        assert!(parse_monto("inf").is_err());
    }

    #[test]
    fn formato_con_dos_decimales() {
        assert_eq!(formato_soles(9.5), "S/ 9.50");
        assert_eq!(formato_soles(0.0), "S/ 0.00");
        assert_eq!(formato_soles(1234.567), "S/ 1234.57");
    }
}
