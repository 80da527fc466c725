//! Amount-in-words converter for the legal legend of a comprobante.
//!
//! Renders a monetary amount in Soles as upper-case Spanish text, e.g.
//! `MIL QUINIENTOS CON 50/100 SOLES`. The exact zero amount keeps the
//! historical irregular legend `CERO SOLES CON 00/100` (word order differs
//! from the general form; printed documents in the field carry it this way).

use thiserror::Error;

/// Legend for an amount of exactly zero.
pub const LEYENDA_CERO: &str = "CERO SOLES CON 00/100";

/// Largest integer part the decomposition supports (inclusive).
const MAX_ENTERO: u64 = 999_999_999_999;

/// Failure to render an amount as legal text.
///
/// Any error here must block document emission entirely: printing a
/// malformed legend produces a legally invalid comprobante.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum LetrasError {
    /// Negative, NaN or infinite input.
    #[error("amount cannot be rendered as a legend: {0}")]
    MontoInvalido(f64),

    /// Integer part beyond the supported decomposition range.
    #[error("amount exceeds the supported legend range: {0}")]
    MagnitudNoSoportada(f64),
}

const UNIDADES: [&str; 10] = [
    "", "UNO", "DOS", "TRES", "CUATRO", "CINCO", "SEIS", "SIETE", "OCHO", "NUEVE",
];

const DECENAS: [&str; 10] = [
    "", "DIEZ", "VEINTE", "TREINTA", "CUARENTA", "CINCUENTA", "SESENTA", "SETENTA", "OCHENTA",
    "NOVENTA",
];

// 11..=19 are irregular and never synthesized from DECENAS + UNIDADES.
const ESPECIALES: [&str; 9] = [
    "ONCE",
    "DOCE",
    "TRECE",
    "CATORCE",
    "QUINCE",
    "DIECISÉIS",
    "DIECISIETE",
    "DIECIOCHO",
    "DIECINUEVE",
];

const CENTENAS: [&str; 10] = [
    "",
    "CIENTO",
    "DOSCIENTOS",
    "TRESCIENTOS",
    "CUATROCIENTOS",
    "QUINIENTOS",
    "SEISCIENTOS",
    "SETECIENTOS",
    "OCHOCIENTOS",
    "NOVECIENTOS",
];

/// Words for 1..=999. Exactly 100 is `CIEN`, never `CIENTO`.
fn menor_mil(n: u64) -> String {
    debug_assert!(n > 0 && n < 1000);
    if n == 100 {
        return "CIEN".to_string();
    }
    if n < 10 {
        return UNIDADES[n as usize].to_string();
    }
    if n == 10 {
        return "DIEZ".to_string();
    }
    if n < 20 {
        return ESPECIALES[(n - 11) as usize].to_string();
    }
    if n < 100 {
        let d = (n / 10) as usize;
        let u = (n % 10) as usize;
        return if u == 0 {
            DECENAS[d].to_string()
        } else {
            // Uniform compound-tens rule: 21 -> VEINTE Y UNO.
            format!("{} Y {}", DECENAS[d], UNIDADES[u])
        };
    }
    let c = (n / 100) as usize;
    let resto = n % 100;
    if resto == 0 {
        CENTENAS[c].to_string()
    } else {
        format!("{} {}", CENTENAS[c], menor_mil(resto))
    }
}

/// Words for 1..=999_999. Exactly one thousand is `MIL`, never `UNO MIL`.
fn menor_millon(n: u64) -> String {
    debug_assert!(n > 0 && n < 1_000_000);
    if n < 1000 {
        return menor_mil(n);
    }
    let miles = n / 1000;
    let resto = n % 1000;
    let cabeza = if miles == 1 {
        "MIL".to_string()
    } else {
        format!("{} MIL", menor_mil(miles))
    };
    if resto == 0 {
        cabeza
    } else {
        format!("{} {}", cabeza, menor_mil(resto))
    }
}

fn entero_en_palabras(n: u64) -> String {
    if n == 0 {
        return "CERO".to_string();
    }
    if n < 1_000_000 {
        return menor_millon(n);
    }
    let millones = n / 1_000_000;
    let resto = n % 1_000_000;
    let cabeza = if millones == 1 {
        "UN MILLÓN".to_string()
    } else {
        format!("{} MILLONES", menor_millon(millones))
    };
    if resto == 0 {
        cabeza
    } else {
        format!("{} {}", cabeza, menor_millon(resto))
    }
}

/// Convert an amount in Soles to its upper-case legal-text representation.
///
/// General form: `<ENTERO EN PALABRAS> CON <dd>/100 SOLES`. Exactly zero
/// short-circuits to [`LEYENDA_CERO`] without computing cents.
///
/// Negative, NaN or infinite amounts are rejected with
/// [`LetrasError::MontoInvalido`]; integer parts past the millions
/// decomposition (>= 10^12) with [`LetrasError::MagnitudNoSoportada`].
pub fn numero_a_letras(monto: f64) -> Result<String, LetrasError> {
    if !monto.is_finite() || monto < 0.0 {
        return Err(LetrasError::MontoInvalido(monto));
    }
    if monto == 0.0 {
        return Ok(LEYENDA_CERO.to_string());
    }
    if monto >= 1e12 {
        return Err(LetrasError::MagnitudNoSoportada(monto));
    }

    let mut entero = monto.trunc() as u64;
    let mut centavos = ((monto - entero as f64) * 100.0).round() as u64;
    if centavos == 100 {
        // e.g. 1.999: the fraction rounds up to a whole sol.
        entero += 1;
        centavos = 0;
    }
    if entero > MAX_ENTERO {
        return Err(LetrasError::MagnitudNoSoportada(monto));
    }

    Ok(format!(
        "{} CON {:02}/100 SOLES",
        entero_en_palabras(entero),
        centavos
    ))
}
