//! Document series and correlative numbering.
//!
//! Every fiscal document belongs to a serie (`F001`, `B001`, ...) holding a
//! monotonically increasing correlativo; the printed number is
//! `F001-00000042`.

use serde::{Deserialize, Serialize};

use facturador_core::{DomainError, DomainResult, ValueObject};

/// Document kind, per the SUNAT comprobante catalog (plus the internal,
/// non-fiscal ticket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoComprobante {
    Factura,
    Boleta,
    NotaCredito,
    GuiaRemision,
    Ticket,
}

impl TipoComprobante {
    /// Catalog code as transmitted on electronic documents.
    pub fn codigo_sunat(&self) -> &'static str {
        match self {
            TipoComprobante::Factura => "01",
            TipoComprobante::Boleta => "03",
            TipoComprobante::NotaCredito => "07",
            TipoComprobante::GuiaRemision => "09",
            TipoComprobante::Ticket => "12",
        }
    }

    /// Whether this kind carries monetary amounts (everything except the
    /// guía de remisión, which only moves goods).
    pub fn lleva_importes(&self) -> bool {
        !matches!(self, TipoComprobante::GuiaRemision)
    }
}

/// Full printed number of a document: serie + zero-padded correlativo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumeroComprobante {
    pub serie: String,
    pub correlativo: u32,
}

impl core::fmt::Display for NumeroComprobante {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{:08}", self.serie, self.correlativo)
    }
}

impl ValueObject for NumeroComprobante {}

/// A numbering serie for one document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Serie {
    tipo: TipoComprobante,
    prefijo: String,
    correlativo: u32,
}

impl Serie {
    /// Create a serie. The prefijo is 4 alphanumeric characters starting
    /// with a letter (`F001`, `B001`, `T001`, ...).
    pub fn nueva(tipo: TipoComprobante, prefijo: &str) -> DomainResult<Self> {
        let prefijo = prefijo.trim();
        if prefijo.len() != 4
            || !prefijo.bytes().all(|b| b.is_ascii_alphanumeric())
            || !prefijo.as_bytes()[0].is_ascii_alphabetic()
        {
            return Err(DomainError::validation(
                "serie must be 4 alphanumeric characters starting with a letter",
            ));
        }
        Ok(Self {
            tipo,
            prefijo: prefijo.to_ascii_uppercase(),
            correlativo: 0,
        })
    }

    pub fn tipo(&self) -> TipoComprobante {
        self.tipo
    }

    pub fn prefijo(&self) -> &str {
        &self.prefijo
    }

    /// Last correlativo handed out (0 when the serie is fresh).
    pub fn correlativo(&self) -> u32 {
        self.correlativo
    }

    /// Allocate the next number in the serie.
    pub fn siguiente(&mut self) -> NumeroComprobante {
        self.correlativo += 1;
        NumeroComprobante {
            serie: self.prefijo.clone(),
            correlativo: self.correlativo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numero_impreso_con_ocho_digitos() {
        let numero = NumeroComprobante {
            serie: "F001".to_string(),
            correlativo: 42,
        };
        assert_eq!(numero.to_string(), "F001-00000042");
    }

    #[test]
    fn la_serie_asigna_correlativos_consecutivos() {
        let mut serie = Serie::nueva(TipoComprobante::Factura, "F001").unwrap();
        assert_eq!(serie.correlativo(), 0);

        let primero = serie.siguiente();
        let segundo = serie.siguiente();
        assert_eq!(primero.to_string(), "F001-00000001");
        assert_eq!(segundo.to_string(), "F001-00000002");
        assert_eq!(serie.correlativo(), 2);
    }

    #[test]
    fn prefijo_invalido_se_rechaza() {
        assert!(Serie::nueva(TipoComprobante::Boleta, "B01").is_err());
        assert!(Serie::nueva(TipoComprobante::Boleta, "B0012").is_err());
        assert!(Serie::nueva(TipoComprobante::Boleta, "0001").is_err());
        assert!(Serie::nueva(TipoComprobante::Boleta, "B-01").is_err());
        // Lower case is accepted and normalized.
        assert_eq!(
            Serie::nueva(TipoComprobante::Boleta, "b001").unwrap().prefijo(),
            "B001"
        );
    }

    #[test]
    fn codigos_sunat() {
        assert_eq!(TipoComprobante::Factura.codigo_sunat(), "01");
        assert_eq!(TipoComprobante::Boleta.codigo_sunat(), "03");
        assert_eq!(TipoComprobante::NotaCredito.codigo_sunat(), "07");
        assert_eq!(TipoComprobante::GuiaRemision.codigo_sunat(), "09");
        assert_eq!(TipoComprobante::Ticket.codigo_sunat(), "12");
        assert!(!TipoComprobante::GuiaRemision.lleva_importes());
        assert!(TipoComprobante::Ticket.lleva_importes());
    }
}
