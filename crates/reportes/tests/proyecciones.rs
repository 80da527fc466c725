//! End-to-end replay: documents and till sessions through the projection
//! runner, from emission to the daily report.

use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use facturador_caja::{
    AbrirCaja, CajaCommand, CajaEvent, CajaSesion, CajaSesionId, CerrarCaja, EstadoArqueo,
    RegistrarVenta,
};
use facturador_clientes::{DocumentoIdentidad, TipoDocumento};
use facturador_comprobantes::{
    AnularComprobante, Comprobante, ComprobanteCommand, ComprobanteEvent, ComprobanteId,
    DatosCliente, DetalleComprobante, EmitirComprobante, FormaPago, Serie, TipoComprobante,
};
use facturador_core::{Aggregate, AggregateId, EmisorId, UserId};
use facturador_events::{EventEnvelope, ProjectionError, ProjectionRunner};
use facturador_reportes::{HistorialCaja, ResumenVentas};

fn fecha(dia: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, dia).unwrap()
}

fn envolver<E>(
    emisor_id: EmisorId,
    aggregate_id: AggregateId,
    aggregate_type: &str,
    seq: u64,
    payload: E,
) -> EventEnvelope<E> {
    EventEnvelope::new(
        Uuid::now_v7(),
        emisor_id,
        aggregate_id,
        aggregate_type,
        seq,
        payload,
    )
}

/// Emit one comprobante and return its events.
fn emitir(
    emisor_id: EmisorId,
    comprobante_id: ComprobanteId,
    serie: &mut Serie,
    tipo: TipoComprobante,
    fecha_emision: NaiveDate,
    precios: &[(f64, f64)],
) -> (Comprobante, Vec<ComprobanteEvent>) {
    let detalles: Vec<DetalleComprobante> = precios
        .iter()
        .enumerate()
        .map(|(i, (cantidad, precio))| {
            DetalleComprobante::desde_precio_con_igv(
                i as u32 + 1,
                "Trabajo de imprenta",
                "NIU",
                *cantidad,
                *precio,
            )
            .unwrap()
        })
        .collect();

    let cliente = match tipo {
        TipoComprobante::Factura => DatosCliente {
            documento: DocumentoIdentidad::nuevo(TipoDocumento::Ruc, "20512345678").unwrap(),
            razon_social: "Distribuidora Kallpa S.A.C.".to_string(),
            direccion: None,
        },
        _ => DatosCliente::generico(),
    };

    let mut comprobante = Comprobante::empty(comprobante_id);
    let events = comprobante
        .handle(&ComprobanteCommand::EmitirComprobante(EmitirComprobante {
            emisor_id,
            comprobante_id,
            tipo,
            numero: serie.siguiente(),
            fecha_emision,
            cliente,
            detalles,
            forma_pago: FormaPago::Contado,
            referencia: None,
            occurred_at: Utc::now(),
        }))
        .unwrap();
    for event in &events {
        comprobante.apply(event);
    }
    (comprobante, events)
}

#[test]
fn resumen_de_ventas_con_anulacion() {
    facturador_observability::init();

    let emisor_id = EmisorId::new();
    let mut serie_t = Serie::nueva(TipoComprobante::Ticket, "T001").unwrap();
    let mut serie_f = Serie::nueva(TipoComprobante::Factura, "F001").unwrap();

    let ticket_id = ComprobanteId::new(AggregateId::new());
    let factura_id = ComprobanteId::new(AggregateId::new());

    // Day 15: a ticket of 60.50 and a factura of 118.00.
    let (_, eventos_ticket) = emitir(
        emisor_id,
        ticket_id,
        &mut serie_t,
        TipoComprobante::Ticket,
        fecha(15),
        &[(2.0, 10.00), (1.0, 25.50), (3.0, 5.00)],
    );
    let (mut factura, eventos_factura) = emitir(
        emisor_id,
        factura_id,
        &mut serie_f,
        TipoComprobante::Factura,
        fecha(15),
        &[(1.0, 118.00)],
    );

    // The factura is later anulled.
    let eventos_anulacion = factura
        .handle(&ComprobanteCommand::AnularComprobante(AnularComprobante {
            emisor_id,
            comprobante_id: factura_id,
            motivo: Some("Error en el RUC".to_string()),
            occurred_at: Utc::now(),
        }))
        .unwrap();

    let mut seq = 0u64;
    let mut envelopes = Vec::new();
    for (aggregate_id, eventos) in [
        (ticket_id.0, &eventos_ticket),
        (factura_id.0, &eventos_factura),
        (factura_id.0, &eventos_anulacion),
    ] {
        for evento in eventos.iter() {
            seq += 1;
            envelopes.push(envolver(
                emisor_id,
                aggregate_id,
                "comprobante",
                seq,
                evento.clone(),
            ));
        }
    }

    let mut runner = ProjectionRunner::new_for_emisor(emisor_id, ResumenVentas::new());
    runner.run(&envelopes).unwrap();

    let resumen = runner.projection();
    let dia = resumen.totales_del_dia(fecha(15));
    assert_eq!(dia.documentos, 2);
    assert_eq!(dia.anulados, 1);
    // Only the ticket survives the anulación.
    assert_eq!(dia.total, 60.50);
    assert_eq!(dia.op_gravadas, 51.27);
    assert_eq!(dia.igv, 9.23);

    let tickets = resumen.totales_por_tipo(TipoComprobante::Ticket);
    assert_eq!(tickets.documentos, 1);
    assert_eq!(tickets.total, 60.50);

    let facturas = resumen.totales_por_tipo(TipoComprobante::Factura);
    assert_eq!(facturas.anulados, 1);
    assert_eq!(facturas.total, 0.0);

    assert_eq!(resumen.totales_generales().total, 60.50);
    assert_eq!(resumen.dias().collect::<Vec<_>>(), vec![fecha(15)]);

    // Replaying an old sequence number is rejected, not double-counted.
    let duplicado = envelopes.last().unwrap();
    assert!(matches!(
        runner.apply(duplicado),
        Err(ProjectionError::NonMonotonicSequence { .. })
    ));

    // An envelope from another emisor never reaches the read model.
    let extranjero = envolver(
        EmisorId::new(),
        ticket_id.0,
        "comprobante",
        seq + 1,
        eventos_ticket[0].clone(),
    );
    assert!(matches!(
        runner.apply(&extranjero),
        Err(ProjectionError::EmisorMismatch { .. })
    ));
}

#[test]
fn historial_de_caja_refleja_los_cierres() {
    let emisor_id = EmisorId::new();
    let caja_id = CajaSesionId::new(AggregateId::new());

    let mut caja = CajaSesion::empty(caja_id);
    let mut eventos: Vec<CajaEvent> = Vec::new();

    let abrir = CajaCommand::AbrirCaja(AbrirCaja {
        emisor_id,
        caja_id,
        usuario: UserId::new(),
        monto_apertura: 100.0,
        fecha_apertura: fecha(15),
        hora_apertura: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        occurred_at: Utc::now(),
    });
    for evento in caja.handle(&abrir).unwrap() {
        caja.apply(&evento);
        eventos.push(evento);
    }

    let venta = CajaCommand::RegistrarVenta(RegistrarVenta {
        emisor_id,
        caja_id,
        comprobante_id: AggregateId::new(),
        importe: 250.50,
        occurred_at: Utc::now(),
    });
    for evento in caja.handle(&venta).unwrap() {
        caja.apply(&evento);
        eventos.push(evento);
    }

    let cerrar = CajaCommand::CerrarCaja(CerrarCaja {
        emisor_id,
        caja_id,
        monto_cierre_fisico: 300.0,
        observacion: Some("Faltó sencillo".to_string()),
        occurred_at: Utc::now(),
    });
    for evento in caja.handle(&cerrar).unwrap() {
        caja.apply(&evento);
        eventos.push(evento);
    }

    let envelopes: Vec<_> = eventos
        .into_iter()
        .enumerate()
        .map(|(i, evento)| envolver(emisor_id, caja_id.0, "caja_sesion", i as u64 + 1, evento))
        .collect();

    let (historial, cursor) =
        ProjectionRunner::rebuild_from_scratch(HistorialCaja::new, &envelopes).unwrap();

    assert!(historial.sesion_abierta().is_none());
    assert_eq!(historial.cierres().len(), 1);

    let cierre = &historial.cierres()[0];
    assert_eq!(cierre.monto_esperado, 350.50);
    assert_eq!(cierre.diferencia, -50.50);
    assert_eq!(cierre.estado_arqueo, EstadoArqueo::Faltante);
    assert_eq!(historial.faltante_acumulado(), 50.50);
    assert_eq!(historial.sobrante_acumulado(), 0.0);

    assert_eq!(cursor.unwrap().last_sequence_number(), 3);
}

#[test]
fn los_envelopes_viajan_como_json() {
    let emisor_id = EmisorId::new();
    let mut serie = Serie::nueva(TipoComprobante::Boleta, "B001").unwrap();
    let comprobante_id = ComprobanteId::new(AggregateId::new());

    let (_, eventos) = emitir(
        emisor_id,
        comprobante_id,
        &mut serie,
        TipoComprobante::Boleta,
        fecha(16),
        &[(1.0, 35.40)],
    );

    let envelope = envolver(emisor_id, comprobante_id.0, "comprobante", 1, eventos[0].clone());
    let json = serde_json::to_value(&envelope).unwrap();

    // Ids serialize transparently; the legend travels verbatim.
    assert_eq!(json["sequence_number"], 1);
    assert_eq!(json["aggregate_type"], "comprobante");
    let emitido = &json["payload"]["ComprobanteEmitido"];
    assert_eq!(emitido["total"], 35.40);
    assert_eq!(emitido["importe_en_letras"], "TREINTA Y CINCO CON 40/100 SOLES");
}
