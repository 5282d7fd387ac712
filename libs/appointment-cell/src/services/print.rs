use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDateTime;

use shared_models::auth::User;

use crate::models::{BookingReceipt, PrintAudience, Turno, UserRef};
use crate::services::filter::split_today_and_upcoming;

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 20px; color: #333; }
.header { text-align: center; margin-bottom: 30px; border-bottom: 2px solid #536a86; padding-bottom: 20px; }
.header h1 { color: #536a86; margin: 0; font-size: 24px; }
.header p { color: #7a8fa6; margin: 5px 0; }
.section { margin-bottom: 30px; }
.section h2 { color: #536a86; border-bottom: 1px solid #c3d0e6; padding-bottom: 10px; margin-bottom: 20px; }
.turno { border: 1px solid #c3d0e6; padding: 15px; margin-bottom: 15px; border-radius: 8px; background-color: #f9f9f9; }
.turno-header { font-weight: bold; color: #536a86; margin-bottom: 10px; font-size: 16px; }
.turno-details { display: grid; grid-template-columns: 1fr 1fr; gap: 10px; font-size: 14px; }
.turno-details p { margin: 5px 0; }
.label { font-weight: bold; color: #536a86; }
.value { color: #333; }
.no-turnos { text-align: center; color: #7a8fa6; font-style: italic; padding: 20px; }
.footer { margin-top: 30px; text-align: center; color: #7a8fa6; font-size: 12px; border-top: 1px solid #c3d0e6; padding-top: 20px; }
@media print { body { margin: 0; } }
"#;

/// Escape text for interpolation into HTML element content or attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn stamp(now: NaiveDateTime) -> String {
    now.format("%d/%m/%Y %H:%M").to_string()
}

fn document(title: &str, body: &str, now: NaiveDateTime) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}<div class=\"footer\">\n<p>Documento generado el {generated}</p>\n<p>Spa Sentirse Bien - Sistema de Gestión de Turnos</p>\n</div>\n</body>\n</html>\n",
        title = escape_html(title),
        body = body,
        generated = stamp(now),
    )
}

fn detail(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        "<p><span class=\"label\">{}:</span> <span class=\"value\">{}</span></p>",
        label,
        escape_html(value)
    );
}

fn turno_card(out: &mut String, turno: &Turno, audience: PrintAudience, professional: Option<&User>) {
    out.push_str("<div class=\"turno\">\n");
    let _ = writeln!(
        out,
        "<div class=\"turno-header\">{}</div>",
        escape_html(turno.service_name().unwrap_or_default())
    );
    out.push_str("<div class=\"turno-details\">\n");

    detail(out, "Fecha", &turno.fecha.format("%d/%m/%Y").to_string());
    detail(out, "Hora", &turno.hora);

    match audience {
        PrintAudience::Cliente => {
            let name = professional.map(User::full_name).unwrap_or_else(|| "No asignado".to_string());
            detail(out, "Profesional", &name);
            if let Some(especialidad) = professional.and_then(|p| p.especialidad.as_deref()) {
                detail(out, "Especialidad", especialidad);
            }
        }
        PrintAudience::Profesional => {
            detail(out, "Cliente", turno.cliente_email().unwrap_or_default());
            let nombre = turno.cliente.as_ref().and_then(UserRef::display_name);
            if let Some(nombre) = nombre.filter(|n| !n.trim().is_empty()) {
                detail(out, "Nombre", nombre.trim());
            }
        }
    }

    detail(out, "Estado", &turno.estado.to_string());
    out.push_str("</div>\n</div>\n");
}

fn section(
    out: &mut String,
    heading: &str,
    empty_message: &str,
    turnos: &[Turno],
    audience: PrintAudience,
    professionals: &HashMap<String, User>,
) {
    out.push_str("<div class=\"section\">\n");
    let _ = writeln!(out, "<h2>{} ({})</h2>", heading, turnos.len());
    if turnos.is_empty() {
        let _ = writeln!(out, "<div class=\"no-turnos\">{}</div>", empty_message);
    }
    for turno in turnos {
        let professional = turno.profesional_id().and_then(|id| professionals.get(id));
        turno_card(out, turno, audience, professional);
    }
    out.push_str("</div>\n");
}

/// Printable list split into today's and upcoming turnos. `professionals` is
/// keyed by professional id.
pub fn render_turno_list(
    title: &str,
    turnos: &[Turno],
    audience: PrintAudience,
    professionals: &HashMap<String, User>,
    now: NaiveDateTime,
) -> String {
    let (today, upcoming) = split_today_and_upcoming(turnos, now.date());

    let mut body = String::new();
    body.push_str("<div class=\"header\">\n");
    let _ = writeln!(body, "<h1>{}</h1>", escape_html(title));
    let _ = writeln!(body, "<p>Fecha de impresión: {}</p>", stamp(now));
    let _ = writeln!(body, "<p>Total de turnos: {}</p>", turnos.len());
    body.push_str("</div>\n");

    section(&mut body, "📅 Turnos de Hoy", "No hay turnos para hoy", &today, audience, professionals);
    section(&mut body, "⏳ Turnos Futuros", "No hay turnos futuros", &upcoming, audience, professionals);

    document(title, &body, now)
}

pub fn render_turno(
    turno: &Turno,
    audience: PrintAudience,
    professional: Option<&User>,
    now: NaiveDateTime,
) -> String {
    let title = format!("Turno {}", turno.service_name().unwrap_or_default());

    let mut body = String::new();
    body.push_str("<div class=\"header\">\n");
    let _ = writeln!(body, "<h1>{}</h1>", escape_html(&title));
    let _ = writeln!(body, "<p>Fecha de impresión: {}</p>", stamp(now));
    body.push_str("</div>\n");
    turno_card(&mut body, turno, audience, professional);

    document(&title, &body, now)
}

pub fn render_receipt(receipt: &BookingReceipt) -> String {
    let title = "Comprobante de Reserva";
    let quote = &receipt.quote;

    let mut body = String::new();
    body.push_str("<div class=\"header\">\n");
    let _ = writeln!(body, "<h1>{}</h1>", title);
    let _ = writeln!(body, "<p>Comprobante N° {}</p>", receipt.receipt_id);
    body.push_str("</div>\n<div class=\"turno\">\n");
    let _ = writeln!(body, "<div class=\"turno-header\">{}</div>", escape_html(&receipt.service_name));
    body.push_str("<div class=\"turno-details\">\n");

    detail(&mut body, "Cliente", &receipt.cliente_email);
    detail(&mut body, "Fecha", &receipt.turno.fecha.format("%d/%m/%Y").to_string());
    detail(&mut body, "Hora", &receipt.turno.hora);
    detail(&mut body, "Estado", &receipt.turno.estado.to_string());
    detail(&mut body, "Precio", &format!("${:.0}", quote.base_price));
    if quote.discount_applied {
        detail(&mut body, "Descuento", "15% por reserva anticipada");
    }
    detail(&mut body, "Total", &format!("${:.0}", quote.final_price));
    body.push_str("</div>\n</div>\n");

    document(title, &body, receipt.issued_at)
}
