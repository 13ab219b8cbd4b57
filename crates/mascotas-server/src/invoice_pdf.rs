//! Single-page PDF rendering of an adoption invoice.
//!
//! Text is set in the standard Helvetica fonts with WinAnsi encoding, so
//! no font data is embedded. Characters outside Latin-1 are replaced
//! with `?`.

use std::fmt::Write;

use mascotas_core::models::adoption::Invoice;
use uuid::Uuid;

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 56;
const NOT_PROVIDED: &str = "No registrado";

pub fn filename(adoption_id: Uuid) -> String {
    format!("factura_{adoption_id}.pdf")
}

/// Escape text for a PDF literal string.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

enum Line {
    Title(String),
    Heading(String),
    Text(String),
    Gap,
}

fn lines(invoice: &Invoice) -> Vec<Line> {
    let adopter = &invoice.adopter;
    let pet = &invoice.pet;
    let foundation = &invoice.foundation;
    let or_missing = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_PROVIDED.into());

    vec![
        Line::Title("Factura de adopción".into()),
        Line::Text(format!("Factura N.º {}", invoice.adoption.id)),
        Line::Text(format!(
            "Fecha de adopción: {}",
            invoice.adoption.adopted_on().format("%d/%m/%Y")
        )),
        Line::Gap,
        Line::Heading("Adoptante".into()),
        Line::Text(format!("Usuario: {}", adopter.username)),
        Line::Text(format!("Correo: {}", adopter.email)),
        Line::Text(format!("Teléfono: {}", or_missing(&adopter.phone))),
        Line::Text(format!("Dirección: {}", or_missing(&adopter.address))),
        Line::Gap,
        Line::Heading("Mascota".into()),
        Line::Text(format!("Nombre: {}", pet.name)),
        Line::Text(format!("Especie: {}", pet.species)),
        Line::Text(format!("Edad: {} años", pet.age)),
        Line::Gap,
        Line::Heading("Fundación".into()),
        Line::Text(format!("Nombre: {}", foundation.name)),
        Line::Text(format!("Dirección: {}", foundation.address)),
        Line::Text(format!("Teléfono: {}", foundation.phone)),
        Line::Text(format!("Correo: {}", foundation.email)),
        Line::Gap,
        Line::Text("Gracias por darle un hogar.".into()),
    ]
}

fn content_stream(invoice: &Invoice) -> String {
    let mut out = String::new();
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines(invoice) {
        let (font, size, text) = match line {
            Line::Title(t) => ("F2", 20, t),
            Line::Heading(t) => ("F2", 13, t),
            Line::Text(t) => ("F1", 11, t),
            Line::Gap => {
                y -= 10;
                continue;
            }
        };
        let _ = writeln!(
            out,
            "BT /{font} {size} Tf {MARGIN} {y} Td ({}) Tj ET",
            escape(&text)
        );
        y -= size + 8;
    }
    out
}

/// Render `invoice` as a complete PDF file.
pub fn render(invoice: &Invoice) -> Vec<u8> {
    let content = content_stream(invoice);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_owned(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_owned(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 4 0 R /F2 5 0 R >> >> /Contents 6 0 R >>"
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_owned(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_owned(),
        format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ),
    ];

    // Everything written is ASCII, so string length equals byte offset.
    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        let _ = write!(pdf, "{} 0 obj\n{body}\nendobj\n", i + 1);
    }

    let xref = pdf.len();
    let _ = write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(pdf, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    );
    pdf.into_bytes()
}
