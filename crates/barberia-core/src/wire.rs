//! # Wire Records
//!
//! Parsing boundary between loosely-typed backend exports and the typed
//! domain model. Nothing outside this module sees a raw record.
//!
//! ## What Gets Normalized
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  { "VentaId": "12", ... }          field casing: camelCase / PascalCase │
//! │  { "ventaId": 12, ... }                                                 │
//! │                                                                         │
//! │  "cantidad": 2 | 2.0 | "2"         numbers may arrive as text          │
//! │  "producto": { "id": 7, ... }      nested or flattened product refs    │
//! │  "productoId": 7                                                        │
//! │  "estado": "activo" | "Completada" status synonyms                     │
//! │  [ ... ] | { "$values": [...] }    bare arrays or reference envelopes  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are decimal pesos on the wire and cents everywhere else.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{
    LineKind, PaymentMethod, Return, ReturnReason, ReturnStatus, Sale, SaleLine, SaleStatus,
};

// =============================================================================
// Errors
// =============================================================================

/// Failures while reading a backend export.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// One record could not be normalized.
    #[error("{kind} record #{index}: {source}")]
    Record {
        kind: &'static str,
        index: usize,
        #[source]
        source: ValidationError,
    },
}

// =============================================================================
// Loose Values
// =============================================================================

/// A number that may have been serialized as text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    /// Integer value, if the number is whole.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseNumber::Int(n) => Some(*n),
            LooseNumber::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            LooseNumber::Float(_) => None,
            LooseNumber::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Int(n) => Some(*n as f64),
            LooseNumber::Float(f) => Some(*f).filter(|f| f.is_finite()),
            LooseNumber::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }

    fn as_money(&self) -> Option<Money> {
        self.as_f64().and_then(Money::from_wire_amount)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    List(Vec<T>),
    Values {
        #[serde(rename = "$values", alias = "data", alias = "Data")]
        values: Vec<T>,
    },
}

impl<T> Envelope<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Envelope::List(items) => items,
            Envelope::Values { values } => values,
        }
    }
}

// =============================================================================
// Return Record
// =============================================================================

/// Product reference nested inside a return record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    #[serde(default, alias = "Id", alias = "productoId", alias = "ProductoId")]
    pub id: Option<LooseNumber>,
    #[serde(default, alias = "Nombre")]
    pub nombre: Option<String>,
}

/// A return exactly as the backend exports it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRecord {
    #[serde(default, alias = "Id")]
    pub id: Option<LooseNumber>,
    #[serde(default, alias = "VentaId")]
    pub venta_id: Option<LooseNumber>,
    #[serde(default, alias = "ClienteId")]
    pub cliente_id: Option<LooseNumber>,
    #[serde(default, alias = "ProductoId")]
    pub producto_id: Option<LooseNumber>,
    #[serde(default, alias = "Producto")]
    pub producto: Option<ProductRef>,
    #[serde(
        default,
        alias = "NombreProducto",
        alias = "productoNombre",
        alias = "ProductoNombre"
    )]
    pub nombre_producto: Option<String>,
    #[serde(default, alias = "Cantidad")]
    pub cantidad: Option<LooseNumber>,
    #[serde(default, alias = "MotivoCategoria")]
    pub motivo_categoria: Option<String>,
    #[serde(default, alias = "MotivoDetalle")]
    pub motivo_detalle: Option<String>,
    #[serde(default, alias = "MontoDevuelto")]
    pub monto_devuelto: Option<LooseNumber>,
    #[serde(default, alias = "SaldoAFavor", alias = "saldoAfavor")]
    pub saldo_a_favor: Option<LooseNumber>,
    #[serde(default, alias = "Estado")]
    pub estado: Option<String>,
    #[serde(default, alias = "Fecha")]
    pub fecha: Option<String>,
    #[serde(default, alias = "Observaciones")]
    pub observaciones: Option<String>,
    #[serde(default, alias = "UsuarioId")]
    pub usuario_id: Option<LooseNumber>,
}

impl TryFrom<ReturnRecord> for Return {
    type Error = ValidationError;

    /// Missing `saldoAFavor` defaults to the returned amount. Missing status
    /// means Completed. Unknown reason categories are filed as `otros`.
    fn try_from(record: ReturnRecord) -> Result<Self, Self::Error> {
        let id = required_id(&record.id, "id")?;
        let sale_id = required_id(&record.venta_id, "ventaId")?;
        let client_id = required_id(&record.cliente_id, "clienteId")?;

        let nested = record.producto.unwrap_or_default();
        let product_id = record
            .producto_id
            .as_ref()
            .or(nested.id.as_ref())
            .and_then(LooseNumber::as_i64)
            .filter(|id| *id > 0);
        let product_name = nested
            .nombre
            .or(record.nombre_producto)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let quantity = record
            .cantidad
            .as_ref()
            .ok_or_else(|| ValidationError::required("cantidad"))?
            .as_i64()
            .ok_or_else(|| ValidationError::invalid_format("cantidad", "not a whole number"))?;
        if quantity <= 0 {
            return Err(ValidationError::must_be_positive("cantidad"));
        }

        let amount = optional_money(&record.monto_devuelto, "montoDevuelto")?.unwrap_or_default();
        let credit = optional_money(&record.saldo_a_favor, "saldoAFavor")?.unwrap_or(amount);

        let status = match record.estado.as_deref().map(str::trim) {
            None | Some("") => ReturnStatus::Completed,
            Some(raw) => ReturnStatus::from_wire(raw).ok_or_else(|| ValidationError::NotAllowed {
                field: "estado".to_string(),
                allowed: ["completada", "anulada", "pendiente", "procesado"]
                    .map(String::from)
                    .to_vec(),
            })?,
        };

        let reason = record
            .motivo_categoria
            .as_deref()
            .and_then(ReturnReason::from_code)
            .unwrap_or(ReturnReason::Other);

        Ok(Return {
            id,
            sale_id,
            client_id,
            product_id,
            product_name,
            quantity,
            amount_cents: amount.cents(),
            credit_cents: credit.cents(),
            reason,
            reason_detail: non_blank(record.motivo_detalle),
            observations: non_blank(record.observaciones),
            user_id: record.usuario_id.as_ref().and_then(LooseNumber::as_i64),
            date: parse_timestamp(record.fecha.as_deref(), "fecha")?,
            status,
        })
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// One line of `productosDetalle` / `serviciosDetalle` / `paquetesDetalle`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    #[serde(default, alias = "Id")]
    pub id: Option<LooseNumber>,
    #[serde(
        default,
        rename = "productoId",
        alias = "ProductoId",
        alias = "servicioId",
        alias = "ServicioId",
        alias = "paqueteId",
        alias = "PaqueteId"
    )]
    pub item_id: Option<LooseNumber>,
    #[serde(default, alias = "Nombre")]
    pub nombre: Option<String>,
    #[serde(default, alias = "Cantidad")]
    pub cantidad: Option<LooseNumber>,
    #[serde(default, alias = "Precio", alias = "precioUnitario", alias = "PrecioUnitario")]
    pub precio: Option<LooseNumber>,
}

/// A sale exactly as the backend exports it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    #[serde(default, alias = "Id")]
    pub id: Option<LooseNumber>,
    #[serde(default, alias = "NumeroVenta")]
    pub numero_venta: Option<String>,
    #[serde(default, alias = "ClienteId")]
    pub cliente_id: Option<LooseNumber>,
    #[serde(default, alias = "Documento")]
    pub documento: Option<String>,
    #[serde(default, alias = "Fecha")]
    pub fecha: Option<String>,
    #[serde(default, alias = "MetodoPago")]
    pub metodo_pago: Option<String>,
    #[serde(default, alias = "GarantiaMeses")]
    pub garantia_meses: Option<LooseNumber>,
    #[serde(default, alias = "DescuentoPorcentaje", alias = "porcentajeDescuento")]
    pub descuento_porcentaje: Option<LooseNumber>,
    #[serde(default, alias = "Subtotal")]
    pub subtotal: Option<LooseNumber>,
    #[serde(default, alias = "Impuesto", alias = "iva", alias = "Iva")]
    pub impuesto: Option<LooseNumber>,
    #[serde(default, alias = "Descuento")]
    pub descuento: Option<LooseNumber>,
    #[serde(default, alias = "Total")]
    pub total: Option<LooseNumber>,
    #[serde(default, alias = "Estado")]
    pub estado: Option<String>,
    #[serde(default, alias = "ProductosDetalle")]
    pub productos_detalle: Vec<LineRecord>,
    #[serde(default, alias = "ServiciosDetalle")]
    pub servicios_detalle: Vec<LineRecord>,
    #[serde(default, alias = "PaquetesDetalle")]
    pub paquetes_detalle: Vec<LineRecord>,
}

impl LineRecord {
    fn into_line(self, kind: LineKind) -> Result<SaleLine, ValidationError> {
        let item_id = self
            .item_id
            .as_ref()
            .or(self.id.as_ref())
            .and_then(LooseNumber::as_i64)
            .filter(|id| *id > 0);
        let quantity = self
            .cantidad
            .as_ref()
            .and_then(LooseNumber::as_i64)
            .ok_or_else(|| ValidationError::invalid_format("cantidad", "not a whole number"))?;
        let unit_price = optional_money(&self.precio, "precio")?.unwrap_or_default();

        Ok(SaleLine {
            kind,
            item_id,
            name: self.nombre.map(|s| s.trim().to_string()).unwrap_or_default(),
            unit_price_cents: unit_price.cents(),
            quantity,
        })
    }
}

impl TryFrom<SaleRecord> for Sale {
    type Error = ValidationError;

    /// Missing totals are rebuilt from what is present: subtotal from the
    /// lines, total as `subtotal + tax − discount`, tax as the remainder.
    fn try_from(record: SaleRecord) -> Result<Self, Self::Error> {
        let id = required_id(&record.id, "id")?;
        let client_id = required_id(&record.cliente_id, "clienteId")?;

        let mut lines = Vec::with_capacity(
            record.productos_detalle.len()
                + record.servicios_detalle.len()
                + record.paquetes_detalle.len(),
        );
        for (kind, records) in [
            (LineKind::Product, record.productos_detalle),
            (LineKind::Service, record.servicios_detalle),
            (LineKind::Package, record.paquetes_detalle),
        ] {
            for line in records {
                lines.push(line.into_line(kind)?);
            }
        }

        let subtotal = match optional_money(&record.subtotal, "subtotal")? {
            Some(subtotal) => subtotal,
            None => lines.iter().map(SaleLine::line_total).sum(),
        };
        let discount = optional_money(&record.descuento, "descuento")?.unwrap_or_default();
        let total = optional_money(&record.total, "total")?;
        let tax = optional_money(&record.impuesto, "impuesto")?;
        let (tax, total) = match (tax, total) {
            (Some(tax), Some(total)) => (tax, total),
            (Some(tax), None) => (tax, subtotal + tax - discount),
            (None, Some(total)) => (total + discount - subtotal, total),
            (None, None) => (Money::zero(), subtotal - discount),
        };

        let status = match record.estado.as_deref().map(str::trim) {
            None | Some("") => SaleStatus::Completed,
            Some(raw) => SaleStatus::from_wire(raw).ok_or_else(|| ValidationError::NotAllowed {
                field: "estado".to_string(),
                allowed: ["completada", "anulada"].map(String::from).to_vec(),
            })?,
        };

        let warranty_months = record
            .garantia_meses
            .as_ref()
            .map(|n| {
                n.as_i64()
                    .and_then(|m| u32::try_from(m).ok())
                    .ok_or_else(|| ValidationError::invalid_format("garantiaMeses", "not a month count"))
            })
            .transpose()?
            .unwrap_or(0);
        let discount_percent = record
            .descuento_porcentaje
            .as_ref()
            .and_then(LooseNumber::as_i64)
            .and_then(|p| u32::try_from(p).ok())
            .unwrap_or(0);

        Ok(Sale {
            id,
            sale_number: record
                .numero_venta
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("V-{id:04}")),
            client_id,
            document: non_blank(record.documento),
            date: parse_timestamp(record.fecha.as_deref(), "fecha")?,
            payment_method: record
                .metodo_pago
                .as_deref()
                .map(PaymentMethod::from_code)
                .unwrap_or(PaymentMethod::Cash),
            warranty_months,
            discount_percent,
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            discount_cents: discount.cents(),
            total_cents: total.cents(),
            status,
            lines,
        })
    }
}

// =============================================================================
// Entry Points
// =============================================================================

fn parse_list<R, T>(json: &str, kind: &'static str) -> Result<Vec<T>, WireError>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = ValidationError>,
{
    let envelope: Envelope<R> = serde_json::from_str(json)?;
    envelope
        .into_vec()
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            T::try_from(record).map_err(|source| WireError::Record { kind, index, source })
        })
        .collect()
}

/// Parses a returns export into typed returns.
pub fn parse_returns(json: &str) -> Result<Vec<Return>, WireError> {
    parse_list::<ReturnRecord, Return>(json, "return")
}

/// Parses a sales export into typed sales.
pub fn parse_sales(json: &str) -> Result<Vec<Sale>, WireError> {
    parse_list::<SaleRecord, Sale>(json, "sale")
}

// =============================================================================
// Helpers
// =============================================================================

fn required_id(value: &Option<LooseNumber>, field: &str) -> Result<i64, ValidationError> {
    let raw = value.as_ref().ok_or_else(|| ValidationError::required(field))?;
    match raw.as_i64() {
        Some(id) if id > 0 => Ok(id),
        Some(_) => Err(ValidationError::must_be_positive(field)),
        None => Err(ValidationError::invalid_format(field, "not an integer id")),
    }
}

fn optional_money(value: &Option<LooseNumber>, field: &str) -> Result<Option<Money>, ValidationError> {
    value
        .as_ref()
        .map(|n| {
            n.as_money()
                .ok_or_else(|| ValidationError::invalid_format(field, "not an amount"))
        })
        .transpose()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// RFC 3339, or a zone-less timestamp / plain date read as UTC.
fn parse_timestamp(raw: Option<&str>, field: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ValidationError::required(field))?;

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::invalid_format(field, format!("unrecognized timestamp '{raw}'")))
}

// =============================================================================
// Unit Tests
// =============================================================================
