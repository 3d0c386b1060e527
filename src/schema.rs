//! Column contract for the sales CSV files.
//!
//! Input files use the Spanish headers of the upstream export. Names must
//! match exactly; a file missing any required column is rejected when it is
//! loaded rather than somewhere later in the pipeline.

use std::path::Path;

use crate::errors::SchemaError;

/// Format of the `Fecha de Pedido` column, e.g. `04/19/19 08:46`.
pub const ORDER_DATETIME_FORMAT: &str = "%m/%d/%y %H:%M";

/// A column the pipeline knows how to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    OrderId,
    Product,
    Quantity,
    UnitPrice,
    OrderedAt,
    ShippingAddress,
}

impl Column {
    /// Columns every input file must provide.
    pub const REQUIRED: [Column; 5] = [
        Column::Product,
        Column::Quantity,
        Column::UnitPrice,
        Column::OrderedAt,
        Column::ShippingAddress,
    ];

    /// The exact header text used in input files.
    pub fn header(self) -> &'static str {
        match self {
            Column::OrderId => "ID de Pedido",
            Column::Product => "Producto",
            Column::Quantity => "Cantidad Pedida",
            Column::UnitPrice => "Precio Unitario",
            Column::OrderedAt => "Fecha de Pedido",
            Column::ShippingAddress => "Dirección de Envio",
        }
    }
}

/// Positions of the known columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub order_id: Option<usize>,
    pub product: usize,
    pub quantity: usize,
    pub unit_price: usize,
    pub ordered_at: usize,
    pub shipping_address: usize,
}

impl ColumnIndex {
    /// Locates every known column in `headers`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateColumns`] if any header name appears
    /// twice, and [`SchemaError::MissingColumns`] listing each required
    /// header that is absent. Both are attributed to `file`.
    pub fn resolve<S: AsRef<str>>(file: &Path, headers: &[S]) -> Result<Self, SchemaError> {
        let mut duplicates: Vec<String> = Vec::new();
        for (i, header) in headers.iter().enumerate() {
            let header = header.as_ref();
            let repeated = headers[..i].iter().any(|h| h.as_ref() == header);
            if repeated && !duplicates.iter().any(|d| d == header) {
                duplicates.push(header.to_string());
            }
        }
        if !duplicates.is_empty() {
            return Err(SchemaError::DuplicateColumns {
                file: file.to_path_buf(),
                duplicates,
            });
        }

        let position = |column: Column| headers.iter().position(|h| h.as_ref() == column.header());

        let missing: Vec<&'static str> = Column::REQUIRED
            .iter()
            .filter(|c| position(**c).is_none())
            .map(|c| c.header())
            .collect();

        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns {
                file: file.to_path_buf(),
                missing,
            });
        }

        // Presence of every required column was checked above.
        let required = |column: Column| position(column).unwrap_or_default();

        Ok(Self {
            order_id: position(Column::OrderId),
            product: required(Column::Product),
            quantity: required(Column::Quantity),
            unit_price: required(Column::UnitPrice),
            ordered_at: required(Column::OrderedAt),
            shipping_address: required(Column::ShippingAddress),
        })
    }
}
