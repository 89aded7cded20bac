//! # Type Catalog
//!
//! Static reference data for fiscal document types. Codes and prefixes are
//! each globally unique; registration enforces both.

use std::collections::BTreeMap;

use super::entities::{DocumentType, MAX_VALIDITY_YEARS};
use super::errors::CatalogError;
use super::value_objects::PREFIX_LEN;

/// In-memory catalog of document types keyed by code.
#[derive(Clone, Debug, Default)]
pub struct TypeCatalog {
    types: BTreeMap<String, DocumentType>,
}

impl TypeCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The regulatory catalog: physical B-series and electronic E-series.
    ///
    /// Consumer invoices, credit notes and single income records (B02, B04,
    /// B12 and their electronic counterparts E32, E34) are exempt from
    /// expiration by administrative guidance.
    pub fn standard() -> Self {
        let types = [
            DocumentType::new("01", "Factura de Credito Fiscal", "B01", false),
            DocumentType::new("02", "Factura de Consumo", "B02", false)
                .without_expiration()
                .without_tax_id(),
            DocumentType::new("03", "Nota de Debito", "B03", false),
            DocumentType::new("04", "Nota de Credito", "B04", false).without_expiration(),
            DocumentType::new("11", "Comprobante de Compras", "B11", false)
                .for_purchases()
                .without_tax_id(),
            DocumentType::new("12", "Registro Unico de Ingresos", "B12", false)
                .without_expiration()
                .without_tax_id(),
            DocumentType::new("13", "Comprobante para Gastos Menores", "B13", false)
                .for_purchases()
                .without_tax_id(),
            DocumentType::new("14", "Comprobante de Regimenes Especiales", "B14", false),
            DocumentType::new("15", "Comprobante Gubernamental", "B15", false),
            DocumentType::new("16", "Comprobante para Exportaciones", "B16", false),
            DocumentType::new("17", "Comprobante para Pagos al Exterior", "B17", false)
                .for_purchases()
                .without_tax_id(),
            DocumentType::new("31", "Factura de Credito Fiscal Electronica", "E31", true),
            DocumentType::new("32", "Factura de Consumo Electronica", "E32", true)
                .without_expiration()
                .without_tax_id(),
            DocumentType::new("33", "Nota de Debito Electronica", "E33", true),
            DocumentType::new("34", "Nota de Credito Electronica", "E34", true)
                .without_expiration(),
            DocumentType::new("41", "Compras Electronico", "E41", true)
                .for_purchases()
                .without_tax_id(),
            DocumentType::new("43", "Gastos Menores Electronico", "E43", true)
                .for_purchases()
                .without_tax_id(),
            DocumentType::new("44", "Regimenes Especiales Electronico", "E44", true),
            DocumentType::new("45", "Gubernamental Electronico", "E45", true),
            DocumentType::new("46", "Comprobante de Exportaciones Electronico", "E46", true),
            DocumentType::new("47", "Comprobante para Pagos al Exterior Electronico", "E47", true)
                .for_purchases()
                .without_tax_id(),
        ];

        let mut catalog = Self::new();
        for doc_type in types {
            // Static data; codes and prefixes are distinct by construction
            catalog.types.insert(doc_type.code.clone(), doc_type);
        }
        catalog
    }

    /// Register a type after checking its shape and uniqueness.
    pub fn register(&mut self, doc_type: DocumentType) -> Result<(), CatalogError> {
        validate_code(&doc_type.code)?;
        validate_prefix(&doc_type.prefix)?;
        if !(1..=MAX_VALIDITY_YEARS).contains(&doc_type.validity_years) {
            return Err(CatalogError::InvalidValidity(doc_type.validity_years));
        }
        if self.types.contains_key(&doc_type.code) {
            return Err(CatalogError::DuplicateCode(doc_type.code));
        }
        if self.by_prefix(&doc_type.prefix).is_some() {
            return Err(CatalogError::DuplicatePrefix(doc_type.prefix));
        }

        self.types.insert(doc_type.code.clone(), doc_type);
        Ok(())
    }

    /// Look up a type by its 2-digit code.
    pub fn get(&self, code: &str) -> Option<&DocumentType> {
        self.types.get(code)
    }

    /// Look up a type by its prefix.
    pub fn by_prefix(&self, prefix: &str) -> Option<&DocumentType> {
        self.types.values().find(|t| t.prefix == prefix)
    }

    /// Types usable on sales documents.
    pub fn for_sales(&self) -> impl Iterator<Item = &DocumentType> {
        self.types.values().filter(|t| t.for_sale)
    }

    /// Types usable on purchase documents.
    pub fn for_purchases(&self) -> impl Iterator<Item = &DocumentType> {
        self.types.values().filter(|t| t.for_purchase)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn validate_code(code: &str) -> Result<(), CatalogError> {
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CatalogError::InvalidCode(code.to_string()))
    }
}

fn validate_prefix(prefix: &str) -> Result<(), CatalogError> {
    let valid = prefix.len() == PREFIX_LEN
        && prefix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(CatalogError::InvalidPrefix(prefix.to_string()))
    }
}
