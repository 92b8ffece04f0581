//! Data-driven spec loading from JSON.
//!
//! Feature-gated behind `data-loader`. A configuration document declares the
//! material table and one section per contraption type. Any invalid entry
//! fails the whole load; no partial spec table is produced. Factory sections
//! register in lexicographic id order (deterministic), which is the order
//! creation ties resolve in.

use crate::Ticks;
use crate::gadget::{ConversionGadget, GrowGadget, MatchGadget, MinMaxGadget, ProductionGadget};
use crate::item::{DEFAULT_MAX_STACK, MaterialCatalog};
use crate::itemset::{ItemSet, SetEntry};
use crate::spec::{
    ContraptionSpec, DEFAULT_BREAKDOWN_RATE, DEFAULT_MAX_REPAIR, DEFAULT_REPAIR_CONVERSION,
};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that fail a configuration load.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("factory '{factory}' references unknown material '{material}'")]
    UnknownMaterial { factory: String, material: String },
    #[error("factory '{factory}': repair_amount must be positive, got {value}")]
    InvalidConversion { factory: String, value: f64 },
    #[error("factory '{factory}': max_repair ({max}) is below min_repair ({min})")]
    InvalidBounds { factory: String, min: f64, max: f64 },
}

// ---------------------------------------------------------------------------
// JSON data structures
// ---------------------------------------------------------------------------

/// Top-level configuration document.
#[derive(Debug, serde::Deserialize)]
pub struct ConfigDoc {
    #[serde(default)]
    pub materials: Vec<MaterialData>,
    #[serde(default)]
    pub factories: BTreeMap<String, FactoryData>,
}

/// A material declaration.
#[derive(Debug, serde::Deserialize)]
pub struct MaterialData {
    pub name: String,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

/// One line of an item set: material by name, quantity, optional display
/// metadata.
#[derive(Debug, serde::Deserialize)]
pub struct ItemSetData {
    pub material: String,
    pub amount: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lore: Option<String>,
}

/// A named production recipe.
#[derive(Debug, serde::Deserialize)]
pub struct RecipeData {
    #[serde(default)]
    pub inputs: Vec<ItemSetData>,
    #[serde(default)]
    pub outputs: Vec<ItemSetData>,
    #[serde(default)]
    pub duration: Ticks,
}

/// One contraption type section. Optional fields fall back to the
/// documented defaults in [`crate::spec`].
#[derive(Debug, serde::Deserialize)]
pub struct FactoryData {
    pub name: String,
    pub block: String,
    #[serde(default)]
    pub building_materials: Vec<ItemSetData>,
    #[serde(default)]
    pub recipes: BTreeMap<String, RecipeData>,
    #[serde(default)]
    pub repair_materials: Vec<ItemSetData>,
    #[serde(default)]
    pub repair_amount: Option<f64>,
    #[serde(default)]
    pub breakdown_rate: Option<f64>,
    #[serde(default)]
    pub min_repair: Option<f64>,
    #[serde(default)]
    pub max_repair: Option<f64>,
    #[serde(default)]
    pub passive_conversion: bool,
}

// ---------------------------------------------------------------------------
// Loading functions
// ---------------------------------------------------------------------------

/// Load the material catalog and spec table from a JSON string.
pub fn load_config_json(json: &str) -> Result<(MaterialCatalog, Vec<ContraptionSpec>), ConfigError> {
    let doc: ConfigDoc = serde_json::from_str(json)?;
    build_config(doc)
}

/// Load the material catalog and spec table from JSON bytes.
pub fn load_config_json_bytes(
    bytes: &[u8],
) -> Result<(MaterialCatalog, Vec<ContraptionSpec>), ConfigError> {
    let doc: ConfigDoc = serde_json::from_slice(bytes)?;
    build_config(doc)
}

fn build_config(doc: ConfigDoc) -> Result<(MaterialCatalog, Vec<ContraptionSpec>), ConfigError> {
    let mut catalog = MaterialCatalog::new();
    for material in &doc.materials {
        catalog.register(&material.name, material.max_stack);
    }

    let mut specs = Vec::with_capacity(doc.factories.len());
    for (id, factory) in &doc.factories {
        specs.push(build_spec(&catalog, id, factory)?);
    }
    Ok((catalog, specs))
}

fn resolve_set(
    catalog: &MaterialCatalog,
    factory: &str,
    entries: &[ItemSetData],
) -> Result<ItemSet, ConfigError> {
    let mut resolved = Vec::with_capacity(entries.len());
    for entry in entries {
        let material =
            catalog
                .id(&entry.material)
                .ok_or_else(|| ConfigError::UnknownMaterial {
                    factory: factory.to_string(),
                    material: entry.material.clone(),
                })?;
        let mut set_entry = SetEntry::new(material, entry.amount);
        if entry.name.is_some() || entry.lore.is_some() {
            set_entry.meta = Some(crate::item::ItemMeta {
                name: entry.name.clone(),
                lore: entry.lore.clone(),
            });
        }
        resolved.push(set_entry);
    }
    Ok(ItemSet::new(resolved))
}

fn build_spec(
    catalog: &MaterialCatalog,
    id: &str,
    factory: &FactoryData,
) -> Result<ContraptionSpec, ConfigError> {
    let block = catalog
        .id(&factory.block)
        .ok_or_else(|| ConfigError::UnknownMaterial {
            factory: id.to_string(),
            material: factory.block.clone(),
        })?;

    let building = resolve_set(catalog, id, &factory.building_materials)?;

    let mut production = Vec::with_capacity(factory.recipes.len());
    for (recipe_name, recipe) in &factory.recipes {
        let inputs = resolve_set(catalog, id, &recipe.inputs)?;
        let outputs = resolve_set(catalog, id, &recipe.outputs)?;
        production.push(ProductionGadget::new(
            recipe_name,
            inputs,
            outputs,
            recipe.duration,
        ));
    }

    let conversion_rate = factory.repair_amount.unwrap_or(DEFAULT_REPAIR_CONVERSION);
    if conversion_rate <= 0.0 {
        return Err(ConfigError::InvalidConversion {
            factory: id.to_string(),
            value: conversion_rate,
        });
    }
    let repair_set = resolve_set(catalog, id, &factory.repair_materials)?;

    let min = factory.min_repair.unwrap_or(0.0);
    let max = factory.max_repair.unwrap_or(DEFAULT_MAX_REPAIR);
    if max < min {
        return Err(ConfigError::InvalidBounds {
            factory: id.to_string(),
            min,
            max,
        });
    }

    Ok(ContraptionSpec::new(
        id,
        &factory.name,
        block,
        MatchGadget::new(building),
        production,
        ConversionGadget::new(repair_set, conversion_rate),
        GrowGadget::new(factory.breakdown_rate.unwrap_or(DEFAULT_BREAKDOWN_RATE)),
        MinMaxGadget::new(min, max),
        factory.passive_conversion,
    ))
}

// ===========================================================================
// Tests
// ===========================================================================
