use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::estimate::{EquipmentEntry, TreeEntry};

/// Tonnes CO2 per tree per year for species missing from the table
pub const DEFAULT_ABSORPTION_RATE: Decimal = dec!(0.040);

/// Upper bound on the diameter factor (a 120 cm trunk)
pub const MAX_SIZE_MULTIPLIER: Decimal = dec!(4.0);

const FULL_MATURITY_YEARS: Decimal = dec!(10);
const REFERENCE_DIAMETER_CM: Decimal = dec!(30);
const OFFSET_DECIMALS: u32 = 3;
const MAX_TREE_COUNT: i64 = i32::MAX as i64;

/// A tree entry that passed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub species_name: String,
    pub count: i64,
    pub age_years: Decimal,
    pub diameter_cm: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub equipment_type: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeContribution {
    pub species_name: String,
    pub rate: Decimal,
    pub contribution: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    /// Rounded to three decimals
    pub total: Decimal,
    pub tree_count: i64,
    pub impact_note: Option<String>,
    pub contributions: Vec<TreeContribution>,
}

pub fn absorption_rate(species_name: &str) -> Decimal {
    match species_name.trim().to_lowercase().as_str() {
        "oak" => dec!(0.048),
        "pine" => dec!(0.035),
        "maple" => dec!(0.042),
        "birch" => dec!(0.038),
        "fruit" => dec!(0.025),
        _ => DEFAULT_ABSORPTION_RATE,
    }
}

/// count * rate * age_multiplier * size_multiplier, unrounded
pub fn tree_contribution(tree: &TreeRecord) -> Decimal {
    let rate = absorption_rate(&tree.species_name);
    let age_multiplier = (tree.age_years / FULL_MATURITY_YEARS).min(Decimal::ONE);
    let size_multiplier = (tree.diameter_cm / REFERENCE_DIAMETER_CM).min(MAX_SIZE_MULTIPLIER);

    Decimal::from(tree.count) * rate * age_multiplier * size_multiplier
}

/// Half away from zero on the thousandths digit
pub fn round_offset(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(OFFSET_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn required_non_negative(
    value: Option<Decimal>,
    field: impl FnOnce() -> String,
) -> Result<Decimal, ValidationError> {
    match value {
        None => Err(ValidationError::new(field(), "is required")),
        Some(v) if v < Decimal::ZERO => {
            Err(ValidationError::new(field(), "must not be negative"))
        }
        Some(v) => Ok(v),
    }
}

pub fn validate_trees(entries: &[TreeEntry]) -> Result<Vec<TreeRecord>, ValidationError> {
    let records = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let species_name = entry
                .species_name
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    ValidationError::new(format!("trees[{i}].species_name"), "is required")
                })?;

            let count = match entry.count {
                None => {
                    return Err(ValidationError::new(format!("trees[{i}].count"), "is required"));
                }
                Some(c) if c < 0 => {
                    return Err(ValidationError::new(
                        format!("trees[{i}].count"),
                        "must not be negative",
                    ));
                }
                Some(c) if c > MAX_TREE_COUNT => {
                    return Err(ValidationError::new(
                        format!("trees[{i}].count"),
                        "is too large",
                    ));
                }
                Some(c) => c,
            };

            let age_years = required_non_negative(entry.age_years, || format!("trees[{i}].age_years"))?;
            let diameter_cm =
                required_non_negative(entry.diameter_cm, || format!("trees[{i}].diameter_cm"))?;

            Ok(TreeRecord {
                species_name: species_name.to_string(),
                count,
                age_years,
                diameter_cm,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Submissions store the total in an i32 column
    records
        .iter()
        .try_fold(0i64, |total, tree| {
            total.checked_add(tree.count).filter(|t| *t <= MAX_TREE_COUNT)
        })
        .ok_or_else(|| ValidationError::new("trees", "total tree count is too large"))?;

    Ok(records)
}

pub fn validate_equipment(
    entries: &[EquipmentEntry],
) -> Result<Vec<EquipmentRecord>, ValidationError> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let equipment_type = entry
                .equipment_type
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    ValidationError::new(format!("equipment[{i}].equipment_type"), "is required")
                })?;

            let quantity = entry.quantity.ok_or_else(|| {
                ValidationError::new(format!("equipment[{i}].quantity"), "is required")
            })?;
            if quantity < 1 {
                return Err(ValidationError::new(
                    format!("equipment[{i}].quantity"),
                    "must be at least 1",
                ));
            }

            Ok(EquipmentRecord {
                equipment_type: equipment_type.to_lowercase(),
                quantity,
            })
        })
        .collect()
}

fn equipment_label(equipment_type: &str) -> &str {
    match equipment_type {
        "solar_panel" => "solar panel",
        "rain_barrel" => "rain barrel",
        "compost_bin" => "compost bin",
        "drip_irrigation" => "drip irrigation",
        "beehive" => "beehive",
        other => other,
    }
}

/// Qualitative note for installed equipment. Equipment never adds tonnage.
pub fn impact_note(equipment: &[EquipmentRecord]) -> Option<String> {
    if equipment.is_empty() {
        return None;
    }

    let items: Vec<String> = equipment
        .iter()
        .map(|e| format!("{} x {}", e.quantity, equipment_label(&e.equipment_type)))
        .collect();

    Some(format!(
        "{}: supports on-site emission reduction",
        items.join(", ")
    ))
}

pub fn estimate(trees: &[TreeRecord], equipment: &[EquipmentRecord]) -> Estimate {
    let contributions: Vec<TreeContribution> = trees
        .iter()
        .map(|tree| TreeContribution {
            species_name: tree.species_name.clone(),
            rate: absorption_rate(&tree.species_name),
            contribution: tree_contribution(tree),
        })
        .collect();

    let raw_total: Decimal = contributions.iter().map(|c| c.contribution).sum();
    let total = round_offset(raw_total);
    let tree_count = trees
        .iter()
        .fold(0i64, |total, tree| total.saturating_add(tree.count));

    tracing::debug!(
        "Estimated {} t CO2 for {} trees across {} entries",
        total,
        tree_count,
        trees.len()
    );

    Estimate {
        total,
        tree_count,
        impact_note: impact_note(equipment),
        contributions,
    }
}
