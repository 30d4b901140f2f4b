//! Variant pickers
//!
//! Product pages enumerate their variants in one of three ways: radio
//! inputs with labels, a `<select>` whose option values carry the SKU, or
//! script blocks holding a JSON product configuration plus a product map.
//! Embedded JSON is decoded into structures with optional fields; variants
//! without a SKU are dropped.

use super::{attr, select, select_first, text_of};
use scraper::ElementRef;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Suffix standing in for the unknown tail of an unselected variant's SKU
const UNKNOWN_SKU_TAIL: &str = "????";

/// Number of SKU characters kept for an unselected variant
const SKU_STEM_LEN: usize = 7;

/// A variant ready to be emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub sku: String,
}

/// Reads radio-button variants from an option container
///
/// Each input yields one variant named `<title> <label>`. The checked input
/// keeps `sku`; the others get the first seven characters of `sku` followed
/// by `????`.
pub fn radio_variants(options: ElementRef<'_>, title: &str, sku: &str) -> Vec<Variant> {
    let stem: String = sku.chars().take(SKU_STEM_LEN).collect();

    select(options, "input")
        .into_iter()
        .map(|input| {
            let mut name = title.to_string();
            if let Some(value) = attr(input, "value") {
                let label_css = format!("[data-product-attribute-value=\"{}\"]", value);
                if let Some(label) = select_first(options, &label_css) {
                    name = format!("{} {}", name, text_of(label));
                }
            }
            let sku = if attr(input, "checked").is_some() {
                sku.to_string()
            } else {
                format!("{}{}", stem, UNKNOWN_SKU_TAIL)
            };
            Variant { name, sku }
        })
        .collect()
}

/// Splits a select option value of the form `description (sku)`
///
/// Returns `None` when the value has no ` (` separator.
pub fn split_option_value(value: &str) -> Option<(&str, &str)> {
    let pos = value.find(" (")?;
    let name = &value[..pos];
    let rest = &value[pos + 2..];
    let sku = rest.strip_suffix(')').unwrap_or(rest);
    Some((name, sku))
}

/// Reads `<option>` variants under `select_el`, naming each `<heading> <description>`
pub fn option_variants(select_el: ElementRef<'_>, heading: &str) -> Vec<Variant> {
    select(select_el, "option")
        .into_iter()
        .filter_map(|option| attr(option, "value"))
        .filter_map(split_option_value)
        .map(|(name, sku)| Variant {
            name: format!("{} {}", heading, name),
            sku: sku.to_string(),
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
struct ProductConfig {
    #[serde(default)]
    attributes: BTreeMap<String, AttributeConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct AttributeConfig {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    options: Vec<OptionConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct OptionConfig {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    products: Vec<String>,
}

const CONFIG_CALL: &str = "Product.Config(";
const PRODUCT_MAP: &str = "var productMap = ";

/// Reads variants from `Product.Config(...)` and `var productMap = {...};` scripts
///
/// The configuration gives each product id a label built from its
/// attributes; the product map gives each id its SKU. Variants come out in
/// product id order.
pub fn script_variants<'a>(scripts: impl IntoIterator<Item = &'a str>, title: &str) -> Vec<Variant> {
    let mut labels: BTreeMap<String, String> = BTreeMap::new();
    let mut skus: BTreeMap<String, String> = BTreeMap::new();

    for script in scripts {
        if let Some(start) = script.find(CONFIG_CALL) {
            let body = &script[start + CONFIG_CALL.len()..];
            let Some(end) = body.find(");") else { continue };
            match serde_json::from_str::<ProductConfig>(&body[..end]) {
                Ok(config) => add_labels(&mut labels, &config),
                Err(e) => tracing::debug!(error = %e, "Unreadable product configuration"),
            }
        } else if let Some(start) = script.find(PRODUCT_MAP) {
            let body = &script[start + PRODUCT_MAP.len()..];
            let Some(end) = body.find("};") else { continue };
            match serde_json::from_str::<BTreeMap<String, String>>(&body[..=end]) {
                Ok(map) => skus.extend(map),
                Err(e) => tracing::debug!(error = %e, "Unreadable product map"),
            }
        }
    }

    let mut ids: Vec<&String> = labels.keys().chain(skus.keys()).collect();
    ids.sort();
    ids.dedup();

    ids.into_iter()
        .filter_map(|id| {
            let sku = skus.get(id).filter(|sku| !sku.is_empty())?;
            let label = labels.get(id).map(String::as_str).unwrap_or_default();
            Some(Variant {
                name: format!("{} {}", title, label).trim().to_string(),
                sku: sku.clone(),
            })
        })
        .collect()
}

fn add_labels(labels: &mut BTreeMap<String, String>, config: &ProductConfig) {
    for attribute in config.attributes.values() {
        let attribute_label = attribute.label.as_deref().unwrap_or_default();
        for option in &attribute.options {
            let part = match option.label.as_deref() {
                Some("Yes") => attribute_label.to_string(),
                Some("No") => String::new(),
                Some(label) => format!("{} {}", attribute_label, label),
                None => attribute_label.to_string(),
            };
            for product in &option.products {
                let entry = labels.entry(product.clone()).or_default();
                if !part.is_empty() {
                    if !entry.is_empty() {
                        entry.push(' ');
                    }
                    entry.push_str(&part);
                }
            }
        }
    }
}

/// Product identity carried in an analytics attribute
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<serde_json::Value>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl AnalyticsProduct {
    /// The SKU, or the id when the SKU is absent
    pub fn sku(&self) -> Option<String> {
        self.sku
            .as_ref()
            .and_then(json_scalar)
            .or_else(|| self.id.as_ref().and_then(json_scalar))
    }
}

#[derive(Debug, Default, Deserialize)]
struct AnalyticsEnvelope {
    #[serde(default)]
    payload: Option<AnalyticsProduct>,
}

/// Decodes a `data-analytics` attribute (`{"payload": {...}}`)
pub fn analytics_payload(raw: &str) -> Option<AnalyticsProduct> {
    match serde_json::from_str::<AnalyticsEnvelope>(raw) {
        Ok(envelope) => envelope.payload,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable analytics payload");
            None
        }
    }
}

/// Decodes a `data-analytics-product-impression` attribute
pub fn analytics_impression(raw: &str) -> Option<AnalyticsProduct> {
    serde_json::from_str(raw).ok()
}

fn json_scalar(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
