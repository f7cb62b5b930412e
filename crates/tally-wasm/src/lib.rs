//! WASM bindings for tally.
//!
//! Browser forms call these for live VAT / withholding-tax previews. Inputs
//! are the raw strings of the form fields.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use tally_core::aggregate::EventSummary;
use tally_core::categories::{CategoryRegistry, CategorySetting, Locale};
use tally_core::crm::LeadFinancials;
use tally_core::models::{JobEvent, Lead};
use tally_core::money::{self, LINE_DIGITS};
use tally_core::tax::{self, resolve_vat_mode, TaxBreakdown};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Non-blank text that is not a number.
fn is_malformed(value: &str) -> bool {
    !value.trim().is_empty() && money::try_parse(value).is_none()
}

/// Read a numeric form field; blank or malformed input counts as zero.
fn form_number(field: &str, value: &str) -> Decimal {
    if is_malformed(value) {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "{}: {:?} is not a number, using 0",
            field, value
        )));
    }
    money::parse_or_zero(value)
}

#[derive(Serialize)]
struct Formatted {
    base_amount: String,
    vat_amount: String,
    total_with_vat: String,
    wht_amount: String,
    net_payable: String,
}

impl From<&TaxBreakdown> for Formatted {
    fn from(b: &TaxBreakdown) -> Self {
        let f = |d: Decimal| money::format_baht(d, LINE_DIGITS);
        Self {
            base_amount: f(b.base_amount),
            vat_amount: f(b.vat_amount),
            total_with_vat: f(b.total_with_vat),
            wht_amount: f(b.wht_amount),
            net_payable: f(b.net_payable),
        }
    }
}

#[derive(Serialize)]
struct TaxPreview {
    breakdown: TaxBreakdown,
    formatted: Formatted,
}

/// Serialize to plain JS objects rather than `Map`s.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true))
        .map_err(to_js_error)
}

/// Compute the tax breakdown of a form entry.
///
/// Returns `{ breakdown, formatted }`. An empty `vat_mode` means no VAT.
/// Unknown modes, negative amounts and rates outside 0-100 are rejected.
#[wasm_bindgen]
pub fn compute_tax(amount: &str, vat_mode: &str, wht_rate: &str) -> Result<JsValue, JsValue> {
    let mode = resolve_vat_mode(Some(vat_mode), None).map_err(to_js_error)?;
    let breakdown = tax::compute_tax(
        form_number("amount", amount),
        mode,
        form_number("wht_rate", wht_rate),
    )
    .map_err(to_js_error)?;

    let preview = TaxPreview {
        formatted: Formatted::from(&breakdown),
        breakdown,
    };
    to_js(&preview)
}

/// Parse a form value the lenient way (blank or malformed is 0).
#[wasm_bindgen]
pub fn parse_or_zero(value: &str) -> f64 {
    money::parse_or_zero(value).to_f64().unwrap_or(0.0)
}

/// Format a decimal string as Thai baht, e.g. `฿1,070.00`.
#[wasm_bindgen]
pub fn format_baht(amount: &str, digits: u32) -> String {
    money::format_baht(money::parse_or_zero(amount), digits)
}

/// Profit, margin and tax summary of a job event given as JSON.
#[wasm_bindgen]
pub fn summarize_event(json: &str) -> Result<JsValue, JsValue> {
    let event: JobEvent = serde_json::from_str(json).map_err(to_js_error)?;
    let summary = EventSummary::compute(&event).map_err(to_js_error)?;
    to_js(&summary)
}

/// Payments and outstanding balance of a lead given as JSON.
#[wasm_bindgen]
pub fn lead_financials(json: &str) -> Result<JsValue, JsValue> {
    let lead: Lead = serde_json::from_str(json).map_err(to_js_error)?;
    let financials = LeadFinancials::compute(&lead).map_err(to_js_error)?;
    to_js(&financials)
}

/// Cost category labels and colors for dropdowns and charts.
#[wasm_bindgen]
pub struct Categories {
    registry: CategoryRegistry,
    locale: Locale,
}

#[wasm_bindgen]
impl Categories {
    /// Built-in categories with Thai labels.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            registry: CategoryRegistry::builtin(),
            locale: Locale::Th,
        }
    }

    /// Overlay settings rows given as a JSON array.
    #[wasm_bindgen]
    pub fn with_settings(json: &str) -> Result<Categories, JsValue> {
        let settings: Vec<CategorySetting> = serde_json::from_str(json).map_err(to_js_error)?;
        Ok(Self {
            registry: CategoryRegistry::with_settings(&settings),
            locale: Locale::Th,
        })
    }

    /// Switch label language: `th` or `en`.
    #[wasm_bindgen]
    pub fn set_locale(&mut self, locale: &str) -> Result<(), JsValue> {
        self.locale = locale.parse().map_err(|e: String| JsValue::from_str(&e))?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn label(&self, value: &str) -> String {
        self.registry.label(value, self.locale).to_string()
    }

    #[wasm_bindgen]
    pub fn color(&self, value: &str) -> String {
        self.registry.color(value).to_string()
    }

    /// Category keys in display order.
    #[wasm_bindgen]
    pub fn values(&self) -> js_sys::Array {
        self.registry
            .iter()
            .map(|c| JsValue::from_str(&c.value))
            .collect()
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_parse_or_zero() {
        assert_eq!(parse_or_zero("1,000"), 0.0);
        assert_eq!(parse_or_zero(""), 0.0);
        assert!((parse_or_zero("1070.5") - 1070.5).abs() < 1e-9);
    }

    #[wasm_bindgen_test]
    fn test_format_baht() {
        assert_eq!(format_baht("1070", 2), "฿1,070.00");
        assert_eq!(format_baht("-30", 0), "-฿30");
    }

    #[wasm_bindgen_test]
    fn test_compute_tax_rejects_bad_input() {
        assert!(compute_tax("1000", "excluded", "3").is_ok());
        assert!(compute_tax("1000", "sometimes", "3").is_err());
        assert!(compute_tax("-1", "none", "0").is_err());
        assert!(compute_tax("1000", "", "101").is_err());
    }

    fn get(value: &JsValue, key: &str) -> JsValue {
        js_sys::Reflect::get(value, &JsValue::from_str(key)).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_compute_tax_returns_plain_object() {
        let preview = compute_tax("1000", "excluded", "3").unwrap();
        assert!(!preview.is_instance_of::<js_sys::Map>());

        let breakdown = get(&preview, "breakdown");
        assert_eq!(get(&breakdown, "net_payable").as_string().as_deref(), Some("1040.00"));
        assert_eq!(
            get(&get(&preview, "formatted"), "net_payable").as_string().as_deref(),
            Some("฿1,040.00")
        );
    }

    #[wasm_bindgen_test]
    fn test_only_garbage_is_malformed() {
        assert!(!is_malformed("0.00"));
        assert!(!is_malformed(" 0 "));
        assert!(!is_malformed(""));
        assert!(is_malformed("1,000"));
        assert!(is_malformed("abc"));
        assert_eq!(form_number("amount", "0.00"), Decimal::ZERO);
        assert_eq!(form_number("amount", "12.5"), Decimal::new(125, 1));
    }

    #[wasm_bindgen_test]
    fn test_summaries_from_json() {
        assert!(summarize_event(r#"{"event_name": "Expo", "revenue": 1000}"#).is_ok());
        assert!(lead_financials(r#"{"customer_name": "Khun A", "quoted_price": "5000"}"#).is_ok());
        assert!(lead_financials("not json").is_err());
    }

    #[wasm_bindgen_test]
    fn test_categories() {
        let mut categories = Categories::new();
        assert_eq!(categories.label("venue"), "ค่าสถานที่");
        categories.set_locale("en").unwrap();
        assert_eq!(categories.label("venue"), "Venue");
        assert_eq!(categories.color("unknown"), "#6b7280");
        assert_eq!(categories.values().length(), 7);
    }
}
